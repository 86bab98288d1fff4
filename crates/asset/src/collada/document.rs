//! Read-only view over a parsed COLLADA document.
//!
//! Wraps a [`roxmltree::Document`] together with an `id -> node` table built
//! once at parse time, so `#id` references resolve without rescanning the
//! tree. Element names are matched by local name; the COLLADA namespace is
//! ignored.

use std::collections::HashMap;

use roxmltree::{Node, NodeId};

pub struct ColladaDocument<'input> {
    xml: roxmltree::Document<'input>,
    ids: HashMap<String, NodeId>,
}

impl<'input> ColladaDocument<'input> {
    pub fn parse(text: &'input str) -> Result<Self, roxmltree::Error> {
        let xml = roxmltree::Document::parse(text)?;
        let mut ids = HashMap::new();
        for node in xml.descendants().filter(Node::is_element) {
            if let Some(id) = node.attribute("id") {
                // First definition wins, matching document order lookups.
                ids.entry(id.to_owned()).or_insert(node.id());
            }
        }
        log::debug!("Indexed {} element ids", ids.len());
        Ok(Self { xml, ids })
    }

    pub fn root(&self) -> Node<'_, 'input> {
        self.xml.root_element()
    }

    /// Resolve a `#id` (or bare `id`) reference to its element.
    pub fn resolve(&self, reference: &str) -> Option<Node<'_, 'input>> {
        let id = reference.strip_prefix('#').unwrap_or(reference);
        self.ids.get(id).and_then(|&node| self.xml.get_node(node))
    }
}

/// Direct element children of `node` named `tag`.
pub fn children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == tag)
}

/// Elements reached by descending through `path`, one tag per step.
///
/// Each step matches at any depth below the previous step's matches.
pub fn find<'a, 'input>(node: Node<'a, 'input>, path: &[&str]) -> Vec<Node<'a, 'input>> {
    let mut current = vec![node];
    for tag in path {
        let mut next: Vec<Node<'a, 'input>> = Vec::new();
        for parent in &current {
            for found in parent
                .descendants()
                .skip(1)
                .filter(|n| n.is_element() && n.tag_name().name() == *tag)
            {
                if !next.contains(&found) {
                    next.push(found);
                }
            }
        }
        current = next;
    }
    current
}

pub fn attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name)
}

/// Text content of `node`, empty if it has none.
pub fn text<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().unwrap_or("")
}

/// Split a whitespace-separated data block into tokens.
///
/// Tabs, newlines, carriage returns and runs of spaces all act as a single
/// separator; leading and trailing whitespace is ignored. Other Unicode
/// whitespace stays part of the token.
pub fn tokens(data: &str) -> Vec<&str> {
    data.split([' ', '\t', '\n', '\r'])
        .filter(|token| !token.is_empty())
        .collect()
}

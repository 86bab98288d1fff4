//! `<source>` resolution: a flat float array plus its accessor metadata.

use roxmltree::Node;

use super::document::{self, ColladaDocument};
use super::error::ErrorKind;

/// A named `<param>` of an accessor. Kept as metadata only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Param {
    pub name: Option<String>,
    pub ty: Option<String>,
}

/// Decoded `<source>`: `count` logical elements of `stride` floats each.
#[derive(Clone, Debug, PartialEq)]
pub struct Source {
    pub values: Vec<f32>,
    pub stride: usize,
    pub count: usize,
    pub params: Vec<Param>,
}

impl Source {
    /// Fetch logical element `index` as exactly `N` components.
    ///
    /// The source stride must equal `N`.
    pub fn element<const N: usize>(
        &self,
        index: usize,
        semantic: &'static str,
    ) -> Result<[f32; N], ErrorKind> {
        if self.stride != N {
            return Err(ErrorKind::StrideMismatch {
                semantic,
                expected: N,
                found: self.stride,
            });
        }
        let out_of_range = || ErrorKind::IndexOutOfRange {
            semantic,
            index,
            count: self.values.len() / N,
        };
        let start = index.checked_mul(N).ok_or_else(out_of_range)?;
        let end = start.checked_add(N).ok_or_else(out_of_range)?;
        self.values
            .get(start..end)
            .and_then(|slice| <[f32; N]>::try_from(slice).ok())
            .ok_or_else(out_of_range)
    }
}

/// Resolve a `#id` reference to a `<source>` and decode it.
pub fn resolve_source(doc: &ColladaDocument<'_>, reference: &str) -> Result<Source, ErrorKind> {
    let node = doc
        .resolve(reference)
        .ok_or_else(|| ErrorKind::UnresolvedReference {
            reference: reference.to_owned(),
        })?;
    let id = document::attr(node, "id").unwrap_or(reference);
    let source = parse_source(doc, node).map_err(|kind| kind.in_source(id))?;
    log::debug!(
        "Resolved source id={} count={} stride={} params={}",
        id,
        source.count,
        source.stride,
        source.params.len()
    );
    Ok(source)
}

fn parse_source(doc: &ColladaDocument<'_>, node: Node<'_, '_>) -> Result<Source, ErrorKind> {
    let accessors = document::find(node, &["technique_common", "accessor"]);
    let [accessor] = accessors.as_slice() else {
        return Err(ErrorKind::Cardinality {
            element: "accessor",
            parent: "source",
            found: accessors.len(),
        });
    };
    let accessor = *accessor;

    let count = parse_usize_attr(accessor, "accessor", "count")?;
    let stride = parse_usize_attr(accessor, "accessor", "stride")?;
    let array_ref = document::attr(accessor, "source").ok_or(ErrorKind::MissingAttribute {
        element: "accessor",
        attribute: "source",
    })?;

    let params = document::find(node, &["param"])
        .into_iter()
        .map(|param| Param {
            name: document::attr(param, "name").map(str::to_owned),
            ty: document::attr(param, "type").map(str::to_owned),
        })
        .collect();

    let array = doc
        .resolve(array_ref)
        .ok_or_else(|| ErrorKind::UnresolvedReference {
            reference: array_ref.to_owned(),
        })?;
    let array_size = parse_usize_attr(array, "float_array", "count")?;
    let tokens = document::tokens(document::text(array));
    if tokens.len() != array_size {
        return Err(ErrorKind::CountMismatch {
            what: "float array values",
            expected: array_size,
            found: tokens.len(),
        });
    }
    let values = tokens
        .into_iter()
        .map(|token| {
            token.parse::<f32>().map_err(|_| ErrorKind::InvalidNumber {
                what: "float value",
                token: token.to_owned(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Source {
        values,
        stride,
        count,
        params,
    })
}

pub(crate) fn parse_usize_attr(
    node: Node<'_, '_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<usize, ErrorKind> {
    let raw = document::attr(node, attribute).ok_or(ErrorKind::MissingAttribute {
        element,
        attribute,
    })?;
    raw.trim().parse().map_err(|_| ErrorKind::InvalidNumber {
        what: attribute,
        token: raw.to_owned(),
    })
}

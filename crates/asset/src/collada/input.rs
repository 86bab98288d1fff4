//! `<input>` bindings of a primitive group and their resolved sources.

use roxmltree::Node;

use super::document::{self, ColladaDocument};
use super::error::ErrorKind;
use super::source::{Source, resolve_source};

/// Recognised input semantics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Semantic {
    Vertex,
    Position,
    Normal,
    TexCoord,
}

impl Semantic {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "VERTEX" => Some(Self::Vertex),
            "POSITION" => Some(Self::Position),
            "NORMAL" => Some(Self::Normal),
            "TEXCOORD" => Some(Self::TexCoord),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vertex => "VERTEX",
            Self::Position => "POSITION",
            Self::Normal => "NORMAL",
            Self::TexCoord => "TEXCOORD",
        }
    }
}

/// An `<input>` element as declared, before its source is resolved.
///
/// Attributes are kept raw so that offset validation can run before any
/// semantic or reference is interpreted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputDecl {
    pub semantic: Option<String>,
    pub source: Option<String>,
    pub offset: i64,
}

impl InputDecl {
    pub fn semantic(&self) -> Option<Semantic> {
        self.semantic.as_deref().and_then(Semantic::parse)
    }

    fn source(&self) -> Result<&str, ErrorKind> {
        self.source.as_deref().ok_or(ErrorKind::MissingAttribute {
            element: "input",
            attribute: "source",
        })
    }

    fn unsupported(&self, scope: &'static str) -> ErrorKind {
        ErrorKind::UnsupportedSemantic {
            scope,
            semantic: self.semantic.clone().unwrap_or_default(),
        }
    }
}

/// What an input contributes to each emitted vertex.
#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
    /// Per-vertex data from the mesh's `<vertices>` element.
    Vertex {
        position: Source,
        normal: Option<Source>,
    },
    /// Normal indexed separately from the position.
    Normal(Source),
    /// Texture coordinates; only channel 0 is emitted.
    TexCoord { source: Source, channel: usize },
}

/// A resolved input at a fixed slot of the interleaved index tuple.
#[derive(Clone, Debug, PartialEq)]
pub struct Input {
    pub offset: usize,
    pub binding: Binding,
}

/// Read `<input>` elements in declaration order. A missing `offset` means 0.
pub fn parse_inputs<'a, 'input>(
    elements: impl IntoIterator<Item = Node<'a, 'input>>,
) -> Result<Vec<InputDecl>, ErrorKind>
where
    'input: 'a,
{
    elements
        .into_iter()
        .map(|element| {
            let offset = match document::attr(element, "offset") {
                Some(raw) => raw.trim().parse().map_err(|_| ErrorKind::InvalidNumber {
                    what: "offset",
                    token: raw.to_owned(),
                })?,
                None => 0,
            };
            Ok(InputDecl {
                semantic: document::attr(element, "semantic").map(str::to_owned),
                source: document::attr(element, "source").map(str::to_owned),
                offset,
            })
        })
        .collect()
}

/// Offsets sorted ascending must be exactly `0..decls.len()`.
///
/// Sorted position is used directly as the interleave slot, so gaps,
/// duplicates and negative offsets are rejected rather than remapped.
pub fn check_offsets(decls: &[InputDecl]) -> Result<(), ErrorKind> {
    let mut offsets: Vec<i64> = decls.iter().map(|d| d.offset).collect();
    offsets.sort_unstable();
    if offsets
        .iter()
        .enumerate()
        .any(|(slot, &offset)| i64::try_from(slot) != Ok(offset))
    {
        return Err(ErrorKind::OffsetMismatch { offsets });
    }
    Ok(())
}

/// Resolve every declared input of a primitive group, in declaration order.
///
/// Expects offsets already accepted by [`check_offsets`].
pub fn resolve_inputs(
    doc: &ColladaDocument<'_>,
    mesh: Node<'_, '_>,
    decls: &[InputDecl],
) -> Result<Vec<Input>, ErrorKind> {
    let mut tex_channels = 0;
    let mut inputs = Vec::with_capacity(decls.len());
    for decl in decls {
        let offset = usize::try_from(decl.offset).map_err(|_| ErrorKind::OffsetMismatch {
            offsets: vec![decl.offset],
        })?;
        let binding = match decl.semantic() {
            // The VERTEX input's own `source` is not consulted.
            Some(Semantic::Vertex) => resolve_vertices(doc, mesh)?,
            Some(Semantic::Normal) => {
                let source = resolve_source(doc, decl.source()?)?;
                if source.stride != 3 {
                    return Err(ErrorKind::StrideMismatch {
                        semantic: Semantic::Normal.as_str(),
                        expected: 3,
                        found: source.stride,
                    });
                }
                Binding::Normal(source)
            }
            Some(Semantic::TexCoord) => {
                let source = resolve_source(doc, decl.source()?)?;
                let channel = tex_channels;
                tex_channels += 1;
                Binding::TexCoord { source, channel }
            }
            Some(Semantic::Position) | None => return Err(decl.unsupported("primitive")),
        };
        inputs.push(Input { offset, binding });
    }
    Ok(inputs)
}

/// Resolve the mesh's single `<vertices>` element one level deep.
fn resolve_vertices(doc: &ColladaDocument<'_>, mesh: Node<'_, '_>) -> Result<Binding, ErrorKind> {
    let vertices: Vec<_> = document::children(mesh, "vertices").collect();
    let [vertices] = vertices.as_slice() else {
        return Err(ErrorKind::Cardinality {
            element: "vertices",
            parent: "mesh",
            found: vertices.len(),
        });
    };

    let mut positions = Vec::new();
    let mut normal = None;
    for nested in parse_inputs(document::children(*vertices, "input"))? {
        match nested.semantic() {
            Some(Semantic::Position) => positions.push(resolve_source(doc, nested.source()?)?),
            Some(Semantic::Normal) => normal = Some(resolve_source(doc, nested.source()?)?),
            _ => return Err(nested.unsupported("vertex")),
        }
    }

    let found = positions.len();
    let Some(position) = positions.pop().filter(|_| found == 1) else {
        return Err(ErrorKind::Cardinality {
            element: "POSITION input",
            parent: "vertices",
            found,
        });
    };
    Ok(Binding::Vertex { position, normal })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(semantic: &str, offset: i64) -> InputDecl {
        InputDecl {
            semantic: Some(semantic.into()),
            source: Some(format!("#{}", semantic.to_lowercase())),
            offset,
        }
    }

    fn decl_with_source(semantic: &str, source: &str, offset: i64) -> InputDecl {
        InputDecl {
            source: Some(source.into()),
            ..decl(semantic, offset)
        }
    }

    const MESH: &str = r##"<COLLADA><library_geometries><geometry id="g" name="G"><mesh>
      <source id="positions">
        <float_array id="positions-array" count="9">0 0 0 1 0 0 0 1 0</float_array>
        <technique_common><accessor source="#positions-array" count="3" stride="3"/></technique_common>
      </source>
      <source id="normals">
        <float_array id="normals-array" count="3">0 0 1</float_array>
        <technique_common><accessor source="#normals-array" count="1" stride="3"/></technique_common>
      </source>
      <source id="flat">
        <float_array id="flat-array" count="4">0 0 1 1</float_array>
        <technique_common><accessor source="#flat-array" count="2" stride="2"/></technique_common>
      </source>
      <vertices id="verts">
        <input semantic="POSITION" source="#positions"/>
        <input semantic="NORMAL" source="#normals"/>
      </vertices>
    </mesh></geometry></library_geometries></COLLADA>"##;

    fn mesh_node<'a, 'input>(doc: &'a ColladaDocument<'input>) -> Node<'a, 'input> {
        document::find(doc.root(), &["mesh"])[0]
    }

    #[test]
    fn parse_inputs_keeps_declaration_order() {
        let xml = r##"<triangles>
            <input semantic="TEXCOORD" source="#uv" offset="2" set="0"/>
            <input semantic="VERTEX" source="#verts"/>
            <input semantic="NORMAL" source="#n" offset="1"/>
        </triangles>"##;
        let doc = ColladaDocument::parse(xml).expect("parse");
        let decls = parse_inputs(document::children(doc.root(), "input")).expect("inputs");
        let order: Vec<_> = decls.iter().map(|d| (d.semantic.as_deref(), d.offset)).collect();
        assert_eq!(
            order,
            vec![(Some("TEXCOORD"), 2), (Some("VERTEX"), 0), (Some("NORMAL"), 1)]
        );
    }

    #[test]
    fn offsets_must_be_contiguous() {
        assert!(check_offsets(&[decl("VERTEX", 1), decl("NORMAL", 0)]).is_ok());
        let gap = check_offsets(&[decl("VERTEX", 0), decl("NORMAL", 2)]).unwrap_err();
        assert!(matches!(gap, ErrorKind::OffsetMismatch { ref offsets } if *offsets == [0, 2]));
        let dup = check_offsets(&[decl("VERTEX", 0), decl("NORMAL", 0)]).unwrap_err();
        assert!(matches!(dup, ErrorKind::OffsetMismatch { .. }));
        let bogus = check_offsets(&[decl("COLOR", 0), decl("VERTEX", 2)]).unwrap_err();
        assert!(matches!(bogus, ErrorKind::OffsetMismatch { .. }));
        let negative = check_offsets(&[decl("VERTEX", 0), decl("NORMAL", -1)]).unwrap_err();
        assert!(matches!(negative, ErrorKind::OffsetMismatch { ref offsets } if *offsets == [-1, 0]));
    }

    #[test]
    fn parse_inputs_keeps_missing_attributes_raw() {
        let xml = r##"<triangles>
            <input semantic="VERTEX" offset="0"/>
            <input source="#n" offset="-1"/>
        </triangles>"##;
        let doc = ColladaDocument::parse(xml).expect("parse");
        let decls = parse_inputs(document::children(doc.root(), "input")).expect("inputs");
        assert_eq!(decls[0].source, None);
        assert_eq!(decls[1].semantic, None);
        assert_eq!(decls[1].offset, -1);
        assert!(matches!(
            check_offsets(&decls),
            Err(ErrorKind::OffsetMismatch { .. })
        ));
    }

    #[test]
    fn vertex_input_pulls_nested_position_and_normal() {
        let doc = ColladaDocument::parse(MESH).expect("parse");
        let inputs = resolve_inputs(&doc, mesh_node(&doc), &[decl("VERTEX", 0)]).expect("resolve");
        let [Input { offset: 0, binding: Binding::Vertex { position, normal } }] = inputs.as_slice()
        else {
            panic!("unexpected inputs: {inputs:?}");
        };
        assert_eq!(position.count, 3);
        assert_eq!(normal.as_ref().map(|n| n.stride), Some(3));
    }

    #[test]
    fn texcoord_channels_follow_declaration_order() {
        let doc = ColladaDocument::parse(MESH).expect("parse");
        let decls = [
            decl_with_source("TEXCOORD", "#flat", 0),
            decl_with_source("TEXCOORD", "#flat", 1),
        ];
        let inputs = resolve_inputs(&doc, mesh_node(&doc), &decls).expect("resolve");
        let channels: Vec<_> = inputs
            .iter()
            .filter_map(|input| match &input.binding {
                Binding::TexCoord { channel, .. } => Some(*channel),
                _ => None,
            })
            .collect();
        assert_eq!(channels, vec![0, 1]);
    }

    #[test]
    fn normal_input_requires_stride_three() {
        let doc = ColladaDocument::parse(MESH).expect("parse");
        let decls = [decl_with_source("NORMAL", "#flat", 0)];
        let err = resolve_inputs(&doc, mesh_node(&doc), &decls).unwrap_err();
        assert!(matches!(err, ErrorKind::StrideMismatch { expected: 3, found: 2, .. }));
    }

    #[test]
    fn unknown_semantics_are_rejected() {
        let doc = ColladaDocument::parse(MESH).expect("parse");
        for semantic in ["COLOR", "POSITION"] {
            let err = resolve_inputs(&doc, mesh_node(&doc), &[decl(semantic, 0)]).unwrap_err();
            assert!(
                matches!(err, ErrorKind::UnsupportedSemantic { scope: "primitive", .. }),
                "{err}"
            );
        }
    }

    #[test]
    fn missing_semantic_is_unsupported() {
        let doc = ColladaDocument::parse(MESH).expect("parse");
        let decls = [InputDecl {
            semantic: None,
            ..decl("NORMAL", 0)
        }];
        let err = resolve_inputs(&doc, mesh_node(&doc), &decls).unwrap_err();
        assert!(matches!(
            err,
            ErrorKind::UnsupportedSemantic { scope: "primitive", ref semantic } if semantic.is_empty()
        ));
    }

    #[test]
    fn vertex_input_ignores_its_source_attribute() {
        let doc = ColladaDocument::parse(MESH).expect("parse");
        let decls = [InputDecl {
            source: None,
            ..decl("VERTEX", 0)
        }];
        let inputs = resolve_inputs(&doc, mesh_node(&doc), &decls).expect("resolve");
        assert!(matches!(inputs[0].binding, Binding::Vertex { .. }));

        let decls = [InputDecl {
            source: None,
            ..decl("NORMAL", 0)
        }];
        let err = resolve_inputs(&doc, mesh_node(&doc), &decls).unwrap_err();
        assert!(matches!(
            err,
            ErrorKind::MissingAttribute { element: "input", attribute: "source" }
        ));
    }

    #[test]
    fn vertices_must_appear_once() {
        let xml = r##"<COLLADA><mesh/></COLLADA>"##;
        let doc = ColladaDocument::parse(xml).expect("parse");
        let err = resolve_inputs(&doc, mesh_node(&doc), &[decl("VERTEX", 0)]).unwrap_err();
        assert!(matches!(
            err,
            ErrorKind::Cardinality { element: "vertices", found: 0, .. }
        ));
    }

    #[test]
    fn nested_vertex_semantics_are_limited() {
        let xml = MESH.replace(
            r##"<input semantic="NORMAL" source="#normals"/>"##,
            r##"<input semantic="COLOR" source="#normals"/>"##,
        );
        let doc = ColladaDocument::parse(&xml).expect("parse");
        let err = resolve_inputs(&doc, mesh_node(&doc), &[decl("VERTEX", 0)]).unwrap_err();
        assert!(matches!(
            err,
            ErrorKind::UnsupportedSemantic { scope: "vertex", ref semantic } if semantic == "COLOR"
        ));
    }
}

//! Expansion of `<triangles>` and `<polylist>` groups into flat buffers.

use roxmltree::Node;

use super::document::{self, ColladaDocument};
use super::error::ErrorKind;
use super::input::{self, Binding, Input};
use super::source::parse_usize_attr;
use crate::mesh::BufferAccumulator;

const VERTICES_PER_FACE: usize = 3;

/// Kind of primitive group element inside a `<mesh>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupKind {
    Triangles,
    Polylist,
}

impl GroupKind {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Triangles => "triangles",
            Self::Polylist => "polylist",
        }
    }
}

/// Flip the V texture coordinate to a top-left texture origin.
pub fn flip_v(t: f32) -> f32 {
    1.0 - t
}

/// Validate, resolve and expand one primitive group into `acc`.
pub fn process_group(
    doc: &ColladaDocument<'_>,
    mesh: Node<'_, '_>,
    group: Node<'_, '_>,
    kind: GroupKind,
    acc: &mut BufferAccumulator,
) -> Result<(), ErrorKind> {
    let tag = kind.tag();
    let vcounts = match kind {
        GroupKind::Polylist => Some(check_polylist_vcount(group)?),
        GroupKind::Triangles => None,
    };

    let face_count = parse_usize_attr(group, tag, "count")?;
    if let Some(vcounts) = vcounts {
        if vcounts != face_count {
            return Err(ErrorKind::CountMismatch {
                what: "vcount entries",
                expected: face_count,
                found: vcounts,
            });
        }
    }

    let decls = input::parse_inputs(document::children(group, "input"))?;
    input::check_offsets(&decls)?;
    let mut inputs = input::resolve_inputs(doc, mesh, &decls)?;

    let p: Vec<_> = document::children(group, "p").collect();
    let [p] = p.as_slice() else {
        return Err(ErrorKind::Cardinality {
            element: "p",
            parent: tag,
            found: p.len(),
        });
    };
    let indices = document::tokens(document::text(*p));

    log::debug!(
        "Expanding <{}> with {} faces and {} inputs",
        tag,
        face_count,
        inputs.len()
    );

    inputs.sort_by_key(|input| input.offset);
    triangulate(&inputs, face_count, &indices, acc)
}

/// Every `<vcount>` entry must be 3. Returns the number of entries.
fn check_polylist_vcount(group: Node<'_, '_>) -> Result<usize, ErrorKind> {
    let vcount: Vec<_> = document::children(group, "vcount").collect();
    let [vcount] = vcount.as_slice() else {
        return Err(ErrorKind::Cardinality {
            element: "vcount",
            parent: GroupKind::Polylist.tag(),
            found: vcount.len(),
        });
    };
    let entries = document::tokens(document::text(*vcount));
    if let Some(bad) = entries
        .iter()
        .find(|entry| entry.parse::<usize>() != Ok(VERTICES_PER_FACE))
    {
        return Err(ErrorKind::UnsupportedVertexCount {
            vcount: (*bad).to_owned(),
        });
    }
    Ok(entries.len())
}

/// Expand an interleaved index stream.
///
/// `inputs` must be sorted by offset with offsets `0..inputs.len()`; the
/// index of each input is its slot in every vertex tuple of `indices`.
pub fn triangulate(
    inputs: &[Input],
    face_count: usize,
    indices: &[&str],
    acc: &mut BufferAccumulator,
) -> Result<(), ErrorKind> {
    let stride = inputs.len();
    let expected = face_count
        .saturating_mul(stride)
        .saturating_mul(VERTICES_PER_FACE);
    if indices.len() != expected {
        return Err(ErrorKind::CountMismatch {
            what: "primitive index values",
            expected,
            found: indices.len(),
        });
    }

    for face in 0..face_count {
        for corner in 0..VERTICES_PER_FACE {
            for (slot, input) in inputs.iter().enumerate() {
                let token = indices[face * stride * VERTICES_PER_FACE + corner * stride + slot];
                let index = token.parse::<usize>().map_err(|_| ErrorKind::InvalidNumber {
                    what: "primitive index",
                    token: token.to_owned(),
                })?;

                match &input.binding {
                    Binding::Vertex { position, normal } => {
                        acc.push_position(position.element::<3>(index, "POSITION")?);
                        if let Some(normal) = normal {
                            acc.push_normal(normal.element::<3>(index, "NORMAL")?);
                        }
                        acc.emit_index().ok_or(ErrorKind::IndexOverflow)?;
                    }
                    Binding::Normal(source) => {
                        acc.push_normal(source.element::<3>(index, "NORMAL")?);
                    }
                    Binding::TexCoord { source, channel: 0 } => {
                        let [s, t] = source.element::<2>(index, "TEXCOORD")?;
                        acc.push_tex_coord([s, flip_v(t)]);
                    }
                    Binding::TexCoord { source, .. } => {
                        source.element::<2>(index, "TEXCOORD")?;
                    }
                }
            }
        }
    }
    Ok(())
}

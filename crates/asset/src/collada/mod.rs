//! COLLADA (`.dae`) geometry loader.
//!
//! Flattens every `library_geometries/geometry/mesh` of a document into a
//! single [`MeshBuffers`]: positions, normals, first-channel texture
//! coordinates and a sequential index stream. Only `<triangles>` and
//! `<polylist>` groups whose faces all have three vertices are accepted;
//! materials, scene nodes and animation data are ignored.
//!
//! Vertices are never shared. Each corner of each face becomes a new vertex
//! and the index stream simply counts up across the whole document.
//!
//! ```ignore
//! let buffers = asset::collada::load_collada_from_path("model.dae")?;
//! println!("{} vertices", buffers.vertex_count());
//! ```

mod document;
mod error;
mod input;
mod source;
mod triangulate;

use std::{fs, io::Read, path::Path};

pub use document::ColladaDocument;
pub use error::{ColladaError, ColladaResult, ErrorCategory, ErrorKind};
pub use input::{Binding, Input, InputDecl, Semantic};
pub use source::{Param, Source};
pub use triangulate::{GroupKind, flip_v};

use crate::mesh::{BufferAccumulator, MeshBuffers};

/// Load a COLLADA document from a file path.
pub fn load_collada_from_path(path: impl AsRef<Path>) -> ColladaResult<MeshBuffers> {
    let path = path.as_ref();
    log::info!("Loading COLLADA geometry from {:?}", path);
    let contents = fs::read_to_string(path).map_err(|source| ColladaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_collada_from_str(&contents)
}

/// Load a COLLADA document from any [`Read`] implementation.
pub fn load_collada_from_reader<R: Read>(mut reader: R) -> ColladaResult<MeshBuffers> {
    let mut contents = String::new();
    reader
        .read_to_string(&mut contents)
        .map_err(ColladaError::Read)?;
    load_collada_from_str(&contents)
}

/// Parse COLLADA XML text and flatten its geometry.
pub fn load_collada_from_str(contents: &str) -> ColladaResult<MeshBuffers> {
    let doc = ColladaDocument::parse(contents)?;
    load_collada(&doc)
}

/// Flatten all geometries of an already parsed document.
///
/// Processing stops at the first invalid geometry; no partial buffers are
/// returned.
pub fn load_collada(doc: &ColladaDocument<'_>) -> ColladaResult<MeshBuffers> {
    let mut acc = BufferAccumulator::new();

    for geometry in document::find(doc.root(), &["library_geometries", "geometry"]) {
        let id = document::attr(geometry, "id").unwrap_or_default();
        let name = document::attr(geometry, "name").unwrap_or_default();
        log::info!("Parsing geometry id={} name={}", id, name);

        load_geometry(doc, geometry, &mut acc).map_err(|kind| ColladaError::Geometry {
            id: id.to_owned(),
            name: name.to_owned(),
            kind,
        })?;
    }

    let buffers = acc.into_buffers();
    log::info!(
        "Loaded {} vertices ({} normal floats, {} texcoord floats, {} indices)",
        buffers.vertex_count(),
        buffers.normals.len(),
        buffers.tex_coords.len(),
        buffers.indices.len()
    );
    Ok(buffers)
}

fn load_geometry(
    doc: &ColladaDocument<'_>,
    geometry: roxmltree::Node<'_, '_>,
    acc: &mut BufferAccumulator,
) -> Result<(), ErrorKind> {
    let meshes: Vec<_> = document::children(geometry, "mesh").collect();
    let [mesh] = meshes.as_slice() else {
        return Err(ErrorKind::Cardinality {
            element: "mesh",
            parent: "geometry",
            found: meshes.len(),
        });
    };

    for kind in [GroupKind::Triangles, GroupKind::Polylist] {
        for group in document::children(*mesh, kind.tag()) {
            triangulate::process_group(doc, *mesh, group, kind, acc)?;
        }
    }
    Ok(())
}

//! Asset loading/parsers.
//! COLLADA geometry flattened into GPU-ready buffers.

pub mod collada;
pub mod mesh;

pub use collada::{
    ColladaDocument, ColladaError, ColladaResult, load_collada, load_collada_from_path,
    load_collada_from_reader, load_collada_from_str,
};
pub use mesh::{BufferAccumulator, MeshBuffers};

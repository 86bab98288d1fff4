//! Flat, GPU-ready mesh buffers produced by loaders.

/// Non-interleaved vertex streams plus a sequential index stream.
///
/// Positions and normals hold 3 floats per entry, texture coordinates 2.
/// Normal and texture coordinate streams are only filled when the source
/// document provides them, so their lengths may differ from the position
/// stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub tex_coords: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Number of emitted vertices (one position triple each).
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Returns `true` if both position and index buffers are non-empty.
    pub fn is_valid(&self) -> bool {
        !self.positions.is_empty() && !self.indices.is_empty()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_tex_coords(&self) -> bool {
        !self.tex_coords.is_empty()
    }

    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    pub fn tex_coord_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.tex_coords)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Append-only owner of [`MeshBuffers`] and the running vertex counter.
///
/// One accumulator lives for a whole document; every primitive group appends
/// to it in order, so emitted indices keep increasing across groups and
/// geometries.
#[derive(Debug, Default)]
pub struct BufferAccumulator {
    buffers: MeshBuffers,
    next_index: u32,
}

impl BufferAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value the next [`emit_index`](Self::emit_index) call will append.
    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    pub fn push_position(&mut self, position: [f32; 3]) {
        self.buffers.positions.extend_from_slice(&position);
    }

    pub fn push_normal(&mut self, normal: [f32; 3]) {
        self.buffers.normals.extend_from_slice(&normal);
    }

    pub fn push_tex_coord(&mut self, uv: [f32; 2]) {
        self.buffers.tex_coords.extend_from_slice(&uv);
    }

    /// Append the running counter to the index stream and advance it.
    ///
    /// Returns `None` once the counter can no longer be represented as `u32`.
    pub fn emit_index(&mut self) -> Option<u32> {
        let index = self.next_index;
        self.next_index = index.checked_add(1)?;
        self.buffers.indices.push(index);
        Some(index)
    }

    /// Read-only view of what has been accumulated so far.
    pub fn buffers(&self) -> &MeshBuffers {
        &self.buffers
    }

    pub fn into_buffers(self) -> MeshBuffers {
        self.buffers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffers_are_not_valid() {
        assert!(!MeshBuffers::default().is_valid());
    }

    #[test]
    fn indices_count_up_from_zero() {
        let mut acc = BufferAccumulator::new();
        for _ in 0..4 {
            acc.push_position([0.0, 0.0, 0.0]);
            acc.emit_index();
        }
        assert_eq!(acc.next_index(), 4);
        let buffers = acc.into_buffers();
        assert_eq!(buffers.indices, vec![0, 1, 2, 3]);
        assert_eq!(buffers.vertex_count(), 4);
        assert!(buffers.is_valid());
        assert!(!buffers.has_normals());
    }

    #[test]
    fn byte_views_match_buffer_sizes() {
        let mut acc = BufferAccumulator::new();
        acc.push_position([1.0, 2.0, 3.0]);
        acc.push_normal([0.0, 0.0, 1.0]);
        acc.push_tex_coord([0.5, 0.5]);
        acc.emit_index();
        let buffers = acc.into_buffers();
        assert_eq!(buffers.position_bytes().len(), 12);
        assert_eq!(buffers.normal_bytes().len(), 12);
        assert_eq!(buffers.tex_coord_bytes().len(), 8);
        assert_eq!(buffers.index_bytes().len(), 4);
    }
}

//! Meshlet descriptor table entries

use bytemuck::{Pod, Zeroable};

/// Offsets and counts locating one meshlet inside the geometry store.
///
/// `vertex_list_offset` is an element offset into the meshlet vertex-index
/// list (`u32` entries). `triangle_list_offset` is a *byte* offset into the
/// packed triangle array: local index `i` of this meshlet is the byte at
/// `triangle_list_offset + i`. The meshlet builder emits offsets in exactly
/// this convention.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct MeshletDescription {
    pub vertex_list_offset: u32,
    pub triangle_list_offset: u32,
    pub triangle_count: u32,
    pub vertex_count: u32,
}

impl MeshletDescription {
    pub fn new(
        vertex_list_offset: u32,
        triangle_list_offset: u32,
        triangle_count: u32,
        vertex_count: u32,
    ) -> Self {
        Self {
            vertex_list_offset,
            triangle_list_offset,
            triangle_count,
            vertex_count,
        }
    }

    /// Number of index slots that produce real vertices (three per triangle)
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.triangle_count * 3
    }

    /// Whether `local_vtx_id` is a padding slot beyond the last triangle
    #[inline]
    pub fn is_padding(&self, local_vtx_id: u32) -> bool {
        local_vtx_id >= self.index_count()
    }

    /// Byte address of local index `local_vtx_id` in the packed triangle array
    #[inline]
    pub fn triangle_byte_address(&self, local_vtx_id: u32) -> u32 {
        self.triangle_list_offset + local_vtx_id
    }
}

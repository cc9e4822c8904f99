//! Geometry store: the flat, immutable buffers bound at group 1

use crate::meshlet::MeshletDescription;
use crate::packing::PackedBytes;

/// Flat geometry arrays shared by every meshlet of every mesh.
///
/// - `vertices`: all vertices of all meshes, concatenated
/// - `meshlet_vertex_indices`: per-meshlet lists of *global* vertex ids
/// - `meshlet_triangle_indices`: per-meshlet local indices, one byte each,
///   packed four per word
/// - `meshlets`: the descriptor table addressing the two lists above
///
/// The store does not validate cross references; the builder that fills it
/// is responsible for referential integrity.
#[derive(Debug, Clone)]
pub struct GeometryStore<V> {
    pub vertices: Vec<V>,
    pub meshlet_vertex_indices: Vec<u32>,
    pub meshlet_triangle_indices: PackedBytes,
    pub meshlets: Vec<MeshletDescription>,
}

impl<V> Default for GeometryStore<V> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            meshlet_vertex_indices: Vec::new(),
            meshlet_triangle_indices: PackedBytes::new(),
            meshlets: Vec::new(),
        }
    }
}

impl<V> GeometryStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.meshlets.is_empty()
    }

    /// Largest triangle count of any meshlet
    pub fn max_meshlet_triangles(&self) -> u32 {
        self.meshlets
            .iter()
            .map(|m| m.triangle_count)
            .max()
            .unwrap_or(0)
    }

    /// Global vertex id for a non-padding local index of `meshlet`.
    ///
    /// Walks packed byte -> meshlet vertex list -> global id. Callers must
    /// reject padding slots first.
    #[inline]
    pub fn meshlet_vertex_id(&self, meshlet: &MeshletDescription, local_vtx_id: u32) -> u32 {
        let address = meshlet.triangle_byte_address(local_vtx_id);
        let local_index = crate::packing::read_packed(self.meshlet_triangle_indices.words(), address);
        self.meshlet_vertex_indices[(meshlet.vertex_list_offset + local_index) as usize]
    }
}

use meshpull_render::RenderError;

use crate::handle::AssetId;

/// Errors raised while registering geometry or assembling scene buffers.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("mesh '{name}' has {count} indices, not a multiple of 3")]
    InvalidIndexCount { name: String, count: usize },

    #[error("mesh '{name}' references vertex {index} but has only {vertex_count}")]
    IndexOutOfRange {
        name: String,
        index: u32,
        vertex_count: usize,
    },

    #[error("meshlet limits out of range: {max_vertices} vertices, {max_triangles} triangles")]
    InvalidMeshletLimits { max_vertices: u32, max_triangles: u32 },

    #[error("failed to cluster mesh '{name}': {reason}")]
    Clustering { name: String, reason: String },

    #[error("asset {0} is not loaded")]
    NotLoaded(AssetId),

    #[error("bone {bone} names parent {parent}, parents must come first")]
    InvalidBoneParent { bone: usize, parent: usize },

    #[error("mesh '{name}' is skinned to joint {joint} but its skeleton has {bone_count} bones")]
    JointOutOfRange {
        name: String,
        joint: u32,
        bone_count: usize,
    },

    #[error(transparent)]
    Render(#[from] RenderError),
}

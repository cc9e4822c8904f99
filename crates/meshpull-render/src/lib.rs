//! Meshpull Render - GPU-driven vertex pulling, expressed as data-parallel passes
//!
//! Every invocation walks draw command -> meshlet descriptor -> packed local
//! index -> global vertex on its own, so one dispatch can draw any number of
//! meshlet instances without per-draw host work. Invocations are executed by
//! [`dispatch`] on a rayon pool; all buffers are borrowed immutably for the
//! duration of a dispatch.

pub mod bindings;
pub mod bones;
pub mod dispatch;
pub mod draw;
pub mod error;
pub mod geometry;
pub mod instanced;
pub mod mesh;
pub mod meshlet;
pub mod packing;
pub mod resolve;
pub mod scene;
pub mod skinning;
pub mod texture;
pub mod vertex;

pub use bones::{BoneBuffer, MAX_BONES_PER_SET};
pub use dispatch::{dispatch_vertices, dispatch_vertices_into, DispatchSize, Invocation, VertexStage};
pub use draw::{AnimatedDrawCommand, DrawCommand};
pub use error::RenderError;
pub use geometry::GeometryStore;
pub use instanced::{InstanceData, InstanceLookup, InstancedPass, MeshDescription};
pub use mesh::Mesh;
pub use meshlet::MeshletDescription;
pub use packing::PackedBytes;
pub use resolve::{AnimatedMeshletPass, MeshletPass, VertexOutput, CULLED_CLIP_POSITION};
pub use scene::{Camera, CameraUniform, Viewport};
pub use skinning::{skin_matrix, skin_vertex, DEFAULT_NORMAL, NORMAL_EPSILON};
pub use texture::{
    shade_fragment, AddressMode, FilterMode, FragmentInput, Sampler, TextureArray,
    TEXTURE_NOT_LOADED,
};
pub use vertex::{SkinnedVertex, Vertex};

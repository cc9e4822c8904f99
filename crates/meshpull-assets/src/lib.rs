//! Meshpull Assets - Builds the buffers the vertex-pulling passes read
//!
//! Nothing here touches files. Geometry comes in as in-memory meshes, is
//! registered with a [`GeometryRegistry`], clustered into meshlets and
//! assembled into the flat arrays of a [`StaticScene`], an [`AnimatedScene`]
//! or an [`InstancedBatch`]. Skinned models carry a [`Skeleton`]; sampled
//! [`Animation`]s are baked into bone sets with [`bake_bone_set`].

mod animation;
mod batch;
mod error;
mod handle;
mod layout;
mod mesh;
mod meshlet_builder;
mod registry;
mod scene;
mod skeleton;

pub use animation::{bake_bone_set, sample_keys, Animation, AnimationPlayer, Channel, Interpolate, Keyframe};
pub use batch::{build_instanced_batch, InstanceRequest, InstancedBatch};
pub use error::AssetError;
pub use handle::{AssetHandle, AssetId};
pub use layout::{layout_models_in_a_row, MODEL_SPACING};
pub use mesh::{MeshAsset, SkinnedMesh, SkinnedModel, StaticMesh, VertexPosition};
pub use meshlet_builder::{build_meshlets, LocalMeshlet, MeshletData, MeshletLimits};
pub use registry::{GeometryRegistry, TextureEntry};
pub use scene::{AnimatedInstance, AnimatedScene, AnimatedSceneBuilder, StaticScene, StaticSceneBuilder};
pub use skeleton::{Bone, Skeleton};

//! Meshlet vertex resolution.
//!
//! Each invocation resolves its own vertex:
//!
//! 1. draw record for the instance index
//! 2. meshlet descriptor named by the record
//! 3. padding slots (`vertex_index >= triangle_count * 3`) are culled
//! 4. packed local index at byte `triangle_list_offset + vertex_index`
//! 5. `vertex_list_offset + local index` -> global vertex id -> vertex
//! 6. model (static) or skin (animated) transform, then view-projection
//!
//! Ids in draw records are trusted; the asset builder guarantees they are in
//! range.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::bones::BoneBuffer;
use crate::dispatch::{Invocation, VertexStage};
use crate::draw::{AnimatedDrawCommand, DrawCommand};
use crate::geometry::GeometryStore;
use crate::scene::CameraUniform;
use crate::skinning::{safe_normalize, skin_matrix, skin_vertex};
use crate::vertex::{SkinnedVertex, Vertex};

/// Clip position for culled invocations, outside the view volume on every axis.
pub const CULLED_CLIP_POSITION: Vec4 = Vec4::new(2.0, 2.0, 2.0, 1.0);

/// Output of one vertex invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexOutput {
    pub clip_position: Vec4,
    pub world_position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    /// Flat (not interpolated) texture-array layer
    pub texture_id: u32,
    /// Flat transform slot of the draw, used to tag ID-buffer writes
    pub transform_id: u32,
}

impl VertexOutput {
    /// The deterministic output of a padding invocation
    pub fn culled() -> Self {
        Self {
            clip_position: CULLED_CLIP_POSITION,
            world_position: Vec3::ZERO,
            normal: Vec3::ZERO,
            uv: Vec2::ZERO,
            texture_id: 0,
            transform_id: 0,
        }
    }

    pub fn is_culled(&self) -> bool {
        self.clip_position == CULLED_CLIP_POSITION
    }
}

/// Static meshlet draw: groups 0-2 bound for one dispatch
pub struct MeshletPass<'a> {
    pub camera: &'a CameraUniform,
    pub geometry: &'a GeometryStore<Vertex>,
    pub draws: &'a [DrawCommand],
    pub transforms: &'a [Mat4],
}

impl MeshletPass<'_> {
    pub fn vertex(&self, instance_id: u32, local_vtx_id: u32) -> VertexOutput {
        let draw = self.draws[instance_id as usize];
        let meshlet = self.geometry.meshlets[draw.meshlet_id as usize];
        if meshlet.is_padding(local_vtx_id) {
            return VertexOutput::culled();
        }

        let vertex_id = self.geometry.meshlet_vertex_id(&meshlet, local_vtx_id);
        let vertex = &self.geometry.vertices[vertex_id as usize];

        let model = self.transforms[draw.transform_id as usize];
        let world = model * vertex.position();
        let normal = safe_normalize((model * vertex.normal().extend(0.0)).truncate());

        VertexOutput {
            clip_position: self.camera.view_proj() * world,
            world_position: world.truncate(),
            normal,
            uv: vertex.uv(),
            texture_id: draw.texture_id,
            transform_id: draw.transform_id,
        }
    }
}

impl VertexStage for MeshletPass<'_> {
    fn invoke(&self, invocation: Invocation) -> VertexOutput {
        self.vertex(invocation.instance_index, invocation.vertex_index)
    }
}

/// Skinned meshlet draw.
///
/// Bone matrices already contain the instance's world transform, so no model
/// matrix is applied here.
pub struct AnimatedMeshletPass<'a> {
    pub camera: &'a CameraUniform,
    pub bones: &'a BoneBuffer,
    pub geometry: &'a GeometryStore<SkinnedVertex>,
    pub draws: &'a [AnimatedDrawCommand],
}

impl AnimatedMeshletPass<'_> {
    pub fn vertex(&self, instance_id: u32, local_vtx_id: u32) -> VertexOutput {
        let draw = self.draws[instance_id as usize];
        let meshlet = self.geometry.meshlets[draw.meshlet_id as usize];
        if meshlet.is_padding(local_vtx_id) {
            return VertexOutput::culled();
        }

        let vertex_id = self.geometry.meshlet_vertex_id(&meshlet, local_vtx_id);
        let vertex = &self.geometry.vertices[vertex_id as usize];

        let skin = skin_matrix(vertex.joints, vertex.weights, draw.bone_set_id, self.bones);
        let (world, normal) = skin_vertex(&skin, vertex.position(), vertex.normal());

        VertexOutput {
            clip_position: self.camera.view_proj() * world,
            world_position: world.truncate(),
            normal,
            uv: vertex.uv(),
            texture_id: draw.texture_id,
            transform_id: draw.transform_id,
        }
    }
}

impl VertexStage for AnimatedMeshletPass<'_> {
    fn invoke(&self, invocation: Invocation) -> VertexOutput {
        self.vertex(invocation.instance_index, invocation.vertex_index)
    }
}

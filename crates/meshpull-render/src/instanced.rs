//! Non-meshlet vertex pulling.
//!
//! A single flat draw spans many independent meshes. A lookup table maps
//! each global vertex id to `(instance, local vertex)`; from there the chain
//! is instance -> mesh description -> index buffer -> vertex buffer. Every
//! global id is valid by construction of the table, so nothing is culled.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::dispatch::{Invocation, VertexStage};
use crate::resolve::VertexOutput;
use crate::scene::CameraUniform;
use crate::skinning::safe_normalize;
use crate::vertex::Vertex;

/// Location of one mesh inside the shared index and vertex buffers
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct MeshDescription {
    pub index_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub _padding: u32,
}

impl MeshDescription {
    pub fn new(index_count: u32, first_index: u32, base_vertex: i32) -> Self {
        Self {
            index_count,
            first_index,
            base_vertex,
            _padding: 0,
        }
    }
}

/// Per-instance data of the flat draw
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub model_matrix: [[f32; 4]; 4],
    /// Dense index into the mesh description table
    pub mesh_id: u32,
    pub texture_id: u32,
    /// Indices drawn for this instance; `u32::MAX` marks a mesh still loading
    pub index_count: u32,
    pub _padding: u32,
}

impl InstanceData {
    /// Index count of an instance whose mesh has not been uploaded yet
    pub const PENDING: u32 = u32::MAX;

    pub fn new(model_matrix: Mat4, mesh_id: u32, texture_id: u32, index_count: u32) -> Self {
        Self {
            model_matrix: model_matrix.to_cols_array_2d(),
            mesh_id,
            texture_id,
            index_count,
            _padding: 0,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.index_count == Self::PENDING
    }

    #[inline]
    pub fn model(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model_matrix)
    }
}

/// Entry of the global-vertex lookup table
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct InstanceLookup {
    pub instance_id: u32,
    pub local_vertex_index: u32,
}

/// Flat draw over every instance, dispatched with `DispatchSize::flat`
pub struct InstancedPass<'a> {
    pub camera: &'a CameraUniform,
    pub vertices: &'a [Vertex],
    pub indices: &'a [u32],
    pub meshes: &'a [MeshDescription],
    pub instances: &'a [InstanceData],
    pub lookups: &'a [InstanceLookup],
}

impl InstancedPass<'_> {
    pub fn vertex(&self, global_vertex_id: u32) -> VertexOutput {
        let lookup = self.lookups[global_vertex_id as usize];
        let instance = &self.instances[lookup.instance_id as usize];
        let mesh = self.meshes[instance.mesh_id as usize];

        let index = self.indices[(mesh.first_index + lookup.local_vertex_index) as usize];
        let vertex_id = (mesh.base_vertex + index as i32) as usize;
        let vertex = &self.vertices[vertex_id];

        let model = instance.model();
        let world = model * vertex.position();
        let normal = safe_normalize((model * vertex.normal().extend(0.0)).truncate());

        VertexOutput {
            clip_position: self.camera.view_proj() * world,
            world_position: world.truncate(),
            normal,
            uv: vertex.uv(),
            texture_id: instance.texture_id,
            transform_id: lookup.instance_id,
        }
    }
}

impl VertexStage for InstancedPass<'_> {
    fn invoke(&self, invocation: Invocation) -> VertexOutput {
        self.vertex(invocation.vertex_index)
    }
}

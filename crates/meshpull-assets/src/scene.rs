//! Assembles registered meshes into the flat buffers of the meshlet passes.
//!
//! Every mesh is clustered and appended once, however many instances use
//! it. Each instance then gets one draw command per meshlet of its mesh.

use std::collections::HashMap;
use std::ops::Range;

use bytemuck::Pod;
use glam::Mat4;
use meshpull_render::{
    AnimatedDrawCommand, BoneBuffer, DrawCommand, GeometryStore, MeshletDescription, SkinnedVertex,
    Vertex,
};
use tracing::info;

use crate::animation::bake_bone_set;
use crate::error::AssetError;
use crate::handle::{AssetHandle, AssetId};
use crate::layout::layout_models_in_a_row;
use crate::mesh::{MeshAsset, SkinnedModel, StaticMesh};
use crate::meshlet_builder::{build_meshlets, MeshletLimits};
use crate::registry::{GeometryRegistry, TextureEntry};

/// Cluster `mesh` and append it to `geometry`. Returns the range of meshlet
/// ids it occupies.
fn append_mesh<V: Pod>(
    geometry: &mut GeometryStore<V>,
    mesh: &MeshAsset<V>,
    limits: MeshletLimits,
) -> Result<Range<u32>, AssetError> {
    let data = build_meshlets(&mesh.name, &mesh.indices, &mesh.vertices, limits)?;

    let vertex_base = geometry.vertices.len() as u32;
    let vertex_list_base = geometry.meshlet_vertex_indices.len() as u32;
    let triangle_base = geometry.meshlet_triangle_indices.len();

    geometry.vertices.extend_from_slice(&mesh.vertices);
    geometry
        .meshlet_vertex_indices
        .extend(data.vertices.iter().map(|&v| vertex_base + v));
    geometry.meshlet_triangle_indices.extend_from_slice(&data.triangles);

    let first = geometry.meshlets.len() as u32;
    geometry
        .meshlets
        .extend(data.meshlets.iter().map(|m| {
            MeshletDescription::new(
                vertex_list_base + m.vertex_offset,
                triangle_base + m.triangle_offset,
                m.triangle_count,
                m.vertex_count,
            )
        }));
    Ok(first..geometry.meshlets.len() as u32)
}

/// Buffers for [`MeshletPass`](meshpull_render::MeshletPass)
#[derive(Debug, Clone, Default)]
pub struct StaticScene {
    pub geometry: GeometryStore<Vertex>,
    pub draws: Vec<DrawCommand>,
    pub transforms: Vec<Mat4>,
}

impl StaticScene {
    pub fn max_meshlet_triangles(&self) -> u32 {
        self.geometry.max_meshlet_triangles()
    }
}

pub struct StaticSceneBuilder<'a> {
    registry: &'a GeometryRegistry,
    limits: MeshletLimits,
    uploaded: HashMap<AssetId, Range<u32>>,
    scene: StaticScene,
}

impl<'a> StaticSceneBuilder<'a> {
    pub fn new(registry: &'a GeometryRegistry, limits: MeshletLimits) -> Result<Self, AssetError> {
        limits.validate()?;
        Ok(Self {
            registry,
            limits,
            uploaded: HashMap::new(),
            scene: StaticScene::default(),
        })
    }

    /// Place one instance of `mesh`. Returns its transform id.
    pub fn add_instance(
        &mut self,
        mesh: AssetHandle<StaticMesh>,
        transform: Mat4,
        texture: Option<AssetHandle<TextureEntry>>,
    ) -> Result<u32, AssetError> {
        let meshlets = match self.uploaded.get(&mesh.id()) {
            Some(range) => range.clone(),
            None => {
                let asset = self
                    .registry
                    .get_mesh(mesh)
                    .ok_or(AssetError::NotLoaded(mesh.id()))?;
                let range = append_mesh(&mut self.scene.geometry, asset, self.limits)?;
                self.uploaded.insert(mesh.id(), range.clone());
                range
            }
        };

        let transform_id = self.scene.transforms.len() as u32;
        self.scene.transforms.push(transform);
        let texture_id = self.registry.texture_id(texture);
        self.scene.draws.extend(
            meshlets.map(|meshlet_id| DrawCommand::new(meshlet_id, transform_id, texture_id)),
        );
        Ok(transform_id)
    }

    /// Place each mesh once, side by side along +X.
    pub fn add_row(
        &mut self,
        meshes: &[(AssetHandle<StaticMesh>, Option<AssetHandle<TextureEntry>>)],
    ) -> Result<Vec<u32>, AssetError> {
        let aabbs = meshes
            .iter()
            .map(|&(mesh, _)| {
                self.registry
                    .get_mesh(mesh)
                    .and_then(|m| m.aabb())
                    .ok_or(AssetError::NotLoaded(mesh.id()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        layout_models_in_a_row(&aabbs)
            .into_iter()
            .zip(meshes)
            .map(|(transform, &(mesh, texture))| self.add_instance(mesh, transform, texture))
            .collect()
    }

    pub fn finish(self) -> StaticScene {
        info!(
            "Static scene: {} vertices, {} meshlets, {} draws, {} transforms",
            self.scene.geometry.vertices.len(),
            self.scene.geometry.meshlets.len(),
            self.scene.draws.len(),
            self.scene.transforms.len()
        );
        self.scene
    }
}

/// One skinned instance and where its data lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimatedInstance {
    pub model: AssetHandle<SkinnedModel>,
    pub transform_id: u32,
    pub bone_set_id: u32,
}

/// Buffers for [`AnimatedMeshletPass`](meshpull_render::AnimatedMeshletPass)
#[derive(Debug, Clone, Default)]
pub struct AnimatedScene {
    pub geometry: GeometryStore<SkinnedVertex>,
    pub draws: Vec<AnimatedDrawCommand>,
    pub bones: BoneBuffer,
    /// World transform of each instance, already folded into its bone set
    pub transforms: Vec<Mat4>,
    pub instances: Vec<AnimatedInstance>,
}

impl AnimatedScene {
    pub fn max_meshlet_triangles(&self) -> u32 {
        self.geometry.max_meshlet_triangles()
    }
}

pub struct AnimatedSceneBuilder<'a> {
    registry: &'a GeometryRegistry,
    limits: MeshletLimits,
    uploaded: HashMap<AssetId, Range<u32>>,
    scene: AnimatedScene,
}

impl<'a> AnimatedSceneBuilder<'a> {
    pub fn new(registry: &'a GeometryRegistry, limits: MeshletLimits) -> Result<Self, AssetError> {
        limits.validate()?;
        Ok(Self {
            registry,
            limits,
            uploaded: HashMap::new(),
            scene: AnimatedScene::default(),
        })
    }

    /// Place one skinned instance. Its bone set starts in the rest pose.
    pub fn add_instance(
        &mut self,
        model: AssetHandle<SkinnedModel>,
        transform: Mat4,
        texture: Option<AssetHandle<TextureEntry>>,
    ) -> Result<AnimatedInstance, AssetError> {
        let asset = self
            .registry
            .get_skinned_model(model)
            .ok_or(AssetError::NotLoaded(model.id()))?;

        let meshlets = match self.uploaded.get(&model.id()) {
            Some(range) => range.clone(),
            None => {
                let range = append_mesh(&mut self.scene.geometry, &asset.mesh, self.limits)?;
                self.uploaded.insert(model.id(), range.clone());
                range
            }
        };

        let rest = bake_bone_set(&asset.skeleton, None, 0.0, transform);
        let bone_set_id = self.scene.bones.push_set(&rest)?;
        let transform_id = self.scene.transforms.len() as u32;
        self.scene.transforms.push(transform);

        let texture_id = self.registry.texture_id(texture);
        self.scene.draws.extend(meshlets.map(|meshlet_id| {
            AnimatedDrawCommand::new(meshlet_id, bone_set_id, transform_id, texture_id)
        }));

        let instance = AnimatedInstance {
            model,
            transform_id,
            bone_set_id,
        };
        self.scene.instances.push(instance);
        Ok(instance)
    }

    pub fn finish(self) -> AnimatedScene {
        info!(
            "Animated scene: {} vertices, {} meshlets, {} draws, {} bone matrices",
            self.scene.geometry.vertices.len(),
            self.scene.geometry.meshlets.len(),
            self.scene.draws.len(),
            self.scene.bones.len()
        );
        self.scene
    }
}

//! Flat instanced batch for the non-meshlet path

use std::collections::{BTreeSet, HashMap};

use glam::Mat4;
use meshpull_render::{
    CameraUniform, InstanceData, InstanceLookup, InstancedPass, MeshDescription, Vertex,
};
use tracing::debug;

use crate::handle::{AssetHandle, AssetId};
use crate::mesh::StaticMesh;
use crate::registry::{GeometryRegistry, TextureEntry};

/// One instance the caller wants drawn this frame
#[derive(Debug, Clone, Copy)]
pub struct InstanceRequest {
    pub mesh: AssetHandle<StaticMesh>,
    pub model: Mat4,
    pub texture: Option<AssetHandle<TextureEntry>>,
}

/// Every buffer of one [`InstancedPass`]
#[derive(Debug, Clone, Default)]
pub struct InstancedBatch {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub meshes: Vec<MeshDescription>,
    pub instances: Vec<InstanceData>,
    pub lookups: Vec<InstanceLookup>,
}

impl InstancedBatch {
    /// Vertices the flat draw has to cover, one per lookup entry
    pub fn total_vertices(&self) -> u32 {
        self.lookups.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.lookups.is_empty()
    }

    pub fn pass<'a>(&'a self, camera: &'a CameraUniform) -> InstancedPass<'a> {
        InstancedPass {
            camera,
            vertices: &self.vertices,
            indices: &self.indices,
            meshes: &self.meshes,
            instances: &self.instances,
            lookups: &self.lookups,
        }
    }
}

/// Build the shared buffers and the global-vertex lookup table.
///
/// Instances whose mesh is still pending are dropped first. Loaded meshes
/// are then ordered by id and packed densely, so `mesh_id` in the instance
/// data indexes the description table directly. Instances whose mesh has no
/// description are skipped.
pub fn build_instanced_batch(
    registry: &GeometryRegistry,
    requests: &[InstanceRequest],
) -> InstancedBatch {
    let instances: Vec<(AssetId, InstanceData)> = requests
        .iter()
        .map(|request| {
            let index_count = registry
                .get_mesh(request.mesh)
                .map(|mesh| mesh.indices.len() as u32)
                .unwrap_or(InstanceData::PENDING);
            let data = InstanceData::new(
                request.model,
                request.mesh.id(),
                registry.texture_id(request.texture),
                index_count,
            );
            (request.mesh.id(), data)
        })
        .filter(|(_, data)| !data.is_pending())
        .collect();

    let used: BTreeSet<AssetId> = instances.iter().map(|&(id, _)| id).collect();
    let mut batch = InstancedBatch::default();
    let mut dense: HashMap<AssetId, u32> = HashMap::new();

    for id in used {
        let Some(mesh) = registry.get_mesh(AssetHandle::new(id)) else {
            continue;
        };
        dense.insert(id, batch.meshes.len() as u32);
        batch.meshes.push(MeshDescription::new(
            mesh.indices.len() as u32,
            batch.indices.len() as u32,
            batch.vertices.len() as i32,
        ));
        batch.vertices.extend_from_slice(&mesh.vertices);
        batch.indices.extend_from_slice(&mesh.indices);
    }

    for (id, mut data) in instances {
        let Some(&mesh_id) = dense.get(&id) else {
            debug!("Skipping instance of unloaded mesh {}", id);
            continue;
        };
        data.mesh_id = mesh_id;
        let instance_id = batch.instances.len() as u32;
        batch
            .lookups
            .extend((0..data.index_count).map(|local_vertex_index| InstanceLookup {
                instance_id,
                local_vertex_index,
            }));
        batch.instances.push(data);
    }

    let skipped = requests.len() - batch.instances.len();
    debug!(
        "Instanced batch: {} meshes, {} instances ({} skipped), {} vertices",
        batch.meshes.len(),
        batch.instances.len(),
        skipped,
        batch.total_vertices()
    );
    batch
}

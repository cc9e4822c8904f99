use std::collections::HashMap;

use meshpull_render::TEXTURE_NOT_LOADED;
use tracing::{debug, info};

use crate::animation::Animation;
use crate::error::AssetError;
use crate::handle::{AssetHandle, AssetId};
use crate::mesh::{SkinnedModel, StaticMesh};

/// Residency of one texture in the GPU texture array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureEntry {
    pub name: String,
    /// Array layer once uploaded
    pub layer: Option<u32>,
}

/// Central registry of in-memory geometry. Hands out typed handles,
/// deduplicates by name and tracks what is loaded.
///
/// Meshes and textures can be reserved before their data exists; their
/// handles are valid immediately and report not loaded until filled.
#[derive(Default)]
pub struct GeometryRegistry {
    next_id: AssetId,
    meshes: HashMap<AssetId, StaticMesh>,
    skinned_models: HashMap<AssetId, SkinnedModel>,
    animations: HashMap<AssetId, Animation>,
    textures: HashMap<AssetId, TextureEntry>,
    name_to_mesh: HashMap<String, AssetHandle<StaticMesh>>,
    name_to_skinned: HashMap<String, AssetHandle<SkinnedModel>>,
    name_to_animation: HashMap<String, AssetHandle<Animation>>,
    name_to_texture: HashMap<String, AssetHandle<TextureEntry>>,
}

impl GeometryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate<T>(&mut self) -> AssetHandle<T> {
        self.next_id += 1;
        AssetHandle::new(self.next_id)
    }

    /// Handle for the mesh called `name`, reserving one if it is unknown.
    pub fn reserve_mesh(&mut self, name: &str) -> AssetHandle<StaticMesh> {
        if let Some(&handle) = self.name_to_mesh.get(name) {
            return handle;
        }
        let handle = self.allocate();
        self.name_to_mesh.insert(name.to_string(), handle);
        debug!("Reserved mesh '{}' as {:?}", name, handle);
        handle
    }

    /// Register mesh data under its name. A reserved handle for that name is
    /// filled in; a name that is already loaded keeps its existing data.
    pub fn add_mesh(&mut self, mesh: StaticMesh) -> Result<AssetHandle<StaticMesh>, AssetError> {
        mesh.validate()?;
        let handle = self.reserve_mesh(&mesh.name);
        if !self.meshes.contains_key(&handle.id()) {
            info!(
                "Loaded mesh '{}': {} vertices, {} triangles",
                mesh.name,
                mesh.vertices.len(),
                mesh.triangle_count()
            );
            self.meshes.insert(handle.id(), mesh);
        }
        Ok(handle)
    }

    /// Drop a mesh's data; its handle stays reserved.
    pub fn unload_mesh(&mut self, handle: AssetHandle<StaticMesh>) -> Option<StaticMesh> {
        self.meshes.remove(&handle.id())
    }

    pub fn add_skinned_model(
        &mut self,
        model: SkinnedModel,
    ) -> Result<AssetHandle<SkinnedModel>, AssetError> {
        if let Some(&handle) = self.name_to_skinned.get(&model.mesh.name) {
            return Ok(handle);
        }
        let handle = self.allocate();
        info!(
            "Loaded skinned model '{}': {} vertices, {} bones",
            model.mesh.name,
            model.mesh.vertices.len(),
            model.skeleton.len()
        );
        self.name_to_skinned.insert(model.mesh.name.clone(), handle);
        self.skinned_models.insert(handle.id(), model);
        Ok(handle)
    }

    pub fn add_animation(&mut self, animation: Animation) -> AssetHandle<Animation> {
        if let Some(&handle) = self.name_to_animation.get(&animation.name) {
            return handle;
        }
        let handle = self.allocate();
        self.name_to_animation.insert(animation.name.clone(), handle);
        self.animations.insert(handle.id(), animation);
        handle
    }

    /// Handle for the texture called `name`; new textures start pending.
    pub fn add_texture(&mut self, name: &str) -> AssetHandle<TextureEntry> {
        if let Some(&handle) = self.name_to_texture.get(name) {
            return handle;
        }
        let handle = self.allocate();
        self.name_to_texture.insert(name.to_string(), handle);
        self.textures.insert(
            handle.id(),
            TextureEntry {
                name: name.to_string(),
                layer: None,
            },
        );
        handle
    }

    /// Record the array layer a texture was uploaded to.
    pub fn set_texture_layer(
        &mut self,
        handle: AssetHandle<TextureEntry>,
        layer: u32,
    ) -> Result<(), AssetError> {
        let entry = self
            .textures
            .get_mut(&handle.id())
            .ok_or(AssetError::NotLoaded(handle.id()))?;
        debug!("Texture '{}' resident at layer {}", entry.name, layer);
        entry.layer = Some(layer);
        Ok(())
    }

    /// Texture id to write into draw data. Missing and pending textures map
    /// to [`TEXTURE_NOT_LOADED`].
    pub fn texture_id(&self, handle: Option<AssetHandle<TextureEntry>>) -> u32 {
        handle
            .and_then(|h| self.textures.get(&h.id()))
            .and_then(|entry| entry.layer)
            .unwrap_or(TEXTURE_NOT_LOADED)
    }

    pub fn texture_id_by_name(&self, name: &str) -> u32 {
        self.texture_id(self.name_to_texture.get(name).copied())
    }

    pub fn get_mesh(&self, handle: AssetHandle<StaticMesh>) -> Option<&StaticMesh> {
        self.meshes.get(&handle.id())
    }

    pub fn get_skinned_model(&self, handle: AssetHandle<SkinnedModel>) -> Option<&SkinnedModel> {
        self.skinned_models.get(&handle.id())
    }

    pub fn get_animation(&self, handle: AssetHandle<Animation>) -> Option<&Animation> {
        self.animations.get(&handle.id())
    }

    pub fn animation_by_name(&self, name: &str) -> Option<AssetHandle<Animation>> {
        self.name_to_animation.get(name).copied()
    }

    pub fn is_mesh_loaded(&self, handle: AssetHandle<StaticMesh>) -> bool {
        self.meshes.contains_key(&handle.id())
    }

    pub fn is_texture_loaded(&self, handle: AssetHandle<TextureEntry>) -> bool {
        self.textures
            .get(&handle.id())
            .is_some_and(|entry| entry.layer.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshpull_render::Mesh;

    #[test]
    fn test_names_deduplicate() {
        let mut registry = GeometryRegistry::new();
        let a = registry.add_mesh(StaticMesh::from_mesh("plane", Mesh::plane(1.0, 1))).unwrap();
        let b = registry.add_mesh(StaticMesh::from_mesh("plane", Mesh::plane(5.0, 2))).unwrap();
        assert_eq!(a, b);
        assert_eq!(registry.get_mesh(a).unwrap().vertices.len(), 4);
    }

    #[test]
    fn test_reserved_mesh_is_pending_until_added() {
        let mut registry = GeometryRegistry::new();
        let handle = registry.reserve_mesh("sphere");
        assert!(!registry.is_mesh_loaded(handle));

        let added = registry.add_mesh(StaticMesh::from_mesh("sphere", Mesh::sphere(1.0, 4, 4))).unwrap();
        assert_eq!(handle, added);
        assert!(registry.is_mesh_loaded(handle));

        assert!(registry.unload_mesh(handle).is_some());
        assert!(!registry.is_mesh_loaded(handle));
        assert_eq!(registry.reserve_mesh("sphere"), handle);
    }

    #[test]
    fn test_texture_ids_fall_back_to_sentinel() {
        let mut registry = GeometryRegistry::new();
        let bricks = registry.add_texture("bricks");
        assert_eq!(registry.texture_id(Some(bricks)), TEXTURE_NOT_LOADED);
        assert_eq!(registry.texture_id(None), TEXTURE_NOT_LOADED);
        assert_eq!(registry.texture_id_by_name("missing"), TEXTURE_NOT_LOADED);

        registry.set_texture_layer(bricks, 3).unwrap();
        assert!(registry.is_texture_loaded(bricks));
        assert_eq!(registry.texture_id_by_name("bricks"), 3);
    }

    #[test]
    fn test_animations_are_found_by_name() {
        let mut registry = GeometryRegistry::new();
        let walk = registry.add_animation(Animation {
            name: "walk".into(),
            duration_in_ticks: 10.0,
            ticks_per_second: 25.0,
            channels: Vec::new(),
        });
        assert_eq!(registry.animation_by_name("walk"), Some(walk));
        assert_eq!(registry.animation_by_name("run"), None);
        assert_eq!(registry.get_animation(walk).map(|a| a.duration_in_ticks), Some(10.0));
    }

    #[test]
    fn test_invalid_mesh_is_rejected() {
        let mut registry = GeometryRegistry::new();
        let broken = StaticMesh::new("broken", Mesh::plane(1.0, 1).vertices, vec![0, 1, 7]);
        assert!(matches!(
            registry.add_mesh(broken),
            Err(AssetError::IndexOutOfRange { index: 7, .. })
        ));
    }
}

//! Binding layout shared by every meshlet dispatch.
//!
//! Backends that mirror these passes on a real GPU bind their buffers at the
//! same group/binding pairs; the CPU passes take the same resources as
//! borrowed slices grouped the same way.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    UniformBuffer,
    StorageBuffer,
    SampledTextureArray,
    Sampler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingSlot {
    pub group: u32,
    pub binding: u32,
    pub kind: ResourceKind,
    pub label: &'static str,
}

impl BindingSlot {
    const fn new(group: u32, binding: u32, kind: ResourceKind, label: &'static str) -> Self {
        Self {
            group,
            binding,
            kind,
            label,
        }
    }
}

pub const CAMERA: BindingSlot = BindingSlot::new(0, 0, ResourceKind::UniformBuffer, "camera");
/// Only bound by animated passes
pub const BONES: BindingSlot = BindingSlot::new(0, 1, ResourceKind::StorageBuffer, "bone_matrices");
pub const VERTICES: BindingSlot = BindingSlot::new(1, 0, ResourceKind::StorageBuffer, "vertices");
pub const MESHLET_VERTEX_INDICES: BindingSlot =
    BindingSlot::new(1, 1, ResourceKind::StorageBuffer, "meshlet_vertex_indices");
pub const MESHLET_TRIANGLE_INDICES: BindingSlot =
    BindingSlot::new(1, 2, ResourceKind::StorageBuffer, "meshlet_triangle_indices");
pub const MESHLET_DESCRIPTIONS: BindingSlot =
    BindingSlot::new(1, 3, ResourceKind::StorageBuffer, "meshlet_descriptions");
pub const DRAW_COMMANDS: BindingSlot =
    BindingSlot::new(2, 0, ResourceKind::StorageBuffer, "draw_commands");
pub const TRANSFORMS: BindingSlot = BindingSlot::new(2, 1, ResourceKind::StorageBuffer, "transforms");
pub const TEXTURES: BindingSlot =
    BindingSlot::new(3, 0, ResourceKind::SampledTextureArray, "texture_array");
pub const SAMPLER: BindingSlot = BindingSlot::new(3, 1, ResourceKind::Sampler, "texture_sampler");

/// Every slot, ordered by group then binding
pub static ALL: [BindingSlot; 10] = [
    CAMERA,
    BONES,
    VERTICES,
    MESHLET_VERTEX_INDICES,
    MESHLET_TRIANGLE_INDICES,
    MESHLET_DESCRIPTIONS,
    DRAW_COMMANDS,
    TRANSFORMS,
    TEXTURES,
    SAMPLER,
];

/// Slots used by one group
pub fn group(group: u32) -> impl Iterator<Item = &'static BindingSlot> {
    ALL.iter().filter(move |slot| slot.group == group)
}

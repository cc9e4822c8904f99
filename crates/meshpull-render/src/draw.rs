//! Draw indirection records (group 2, binding 0)
//!
//! One record per drawn meshlet instance. The instance index of an invocation
//! selects the record; the record redirects the invocation to its meshlet,
//! transform, texture and (animated) bone set. The host rebuilds these every
//! time the set of instances changes.

use bytemuck::{Pod, Zeroable};

/// Indirection record for static meshlets
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawCommand {
    pub meshlet_id: u32,
    pub transform_id: u32,
    pub texture_id: u32,
    pub _padding: u32,
}

impl DrawCommand {
    pub fn new(meshlet_id: u32, transform_id: u32, texture_id: u32) -> Self {
        Self {
            meshlet_id,
            transform_id,
            texture_id,
            _padding: 0,
        }
    }
}

/// Indirection record for skinned meshlets.
///
/// `bone_set_id` is the base offset of this instance's bones in the bone
/// buffer, not an index into a table of sets.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct AnimatedDrawCommand {
    pub meshlet_id: u32,
    pub bone_set_id: u32,
    pub transform_id: u32,
    pub texture_id: u32,
}

impl AnimatedDrawCommand {
    pub fn new(meshlet_id: u32, bone_set_id: u32, transform_id: u32, texture_id: u32) -> Self {
        Self {
            meshlet_id,
            bone_set_id,
            transform_id,
            texture_id,
        }
    }
}

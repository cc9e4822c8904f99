use glam::{Mat4, Vec3};
use meshpull_render::{RenderError, MAX_BONES_PER_SET};

use crate::error::AssetError;

#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    /// Always an earlier bone, so poses resolve in one forward pass
    pub parent: Option<usize>,
    /// Rest pose relative to the parent; used when no channel animates the bone
    pub local_bind: Mat4,
    /// Model space to bone space at bind time
    pub inverse_bind: Mat4,
}

impl Bone {
    /// Bone with its inverse bind left at identity. [`Skeleton::new`] fills
    /// it in from the rest pose.
    pub fn new(name: impl Into<String>, parent: Option<usize>, local_bind: Mat4) -> Self {
        Self {
            name: name.into(),
            parent,
            local_bind,
            inverse_bind: Mat4::IDENTITY,
        }
    }
}

/// Bone hierarchy of one skinned model, parents before children
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    bones: Vec<Bone>,
}

impl Skeleton {
    /// Validate ordering and size, then derive every inverse bind matrix from
    /// the rest pose.
    pub fn new(bones: Vec<Bone>) -> Result<Self, AssetError> {
        if bones.len() > MAX_BONES_PER_SET {
            return Err(RenderError::BoneSetTooLarge {
                count: bones.len(),
                max: MAX_BONES_PER_SET,
            }
            .into());
        }
        for (bone, b) in bones.iter().enumerate() {
            if let Some(parent) = b.parent {
                if parent >= bone {
                    return Err(AssetError::InvalidBoneParent { bone, parent });
                }
            }
        }

        let mut skeleton = Self { bones };
        let rest = skeleton.rest_globals();
        for (bone, global) in skeleton.bones.iter_mut().zip(rest) {
            bone.inverse_bind = global.inverse();
        }
        Ok(skeleton)
    }

    /// A straight chain of `count` bones stacked along +Y.
    pub fn chain(prefix: &str, count: usize, segment_length: f32) -> Result<Self, AssetError> {
        let bones = (0..count)
            .map(|i| {
                let (parent, offset) = if i == 0 {
                    (None, Vec3::ZERO)
                } else {
                    (Some(i - 1), Vec3::Y * segment_length)
                };
                Bone::new(format!("{prefix}{i}"), parent, Mat4::from_translation(offset))
            })
            .collect();
        Self::new(bones)
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// Concatenate local poses down the hierarchy.
    pub fn global_poses(&self, local_poses: &[Mat4]) -> Vec<Mat4> {
        let mut globals: Vec<Mat4> = Vec::with_capacity(self.bones.len());
        for (bone, local) in self.bones.iter().zip(local_poses) {
            let parent = bone.parent.map(|p| globals[p]).unwrap_or(Mat4::IDENTITY);
            globals.push(parent * *local);
        }
        globals
    }

    fn rest_globals(&self) -> Vec<Mat4> {
        let locals: Vec<Mat4> = self.bones.iter().map(|b| b.local_bind).collect();
        self.global_poses(&locals)
    }
}

//! Bone matrix buffer (group 0, binding 1)

use glam::Mat4;

use crate::error::RenderError;

/// Local bone indices are stored in a byte, so a set holds at most 256 bones.
pub const MAX_BONES_PER_SET: usize = 256;

/// Flat array of skinning matrices shared by every animated draw.
///
/// Each skinned instance owns a contiguous bone set; the base offset of that
/// set is the `bone_set_id` written into its draw commands. Matrices are
/// expected to be pre-multiplied by the instance's world transform.
#[derive(Debug, Clone, Default)]
pub struct BoneBuffer {
    matrices: Vec<Mat4>,
}

impl BoneBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bone set and return its base offset.
    pub fn push_set(&mut self, bones: &[Mat4]) -> Result<u32, RenderError> {
        if bones.len() > MAX_BONES_PER_SET {
            return Err(RenderError::BoneSetTooLarge {
                count: bones.len(),
                max: MAX_BONES_PER_SET,
            });
        }
        let base = self.matrices.len() as u32;
        self.matrices.extend_from_slice(bones);
        Ok(base)
    }

    /// Overwrite an existing set in place, e.g. after the next animation step.
    ///
    /// Sets never move, so the draw commands referencing them stay valid.
    pub fn write_set(&mut self, bone_set_id: u32, bones: &[Mat4]) -> Result<(), RenderError> {
        if bones.len() > MAX_BONES_PER_SET {
            return Err(RenderError::BoneSetTooLarge {
                count: bones.len(),
                max: MAX_BONES_PER_SET,
            });
        }
        let start = bone_set_id as usize;
        let end = start + bones.len();
        if end > self.matrices.len() {
            self.matrices.resize(end, Mat4::IDENTITY);
        }
        self.matrices[start..end].copy_from_slice(bones);
        Ok(())
    }

    /// Bone `local_bone` of the set starting at `bone_set_id`
    #[inline]
    pub fn get(&self, bone_set_id: u32, local_bone: u32) -> Mat4 {
        self.matrices[(bone_set_id + local_bone) as usize]
    }

    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    /// Drop every set; the host does this before rebuilding all instances.
    pub fn clear(&mut self) {
        self.matrices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_sets_are_addressed_by_base_offset() {
        let mut buffer = BoneBuffer::new();
        let a = buffer.push_set(&[Mat4::IDENTITY; 3]).unwrap();
        let b = buffer
            .push_set(&[
                Mat4::from_translation(Vec3::X),
                Mat4::from_translation(Vec3::Y),
            ])
            .unwrap();
        assert_eq!(a, 0);
        assert_eq!(b, 3);
        assert_eq!(buffer.get(b, 1), Mat4::from_translation(Vec3::Y));

        buffer.write_set(b, &[Mat4::from_translation(Vec3::Z)]).unwrap();
        assert_eq!(buffer.get(b, 0), Mat4::from_translation(Vec3::Z));
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn test_oversized_set_is_rejected() {
        let mut buffer = BoneBuffer::new();
        let result = buffer.push_set(&vec![Mat4::IDENTITY; MAX_BONES_PER_SET + 1]);
        assert_eq!(
            result,
            Err(RenderError::BoneSetTooLarge {
                count: 257,
                max: 256
            })
        );
        assert!(buffer.is_empty());
    }
}

//! Linear blend skinning with weight normalisation

use glam::{Mat4, Vec3, Vec4};

use crate::bones::{BoneBuffer, MAX_BONES_PER_SET};

/// Normals shorter than this after skinning are replaced by [`DEFAULT_NORMAL`].
pub const NORMAL_EPSILON: f32 = 1e-4;

/// Fallback for degenerate skinned normals
pub const DEFAULT_NORMAL: Vec3 = Vec3::Y;

/// Blend up to four bones of the set at `bone_set_id`.
///
/// A total weight of zero (or below) means no bone influence and yields the
/// identity. Otherwise each weight is divided by the total before it is
/// accumulated, so the applied weights always sum to one. Influences with a
/// non-positive weight or a joint index outside the 256-bone set are skipped.
pub fn skin_matrix(joints: [u32; 4], weights: [f32; 4], bone_set_id: u32, bones: &BoneBuffer) -> Mat4 {
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return Mat4::IDENTITY;
    }

    let mut skin = Mat4::ZERO;
    for (&joint, &weight) in joints.iter().zip(weights.iter()) {
        if weight <= 0.0 || joint as usize >= MAX_BONES_PER_SET {
            continue;
        }
        skin += bones.get(bone_set_id, joint) * (weight / total);
    }
    skin
}

/// Normalise `v`, falling back to [`DEFAULT_NORMAL`] for near-zero input.
#[inline]
pub fn safe_normalize(v: Vec3) -> Vec3 {
    let length = v.length();
    if length < NORMAL_EPSILON {
        DEFAULT_NORMAL
    } else {
        v / length
    }
}

/// Apply a skin matrix to an object-space position and normal.
///
/// The normal is transformed with w = 0, so translation does not affect it.
pub fn skin_vertex(skin: &Mat4, position: Vec4, normal: Vec3) -> (Vec4, Vec3) {
    let world_position = *skin * Vec4::new(position.x, position.y, position.z, 1.0);
    let world_normal = (*skin * normal.extend(0.0)).truncate();
    (world_position, safe_normalize(world_normal))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(bones: &[Mat4]) -> (BoneBuffer, u32) {
        let mut buffer = BoneBuffer::new();
        // Offset the set so the base offset actually matters.
        buffer.push_set(&[Mat4::from_scale(Vec3::splat(9.0)); 2]).unwrap();
        let base = buffer.push_set(bones).unwrap();
        (buffer, base)
    }

    #[test]
    fn test_zero_weights_give_exact_identity() {
        let (bones, base) = buffer_with(&[Mat4::from_translation(Vec3::X)]);
        let skin = skin_matrix([0, 0, 0, 0], [0.0; 4], base, &bones);
        assert_eq!(skin, Mat4::IDENTITY);

        let skin = skin_matrix([0, 0, 0, 0], [-1.0, 0.5, 0.0, 0.0], base, &bones);
        assert_eq!(skin, Mat4::IDENTITY);
    }

    #[test]
    fn test_weights_are_normalised() {
        let a = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0));
        let b = Mat4::from_translation(Vec3::new(0.0, 4.0, 0.0));
        let (bones, base) = buffer_with(&[a, b]);

        // Weights sum to 4; applied weights are 0.25 and 0.75.
        let skin = skin_matrix([0, 1, 0, 0], [1.0, 3.0, 0.0, 0.0], base, &bones);
        let expected = a * 0.25 + b * 0.75;
        assert!(skin.abs_diff_eq(expected, 1e-6));

        // Blending pure translations keeps the w row intact: applied weights sum to 1.
        assert!((skin.w_axis.w - 1.0).abs() < 1e-6);
        let p = skin.transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(0.5, 3.0, 0.0), 1e-6));
    }

    #[test]
    fn test_out_of_range_joint_is_ignored() {
        let a = Mat4::from_translation(Vec3::Z);
        let (bones, base) = buffer_with(&[a]);
        let skin = skin_matrix([0, 300, 0, 0], [0.5, 0.5, 0.0, 0.0], base, &bones);
        // Only half of the normalised weight is applied.
        assert!(skin.abs_diff_eq(a * 0.5, 1e-6));
    }

    #[test]
    fn test_degenerate_normal_falls_back() {
        let skin = Mat4::from_scale(Vec3::ZERO);
        let (_, normal) = skin_vertex(&skin, Vec4::new(1.0, 1.0, 1.0, 1.0), Vec3::X);
        assert_eq!(normal, DEFAULT_NORMAL);

        let (position, normal) = skin_vertex(
            &Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)),
            Vec4::new(1.0, 0.0, 0.0, 1.0),
            Vec3::new(2.0, 0.0, 0.0),
        );
        assert_eq!(position, Vec4::new(1.0, 0.0, 5.0, 1.0));
        assert_eq!(normal, Vec3::X);
    }
}

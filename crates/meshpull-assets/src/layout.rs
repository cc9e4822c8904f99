use glam::{Mat4, Vec3};
use meshpull_core::Aabb;

/// Gap left between neighbouring models, in world units
pub const MODEL_SPACING: f32 = 1.0;

/// Translations placing models side by side along +X.
///
/// The first model's min-x edge lands on the origin; each following model
/// starts [`MODEL_SPACING`] past the previous one's max-x edge. Y and Z are
/// left untouched.
pub fn layout_models_in_a_row(aabbs: &[Aabb]) -> Vec<Mat4> {
    let mut offset = 0.0;
    aabbs
        .iter()
        .map(|aabb| {
            let transform = Mat4::from_translation(Vec3::new(offset - aabb.min.x, 0.0, 0.0));
            offset += aabb.size().x + MODEL_SPACING;
            transform
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_models_do_not_overlap() {
        let aabbs = [
            Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0)),
            Aabb::new(Vec3::new(0.5, -1.0, 0.0), Vec3::new(1.5, 1.0, 1.0)),
            Aabb::new(Vec3::splat(-3.0), Vec3::splat(3.0)),
        ];
        let transforms = layout_models_in_a_row(&aabbs);
        let xs: Vec<f32> = transforms.iter().map(|t| t.w_axis.x).collect();
        assert_eq!(xs, vec![1.0, 2.5, 8.0]);

        let left_edges: Vec<f32> = aabbs.iter().zip(&xs).map(|(a, x)| a.min.x + x).collect();
        assert_eq!(left_edges, vec![0.0, 3.0, 5.0]);
        assert!(layout_models_in_a_row(&[]).is_empty());
    }
}

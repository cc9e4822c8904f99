//! Camera uniforms (group 0, binding 0) and viewport mapping

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

/// Camera description owned by the host
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    /// View matrix (world -> camera)
    pub view: Mat4,
    /// Projection matrix (camera -> clip)
    pub projection: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }
}

impl Camera {
    /// Right-handed perspective camera looking from `eye` at `target`
    pub fn look_at(eye: Vec3, target: Vec3, fov_y_degrees: f32, aspect: f32) -> Self {
        Self {
            view: Mat4::look_at_rh(eye, target, Vec3::Y),
            projection: Mat4::perspective_rh(fov_y_degrees.to_radians(), aspect, 0.1, 1000.0),
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform::new(self.view_projection())
    }
}

/// The camera as the vertex stage sees it
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new(view_proj: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
        }
    }

    #[inline]
    pub fn view_proj(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view_proj)
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

/// Render target size used to map clip space to pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Pixel covering a clip-space position, or `None` if it falls outside
    /// the canonical view volume (which includes the culled sentinel).
    pub fn clip_to_pixel(&self, clip: Vec4) -> Option<[u32; 2]> {
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || !(0.0..=1.0).contains(&ndc.z) {
            return None;
        }
        let x = ((ndc.x * 0.5 + 0.5) * self.width as f32) as u32;
        // Clip-space y points up, pixel rows go down.
        let y = ((0.5 - ndc.y * 0.5) * self.height as f32) as u32;
        Some([x.min(self.width - 1), y.min(self.height - 1)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_round_trips_matrix() {
        let camera = Camera::look_at(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO, 60.0, 16.0 / 9.0);
        let uniform = camera.uniform();
        assert!(uniform.view_proj().abs_diff_eq(camera.view_projection(), 1e-6));
    }

    #[test]
    fn test_clip_to_pixel() {
        let viewport = Viewport::new(100, 50);
        assert_eq!(viewport.clip_to_pixel(Vec4::new(0.0, 0.0, 0.5, 1.0)), Some([50, 25]));
        assert_eq!(viewport.clip_to_pixel(Vec4::new(-1.0, 1.0, 0.0, 1.0)), Some([0, 0]));
        assert_eq!(viewport.clip_to_pixel(Vec4::new(1.0, -1.0, 1.0, 1.0)), Some([99, 49]));
        assert_eq!(viewport.clip_to_pixel(Vec4::new(2.0, 2.0, 2.0, 1.0)), None);
    }
}

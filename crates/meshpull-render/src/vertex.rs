//! Vertex types stored in the geometry store
//!
//! Both layouts are `#[repr(C)]` and padded to 16-byte rows so they can be
//! uploaded verbatim into a storage buffer read as `array<Vertex>`.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

/// Static mesh vertex with position, normal and texture coordinates
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position, w = 1
    pub position: [f32; 4],
    pub normal: [f32; 3],
    pub _padding1: u32,
    pub tex_coords: [f32; 2],
    pub _padding2: [u32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position: [position[0], position[1], position[2], 1.0],
            normal,
            _padding1: 0,
            tex_coords,
            _padding2: [0; 2],
        }
    }

    /// Create a vertex with zeroed texture coordinates
    pub fn with_pos_normal(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self::new(position, normal, [0.0, 0.0])
    }

    pub fn position(&self) -> Vec4 {
        Vec4::from_array(self.position)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }

    pub fn uv(&self) -> Vec2 {
        Vec2::from_array(self.tex_coords)
    }
}

/// Skinned vertex: a static vertex plus up to four bone influences.
///
/// Joint indices are local to the bone set of the drawing instance and only
/// values below 256 take part in skinning.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SkinnedVertex {
    /// Object-space position, w = 1
    pub position: [f32; 4],
    /// Object-space normal, w = 0
    pub normal: [f32; 4],
    pub tex_coords: [f32; 2],
    pub _padding: [u32; 2],
    pub joints: [u32; 4],
    pub weights: [f32; 4],
}

impl SkinnedVertex {
    pub fn new(
        position: [f32; 3],
        normal: [f32; 3],
        tex_coords: [f32; 2],
        joints: [u32; 4],
        weights: [f32; 4],
    ) -> Self {
        Self {
            position: [position[0], position[1], position[2], 1.0],
            normal: [normal[0], normal[1], normal[2], 0.0],
            tex_coords,
            _padding: [0; 2],
            joints,
            weights,
        }
    }

    /// Skin a static vertex rigidly to a single bone
    pub fn rigid(vertex: &Vertex, joint: u32) -> Self {
        Self {
            position: vertex.position,
            normal: [vertex.normal[0], vertex.normal[1], vertex.normal[2], 0.0],
            tex_coords: vertex.tex_coords,
            _padding: [0; 2],
            joints: [joint, 0, 0, 0],
            weights: [1.0, 0.0, 0.0, 0.0],
        }
    }

    pub fn position(&self) -> Vec4 {
        Vec4::from_array(self.position)
    }

    pub fn normal(&self) -> Vec3 {
        Vec4::from_array(self.normal).truncate()
    }

    pub fn uv(&self) -> Vec2 {
        Vec2::from_array(self.tex_coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_sizes_are_row_aligned() {
        assert_eq!(std::mem::size_of::<Vertex>(), 48);
        assert_eq!(std::mem::size_of::<SkinnedVertex>(), 80);
    }

    #[test]
    fn test_vertex_position_has_unit_w() {
        let v = Vertex::new([1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [0.5, 0.25]);
        assert_eq!(v.position(), Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(v.uv(), Vec2::new(0.5, 0.25));

        let s = SkinnedVertex::rigid(&v, 7);
        assert_eq!(s.joints, [7, 0, 0, 0]);
        assert_eq!(s.normal[3], 0.0);
        assert_eq!(s.normal(), Vec3::Y);
    }
}

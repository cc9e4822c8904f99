//! Procedural mesh generation for demo scenes and tests

use crate::vertex::Vertex;
use glam::Vec3;
use meshpull_core::Aabb;
use std::f32::consts::PI;

/// Generated indexed triangle mesh
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create an empty mesh
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Model-space bounds, or `None` for an empty mesh
    pub fn aabb(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(|v| v.position().truncate()))
    }

    /// Generate a flat plane mesh in the XZ plane
    pub fn plane(size: f32, subdivisions: u32) -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        let half_size = size / 2.0;
        let step = size / subdivisions as f32;

        for z in 0..=subdivisions {
            for x in 0..=subdivisions {
                let px = -half_size + x as f32 * step;
                let pz = -half_size + z as f32 * step;
                let uv = [x as f32 / subdivisions as f32, z as f32 / subdivisions as f32];

                vertices.push(Vertex::new([px, 0.0, pz], [0.0, 1.0, 0.0], uv));
            }
        }

        grid_indices(subdivisions, subdivisions + 1, &mut indices);

        Self { vertices, indices }
    }

    /// Generate a UV sphere mesh
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            let y = radius * phi.cos();
            let ring_radius = radius * phi.sin();

            for seg in 0..=segments {
                let theta = 2.0 * PI * seg as f32 / segments as f32;
                let x = ring_radius * theta.cos();
                let z = ring_radius * theta.sin();

                let normal = Vec3::new(x, y, z).normalize_or(Vec3::Y);
                let uv = [seg as f32 / segments as f32, ring as f32 / rings as f32];

                vertices.push(Vertex::new([x, y, z], normal.to_array(), uv));
            }
        }

        ring_indices(rings, segments, &mut indices);

        Self { vertices, indices }
    }

    /// Generate a capsule mesh (cylindrical body with hemispherical caps)
    pub fn capsule(height: f32, radius: f32, segments: u32, rings: u32) -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        let half_height = (height - 2.0 * radius).max(0.0) / 2.0;
        let half_rings = (rings / 2).max(1);
        let total_height = 2.0 * half_height + 2.0 * radius;

        let mut push_ring = |y: f32, ring_radius: f32, normal_y: f32| {
            for seg in 0..=segments {
                let theta = 2.0 * PI * seg as f32 / segments as f32;
                let x = ring_radius * theta.cos();
                let z = ring_radius * theta.sin();
                let normal = Vec3::new(x, normal_y, z).normalize_or(Vec3::Y);
                let uv = [
                    seg as f32 / segments as f32,
                    1.0 - (y + half_height + radius) / total_height,
                ];
                vertices.push(Vertex::new([x, y, z], normal.to_array(), uv));
            }
        };

        // Top hemisphere
        for ring in 0..=half_rings {
            let phi = PI * 0.5 * (1.0 - ring as f32 / half_rings as f32);
            push_ring(phi.sin() * radius + half_height, phi.cos() * radius, phi.sin() * radius);
        }

        // Cylinder body
        for ring in 0..=1 {
            push_ring(half_height - ring as f32 * 2.0 * half_height, radius, 0.0);
        }

        // Bottom hemisphere
        for ring in 0..=half_rings {
            let phi = -PI * 0.5 * ring as f32 / half_rings as f32;
            push_ring(phi.sin() * radius - half_height, phi.cos() * radius, phi.sin() * radius);
        }

        let total_rings = half_rings + 2 + half_rings;
        ring_indices(total_rings, segments, &mut indices);

        Self { vertices, indices }
    }
}

/// Two triangles per cell of a `cells x cells` grid with `row` vertices per row
fn grid_indices(cells: u32, row: u32, indices: &mut Vec<u32>) {
    for z in 0..cells {
        for x in 0..cells {
            let current = z * row + x;
            let next = current + row;

            indices.push(current);
            indices.push(next);
            indices.push(current + 1);

            indices.push(current + 1);
            indices.push(next);
            indices.push(next + 1);
        }
    }
}

/// Quads between consecutive rings of `segments + 1` vertices
fn ring_indices(rings: u32, segments: u32, indices: &mut Vec<u32>) {
    for ring in 0..rings {
        for seg in 0..segments {
            let current = ring * (segments + 1) + seg;
            let next = current + segments + 1;

            indices.push(current);
            indices.push(next);
            indices.push(current + 1);

            indices.push(current + 1);
            indices.push(next);
            indices.push(next + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices_in_range(mesh: &Mesh) -> bool {
        mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len())
    }

    #[test]
    fn test_plane_counts() {
        let mesh = Mesh::plane(2.0, 4);
        assert_eq!(mesh.vertices.len(), 25);
        assert_eq!(mesh.triangle_count(), 32);
        assert!(indices_in_range(&mesh));
        let aabb = mesh.aabb().unwrap();
        assert_eq!(aabb.min, Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_sphere_and_capsule_indices_valid() {
        let sphere = Mesh::sphere(1.0, 8, 6);
        assert_eq!(sphere.vertices.len(), 9 * 7);
        assert!(indices_in_range(&sphere));

        let capsule = Mesh::capsule(2.0, 0.5, 8, 8);
        assert!(indices_in_range(&capsule));
        let aabb = capsule.aabb().unwrap();
        assert!((aabb.max.y - 1.0).abs() < 1e-5);
        assert!((aabb.min.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_mesh_has_no_bounds() {
        assert!(Mesh::empty().aabb().is_none());
    }
}

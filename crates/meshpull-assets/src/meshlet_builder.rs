//! Meshlet clustering on top of meshoptimizer.
//!
//! Output follows the meshopt layout: one shared vertex list, one shared byte
//! list of local triangle corners, and per-meshlet offsets into both. The
//! triangle offset of each meshlet is a byte offset, which is exactly how the
//! resolution pass addresses the packed triangle array.

use bytemuck::Pod;
use meshopt::VertexDataAdapter;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AssetError;

/// Upper bounds for one meshlet.
///
/// `max_vertices` can not exceed 256 because local corners are stored as
/// bytes. meshoptimizer wants `max_triangles` to be a multiple of 4 and at
/// most 512.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshletLimits {
    pub max_vertices: u32,
    pub max_triangles: u32,
}

impl Default for MeshletLimits {
    fn default() -> Self {
        Self {
            max_vertices: 64,
            max_triangles: 124,
        }
    }
}

impl MeshletLimits {
    pub fn validate(&self) -> Result<(), AssetError> {
        let vertices_ok = (3..=256).contains(&self.max_vertices);
        let triangles_ok = (4..=512).contains(&self.max_triangles) && self.max_triangles % 4 == 0;
        if !vertices_ok || !triangles_ok {
            return Err(AssetError::InvalidMeshletLimits {
                max_vertices: self.max_vertices,
                max_triangles: self.max_triangles,
            });
        }
        Ok(())
    }
}

/// Offsets of one meshlet inside a [`MeshletData`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalMeshlet {
    /// Index of the first entry in `MeshletData::vertices`
    pub vertex_offset: u32,
    /// Byte offset of the first corner in `MeshletData::triangles`
    pub triangle_offset: u32,
    pub triangle_count: u32,
    pub vertex_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct MeshletData {
    /// Mesh-local vertex ids, meshlet after meshlet
    pub vertices: Vec<u32>,
    /// Three corner bytes per triangle, each an index into the meshlet's
    /// slice of `vertices`. Meshlets start on 4-byte boundaries, so there
    /// may be unused bytes between them.
    pub triangles: Vec<u8>,
    pub meshlets: Vec<LocalMeshlet>,
}

/// Cluster an indexed triangle list into meshlets.
///
/// `V` must start with its model-space position as three `f32`s, which
/// holds for both vertex layouts of the render crate. Indices are checked
/// here because meshoptimizer trusts them.
pub fn build_meshlets<V: Pod>(
    name: &str,
    indices: &[u32],
    vertices: &[V],
    limits: MeshletLimits,
) -> Result<MeshletData, AssetError> {
    limits.validate()?;
    if indices.len() % 3 != 0 {
        return Err(AssetError::InvalidIndexCount {
            name: name.to_string(),
            count: indices.len(),
        });
    }
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
        return Err(AssetError::IndexOutOfRange {
            name: name.to_string(),
            index,
            vertex_count: vertices.len(),
        });
    }
    if indices.is_empty() {
        return Ok(MeshletData::default());
    }

    let adapter = VertexDataAdapter::new(bytemuck::cast_slice(vertices), std::mem::size_of::<V>(), 0)
        .map_err(|e| AssetError::Clustering {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
    let built = meshopt::build_meshlets(
        indices,
        &adapter,
        limits.max_vertices as usize,
        limits.max_triangles as usize,
        0.0,
    );

    let meshlets: Vec<LocalMeshlet> = built
        .meshlets
        .iter()
        .map(|m| LocalMeshlet {
            vertex_offset: m.vertex_offset,
            triangle_offset: m.triangle_offset,
            triangle_count: m.triangle_count,
            vertex_count: m.vertex_count,
        })
        .collect();
    debug!(
        "Mesh '{}': {} triangles in {} meshlets",
        name,
        indices.len() / 3,
        meshlets.len()
    );

    Ok(MeshletData {
        vertices: built.vertices,
        triangles: built.triangles,
        meshlets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshpull_render::{Mesh, Vertex};

    /// Expand every meshlet back into mesh-local triangles.
    fn unpack(data: &MeshletData) -> Vec<[u32; 3]> {
        let mut triangles = Vec::new();
        for m in &data.meshlets {
            let corners = &data.triangles[m.triangle_offset as usize..][..(m.triangle_count * 3) as usize];
            for tri in corners.chunks_exact(3) {
                let mut resolved = [0; 3];
                for (out, &c) in resolved.iter_mut().zip(tri) {
                    assert!((c as u32) < m.vertex_count);
                    *out = data.vertices[(m.vertex_offset + c as u32) as usize];
                }
                triangles.push(resolved);
            }
        }
        triangles
    }

    /// Rotate so the smallest index leads, keeping the winding.
    fn canonical(tri: [u32; 3]) -> [u32; 3] {
        let lead = (0..3).min_by_key(|&i| tri[i]).unwrap_or(0);
        [tri[lead], tri[(lead + 1) % 3], tri[(lead + 2) % 3]]
    }

    fn sorted_triangles(triangles: impl IntoIterator<Item = [u32; 3]>) -> Vec<[u32; 3]> {
        let mut triangles: Vec<_> = triangles.into_iter().map(canonical).collect();
        triangles.sort_unstable();
        triangles
    }

    #[test]
    fn test_limits_are_respected_and_every_triangle_kept() {
        let mesh = Mesh::sphere(1.0, 16, 12);
        let limits = MeshletLimits {
            max_vertices: 32,
            max_triangles: 20,
        };
        let data = build_meshlets("sphere", &mesh.indices, &mesh.vertices, limits).unwrap();

        assert!(data.meshlets.len() > 1);
        for m in &data.meshlets {
            assert!(m.vertex_count <= 32);
            assert!(m.triangle_count <= 20 && m.triangle_count > 0);
            assert_eq!(m.triangle_offset % 4, 0);
        }
        let expected = sorted_triangles(mesh.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]));
        assert_eq!(sorted_triangles(unpack(&data)), expected);
    }

    #[test]
    fn test_single_quad_is_one_meshlet() {
        let vertices = vec![
            Vertex::with_pos_normal([0.5, 0.5, 0.0], [0.0, 0.0, 1.0]),
            Vertex::with_pos_normal([0.5, -0.5, 0.0], [0.0, 0.0, 1.0]),
            Vertex::with_pos_normal([-0.5, -0.5, 0.0], [0.0, 0.0, 1.0]),
            Vertex::with_pos_normal([-0.5, 0.5, 0.0], [0.0, 0.0, 1.0]),
        ];
        let indices = [0, 1, 3, 1, 2, 3];
        let data = build_meshlets("quad", &indices, &vertices, MeshletLimits::default()).unwrap();

        assert_eq!(data.meshlets.len(), 1);
        let meshlet = data.meshlets[0];
        assert_eq!((meshlet.vertex_count, meshlet.triangle_count), (4, 2));
        assert_eq!(
            sorted_triangles(unpack(&data)),
            sorted_triangles([[0, 1, 3], [1, 2, 3]])
        );
    }

    #[test]
    fn test_empty_mesh_has_no_meshlets() {
        let data = build_meshlets::<Vertex>("empty", &[], &[], MeshletLimits::default()).unwrap();
        assert!(data.meshlets.is_empty());
        assert!(data.triangles.is_empty());
    }

    #[test]
    fn test_invalid_input() {
        let vertices = Mesh::plane(1.0, 1).vertices;
        assert!(matches!(
            build_meshlets("bad", &[0, 1, 5], &vertices, MeshletLimits::default()),
            Err(AssetError::IndexOutOfRange { index: 5, .. })
        ));
        assert!(matches!(
            build_meshlets("ragged", &[0, 1], &vertices, MeshletLimits::default()),
            Err(AssetError::InvalidIndexCount { count: 2, .. })
        ));

        for (max_vertices, max_triangles) in [(300, 64), (64, 0), (64, 30), (64, 516)] {
            let limits = MeshletLimits {
                max_vertices,
                max_triangles,
            };
            assert!(build_meshlets("limits", &[0, 1, 2], &vertices, limits).is_err());
        }
    }
}

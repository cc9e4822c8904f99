use glam::Vec3;
use meshpull_core::Aabb;
use meshpull_render::{Mesh, SkinnedVertex, Vertex};

use crate::error::AssetError;
use crate::skeleton::Skeleton;

/// Model-space position of a vertex, whatever else it carries
pub trait VertexPosition {
    fn model_position(&self) -> Vec3;
}

impl VertexPosition for Vertex {
    fn model_position(&self) -> Vec3 {
        self.position().truncate()
    }
}

impl VertexPosition for SkinnedVertex {
    fn model_position(&self) -> Vec3 {
        self.position().truncate()
    }
}

/// Indexed triangle list ready for meshlet building
#[derive(Debug, Clone)]
pub struct MeshAsset<V> {
    pub name: String,
    pub vertices: Vec<V>,
    pub indices: Vec<u32>,
}

pub type StaticMesh = MeshAsset<Vertex>;
pub type SkinnedMesh = MeshAsset<SkinnedVertex>;

impl<V> MeshAsset<V> {
    pub fn new(name: impl Into<String>, vertices: Vec<V>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            vertices,
            indices,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check the index list forms whole triangles over existing vertices.
    pub fn validate(&self) -> Result<(), AssetError> {
        if self.indices.len() % 3 != 0 {
            return Err(AssetError::InvalidIndexCount {
                name: self.name.clone(),
                count: self.indices.len(),
            });
        }
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.vertices.len())
        {
            return Err(AssetError::IndexOutOfRange {
                name: self.name.clone(),
                index,
                vertex_count: self.vertices.len(),
            });
        }
        Ok(())
    }
}

impl<V: VertexPosition> MeshAsset<V> {
    pub fn aabb(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(VertexPosition::model_position))
    }
}

impl StaticMesh {
    pub fn from_mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self::new(name, mesh.vertices, mesh.indices)
    }
}

impl SkinnedMesh {
    /// Skin every vertex to the joint chosen by `joint_for`, with full weight.
    pub fn rigid(name: impl Into<String>, mesh: &Mesh, joint_for: impl Fn(&Vertex) -> u32) -> Self {
        let vertices = mesh
            .vertices
            .iter()
            .map(|v| SkinnedVertex::rigid(v, joint_for(v)))
            .collect();
        Self::new(name, vertices, mesh.indices.clone())
    }
}

/// Skinned mesh together with the skeleton its joints index into
#[derive(Debug, Clone)]
pub struct SkinnedModel {
    pub mesh: SkinnedMesh,
    pub skeleton: Skeleton,
}

impl SkinnedModel {
    /// Validates the mesh and that every weighted joint exists in the skeleton.
    pub fn new(mesh: SkinnedMesh, skeleton: Skeleton) -> Result<Self, AssetError> {
        mesh.validate()?;
        for vertex in &mesh.vertices {
            for (&joint, &weight) in vertex.joints.iter().zip(vertex.weights.iter()) {
                if weight > 0.0 && joint as usize >= skeleton.len() {
                    return Err(AssetError::JointOutOfRange {
                        name: mesh.name.clone(),
                        joint,
                        bone_count: skeleton.len(),
                    });
                }
            }
        }
        Ok(Self { mesh, skeleton })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::Bone;
    use glam::Mat4;

    #[test]
    fn test_validate_rejects_bad_indices() {
        let quad = Mesh::plane(1.0, 1);
        let mut mesh = StaticMesh::from_mesh("quad", quad);
        assert!(mesh.validate().is_ok());

        mesh.indices.push(0);
        assert!(matches!(mesh.validate(), Err(AssetError::InvalidIndexCount { count: 7, .. })));

        mesh.indices.extend([1, 9]);
        assert!(matches!(
            mesh.validate(),
            Err(AssetError::IndexOutOfRange { index: 9, vertex_count: 4, .. })
        ));
    }

    #[test]
    fn test_skinned_model_checks_joints() {
        let skeleton = Skeleton::new(vec![Bone::new("root", None, Mat4::IDENTITY)]).unwrap();
        let mesh = SkinnedMesh::rigid("blob", &Mesh::sphere(1.0, 4, 3), |v| {
            if v.position().y > 0.5 {
                1
            } else {
                0
            }
        });
        assert!(matches!(
            SkinnedModel::new(mesh.clone(), skeleton.clone()),
            Err(AssetError::JointOutOfRange { joint: 1, bone_count: 1, .. })
        ));

        let rigid = SkinnedMesh::rigid("blob", &Mesh::sphere(1.0, 4, 3), |_| 0);
        let model = SkinnedModel::new(rigid, skeleton).unwrap();
        let aabb = model.mesh.aabb().unwrap();
        assert!((aabb.max.y - 1.0).abs() < 1e-5);
    }
}

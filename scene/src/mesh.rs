use std::io::BufReader;
use std::path::Path;

use bvh::{Aabb, Bounds};
use glam::{vec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::Triangle;

/// A triangle soup, the only geometry the builders consume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle>) -> Mesh {
        Mesh { triangles }
    }

    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh, Box<dyn std::error::Error>> {
        let (models, _materials) = tobj::load_obj(
            path.as_ref(),
            &tobj::LoadOptions {
                triangulate: true,
                ..Default::default()
            },
        )?;
        Ok(Self::from_models(models))
    }

    pub fn from_obj_buf(source: &[u8]) -> Result<Mesh, Box<dyn std::error::Error>> {
        let mut reader = BufReader::new(source);
        let (models, _materials) = tobj::load_obj_buf(
            &mut reader,
            &tobj::LoadOptions {
                triangulate: true,
                ..Default::default()
            },
            |_matpath| Err(tobj::LoadError::GenericFailure),
        )?;
        Ok(Self::from_models(models))
    }

    fn from_models(models: Vec<tobj::Model>) -> Mesh {
        let mut triangles = Vec::new();
        for model in models {
            let mesh = model.mesh;
            let position = |index: u32| {
                let base = index as usize * 3;
                vec3(
                    mesh.positions[base],
                    mesh.positions[base + 1],
                    mesh.positions[base + 2],
                )
            };
            for face in mesh.indices.chunks_exact(3) {
                triangles.push(Triangle::new(
                    position(face[0]),
                    position(face[1]),
                    position(face[2]),
                ));
            }
        }
        Mesh::new(triangles)
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// The parallel per-triangle arrays the builders take as input.
    pub fn bounds_and_centers(&self) -> (Vec<Aabb>, Vec<Vec3>) {
        let bboxes = self.triangles.iter().map(|t| t.bounds()).collect();
        let centers = self.triangles.iter().map(|t| t.center()).collect();
        (bboxes, centers)
    }
}

impl Bounds for Mesh {
    fn bounds(&self) -> Aabb {
        let mut bounds = Aabb::empty();
        for triangle in &self.triangles {
            bounds.grow_bb(&triangle.bounds());
        }
        bounds
    }
}

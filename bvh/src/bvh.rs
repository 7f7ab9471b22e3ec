use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Aabb, Bounds, BvhNode, Ray};

/// Index of the primitive a traversal ended on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Hit {
    pub prim_index: u32,
}

/// The one capability traversal requires of a primitive type.
///
/// `intersect` returns `true` only when a hit exists with
/// `t` in `[ray.tmin, ray.tmax]`, and then sets `ray.tmax` to that `t`.
/// On a miss the ray must be left untouched, and any NaN arising in the
/// test must lead to a miss.
pub trait Primitive {
    fn intersect(&self, ray: &mut Ray) -> bool;
}

/// A binary bounding volume hierarchy over a fixed set of primitives.
///
/// `nodes[0]` is the root; `prim_indices` is a permutation of `[0, N)`
/// grouping primitives by leaf. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bvh {
    pub nodes: Vec<BvhNode>,
    pub prim_indices: Vec<u32>,
}

impl Bvh {
    pub fn empty() -> Bvh {
        Bvh {
            nodes: Vec::new(),
            prim_indices: Vec::new(),
        }
    }

    pub fn prim_count(&self) -> usize {
        self.prim_indices.len()
    }

    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            0
        } else {
            self.depth_from(0)
        }
    }

    fn depth_from(&self, node_index: usize) -> usize {
        let node = &self.nodes[node_index];
        if node.is_leaf() {
            1
        } else {
            let first = node.first_index as usize;
            1 + self.depth_from(first).max(self.depth_from(first + 1))
        }
    }

    /// Closest-hit traversal. Returns the primitive with the smallest `t`
    /// within the ray interval; `ray.tmax` ends up at that `t`, or stays
    /// unchanged when nothing is hit.
    pub fn traverse<P: Primitive>(&self, ray: &mut Ray, prims: &[P]) -> Option<Hit> {
        if self.nodes.is_empty() {
            return None;
        }

        let inv_dir = ray.inv_direction();
        let mut hit = None;
        let mut stack = Vec::with_capacity(64);
        stack.push(0u32);

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            if node.bounds.intersect(ray, inv_dir).is_none() {
                continue;
            }

            if node.is_leaf() {
                for i in 0..node.prim_count {
                    let prim_index = self.prim_indices[(node.first_index + i) as usize];
                    if prims[prim_index as usize].intersect(ray) {
                        hit = Some(Hit { prim_index });
                    }
                }
            } else {
                stack.push(node.first_index);
                stack.push(node.first_index + 1);
            }
        }

        hit
    }

    pub fn save<S: AsRef<Path>>(&self, path: S) -> Result<(), Box<dyn std::error::Error>> {
        use std::io::Write;
        let encoded: Vec<u8> = bincode::serialize(self)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(encoded.as_ref())?;
        Ok(())
    }

    pub fn load<S: AsRef<Path>>(path: S) -> Result<Bvh, Box<dyn std::error::Error>> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let bvh: Bvh = bincode::deserialize_from(reader)?;
        Ok(bvh)
    }
}

impl Bounds for Bvh {
    fn bounds(&self) -> Aabb {
        self.nodes.first().map_or_else(Aabb::empty, |node| node.bounds)
    }
}

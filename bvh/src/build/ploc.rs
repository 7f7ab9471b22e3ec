use glam::{vec3, Vec3};

use crate::build::morton;
use crate::{safe_inverse, Aabb, Builder, Bvh, BvhNode};

/// Bottom-up builder: primitives are ordered along a Morton curve, then
/// mutually-nearest neighbors within a fixed window merge round by round
/// until a single root remains. Merged pairs are written back-to-front into
/// the final node array, so children always end up adjacent.
#[derive(Debug, Copy, Clone)]
pub struct PlocBuilder {
    pub search_radius: usize,
}

impl Default for PlocBuilder {
    fn default() -> Self {
        PlocBuilder { search_radius: 14 }
    }
}

impl PlocBuilder {
    fn morton_codes(centers: &[Vec3]) -> Vec<u32> {
        let mut center_bounds = Aabb::empty();
        for &center in centers {
            center_bounds.grow(center);
        }

        // safe_inverse keeps zero-extent axes on grid coordinate 0.
        let d = center_bounds.diagonal();
        let scale =
            vec3(safe_inverse(d.x), safe_inverse(d.y), safe_inverse(d.z)) * morton::GRID_DIM as f32;

        centers
            .iter()
            .map(|&center| {
                let grid_pos = (center - center_bounds.min) * scale;
                let x = (grid_pos.x as u32).min(morton::GRID_DIM - 1);
                let y = (grid_pos.y as u32).min(morton::GRID_DIM - 1);
                let z = (grid_pos.z as u32).min(morton::GRID_DIM - 1);
                morton::encode(x, y, z)
            })
            .collect()
    }

    // Index of the node within the search window whose union with `index`
    // has the smallest half-area. Ties go to the lowest index.
    fn find_closest_node(&self, nodes: &[BvhNode], index: usize) -> usize {
        let begin = index.saturating_sub(self.search_radius);
        let end = (index + self.search_radius + 1).min(nodes.len());

        let mut best_index = 0;
        let mut best_distance = f32::MAX;
        for i in begin..end {
            if i == index {
                continue;
            }
            let distance = nodes[index].bounds.union(&nodes[i].bounds).half_area();
            if distance < best_distance {
                best_distance = distance;
                best_index = i;
            }
        }
        best_index
    }
}

impl Builder for PlocBuilder {
    fn build(&self, bboxes: &[Aabb], centers: &[Vec3]) -> Bvh {
        assert_eq!(bboxes.len(), centers.len());
        let prim_count = bboxes.len();
        if prim_count == 0 {
            return Bvh::empty();
        }

        let mortons = Self::morton_codes(centers);
        let mut prim_indices: Vec<u32> = (0..prim_count as u32).collect();
        prim_indices.sort_unstable_by_key(|&i| (mortons[i as usize], i));

        // One leaf per primitive, in curve order.
        let mut current: Vec<BvhNode> = (0..prim_count)
            .map(|i| BvhNode {
                bounds: bboxes[prim_indices[i] as usize],
                prim_count: 1,
                first_index: i as u32,
            })
            .collect();
        let mut next = Vec::with_capacity(prim_count);
        let mut merge_index = vec![0usize; prim_count];

        let mut nodes = vec![BvhNode::new(); 2 * prim_count - 1];
        let mut insertion_index = nodes.len();

        while current.len() > 1 {
            for i in 0..current.len() {
                merge_index[i] = self.find_closest_node(&current, i);
            }

            next.clear();
            for i in 0..current.len() {
                let j = merge_index[i];
                // Merge only pairs that picked each other.
                if merge_index[j] == i {
                    // The pair is handled once, from its lower index.
                    if i > j {
                        continue;
                    }

                    assert!(insertion_index >= 2);
                    insertion_index -= 2;
                    nodes[insertion_index] = current[i];
                    nodes[insertion_index + 1] = current[j];

                    next.push(BvhNode {
                        bounds: current[i].bounds.union(&current[j].bounds),
                        prim_count: 0,
                        first_index: insertion_index as u32,
                    });
                } else {
                    next.push(current[i]);
                }
            }
            std::mem::swap(&mut current, &mut next);
        }
        assert_eq!(insertion_index, 1);

        nodes[0] = current[0];
        Bvh { nodes, prim_indices }
    }
}

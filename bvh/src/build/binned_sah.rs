use glam::Vec3;
use std::cmp::Ordering;

use crate::{safe_inverse, Aabb, Builder, Bvh, BvhNode};

const BIN_COUNT: usize = 16;

/// Top-down builder binning primitive centers along each axis and splitting
/// at the cheapest surface-area-heuristic boundary. Nodes above `max_prims`
/// that the heuristic refuses to split fall back to a median split along the
/// largest axis.
#[derive(Debug, Copy, Clone)]
pub struct BinnedSahBuilder {
    pub min_prims: usize,
    pub max_prims: usize,
    pub traversal_cost: f32,
}

impl Default for BinnedSahBuilder {
    fn default() -> Self {
        BinnedSahBuilder {
            min_prims: 2,
            max_prims: 8,
            traversal_cost: 1.0,
        }
    }
}

#[derive(Debug, Copy, Clone)]
struct Bin {
    bounds: Aabb,
    prim_count: usize,
}

impl Default for Bin {
    fn default() -> Self {
        Bin {
            bounds: Aabb::empty(),
            prim_count: 0,
        }
    }
}

impl Bin {
    fn extend(&mut self, other: &Bin) {
        self.bounds.grow_bb(&other.bounds);
        self.prim_count += other.prim_count;
    }

    // NaN for an empty bin; cost comparisons reject it.
    fn cost(&self) -> f32 {
        self.bounds.half_area() * self.prim_count as f32
    }
}

#[derive(Debug, Copy, Clone)]
struct Split {
    axis: usize,
    cost: f32,
    right_bin: usize,
}

fn bin_index(axis: usize, bounds: &Aabb, center: Vec3) -> usize {
    let scale = BIN_COUNT as f32 * safe_inverse(bounds.max[axis] - bounds.min[axis]);
    let index = ((center[axis] - bounds.min[axis]) * scale) as isize;
    index.clamp(0, BIN_COUNT as isize - 1) as usize
}

fn find_best_split(
    axis: usize,
    node: &BvhNode,
    prim_indices: &[u32],
    bboxes: &[Aabb],
    centers: &[Vec3],
) -> Option<Split> {
    let first_index = node.first_index as usize;

    let mut bins = [Bin::default(); BIN_COUNT];
    for i in 0..node.prim_count as usize {
        let prim_index = prim_indices[first_index + i] as usize;
        let bin = &mut bins[bin_index(axis, &node.bounds, centers[prim_index])];
        bin.bounds.grow_bb(&bboxes[prim_index]);
        bin.prim_count += 1;
    }

    let mut right_cost = [f32::MAX; BIN_COUNT];
    let mut right_accum = Bin::default();
    for i in (1..BIN_COUNT).rev() {
        right_accum.extend(&bins[i]);
        right_cost[i] = right_accum.cost();
    }

    let mut left_accum = Bin::default();
    let mut best_cost = f32::MAX;
    let mut split = None;
    for i in 0..BIN_COUNT - 1 {
        left_accum.extend(&bins[i]);
        let cost = left_accum.cost() + right_cost[i + 1];
        if cost < best_cost {
            best_cost = cost;
            split = Some(Split {
                axis,
                cost,
                right_bin: i + 1,
            });
        }
    }
    split
}

impl BinnedSahBuilder {
    fn subdivide(
        &self,
        node_index: usize,
        nodes: &mut [BvhNode],
        prim_indices: &mut [u32],
        node_count: &mut usize,
        bboxes: &[Aabb],
        centers: &[Vec3],
    ) {
        let mut node = nodes[node_index];
        debug_assert!(node.is_leaf());

        let first_index = node.first_index as usize;
        let prim_count = node.prim_count as usize;

        node.bounds = Aabb::empty();
        for i in 0..prim_count {
            node.bounds
                .grow_bb(&bboxes[prim_indices[first_index + i] as usize]);
        }
        nodes[node_index] = node;

        if prim_count < self.min_prims {
            return;
        }

        let mut best_split: Option<Split> = None;
        for axis in 0..3 {
            if let Some(split) = find_best_split(axis, &node, prim_indices, bboxes, centers) {
                // Strict comparison: the earlier axis wins ties.
                if best_split.map_or(true, |best| split.cost < best.cost) {
                    best_split = Some(split);
                }
            }
        }

        let leaf_cost = node.bounds.half_area() * (prim_count as f32 - self.traversal_cost);
        let first_right = match best_split {
            Some(split) if split.cost <= leaf_cost => {
                let range = &mut prim_indices[first_index..first_index + prim_count];
                let mut mid = 0;
                for i in 0..range.len() {
                    if bin_index(split.axis, &node.bounds, centers[range[i] as usize])
                        < split.right_bin
                    {
                        range.swap(i, mid);
                        mid += 1;
                    }
                }
                assert!(
                    mid > 0 && mid < prim_count,
                    "partition left an empty side after a split was chosen"
                );
                first_index + mid
            }
            _ if prim_count > self.max_prims => {
                // The heuristic refused, but the leaf would be too large:
                // median split along the largest axis.
                let axis = node.bounds.largest_axis();
                let range = &mut prim_indices[first_index..first_index + prim_count];
                range.sort_unstable_by(|&a, &b| {
                    centers[a as usize][axis]
                        .partial_cmp(&centers[b as usize][axis])
                        .unwrap_or(Ordering::Equal)
                });
                first_index + prim_count / 2
            }
            _ => return,
        };

        let first_child = *node_count;
        *node_count += 2;

        nodes[first_child] = BvhNode {
            bounds: Aabb::empty(),
            prim_count: (first_right - first_index) as u32,
            first_index: first_index as u32,
        };
        nodes[first_child + 1] = BvhNode {
            bounds: Aabb::empty(),
            prim_count: (first_index + prim_count - first_right) as u32,
            first_index: first_right as u32,
        };

        nodes[node_index].first_index = first_child as u32;
        nodes[node_index].prim_count = 0;

        self.subdivide(first_child, nodes, prim_indices, node_count, bboxes, centers);
        self.subdivide(
            first_child + 1,
            nodes,
            prim_indices,
            node_count,
            bboxes,
            centers,
        );
    }
}

impl Builder for BinnedSahBuilder {
    fn build(&self, bboxes: &[Aabb], centers: &[Vec3]) -> Bvh {
        assert_eq!(bboxes.len(), centers.len());
        let prim_count = bboxes.len();
        if prim_count == 0 {
            return Bvh::empty();
        }

        let mut prim_indices: Vec<u32> = (0..prim_count as u32).collect();
        let mut nodes = vec![BvhNode::new(); 2 * prim_count - 1];
        nodes[0].prim_count = prim_count as u32;
        nodes[0].first_index = 0;

        let mut node_count = 1;
        self.subdivide(
            0,
            &mut nodes,
            &mut prim_indices,
            &mut node_count,
            bboxes,
            centers,
        );
        nodes.truncate(node_count);

        Bvh { nodes, prim_indices }
    }
}

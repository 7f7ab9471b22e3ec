pub mod binned_sah;
pub mod morton;
pub mod ploc;

pub use binned_sah::*;
pub use ploc::*;

use glam::Vec3;

use crate::{Aabb, Bvh};

/// Builds a `Bvh` from parallel per-primitive arrays: one bounding box and
/// one center point per primitive. Centers are normally the box centroids,
/// but no builder verifies that.
pub trait Builder {
    fn build(&self, bboxes: &[Aabb], centers: &[Vec3]) -> Bvh;
}

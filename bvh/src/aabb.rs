use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::Ray;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

pub trait Bounds {
    fn bounds(&self) -> Aabb;
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    /// An inverted box; growing it by any point or box yields that point or box.
    pub fn empty() -> Aabb {
        Aabb {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(-f32::MAX),
        }
    }

    pub fn from_point(point: Vec3) -> Aabb {
        Aabb {
            min: point,
            max: point,
        }
    }

    pub fn grow(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn grow_bb(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn diagonal(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half the surface area; enough for SAH cost comparisons.
    pub fn half_area(&self) -> f32 {
        let d = self.diagonal();
        (d.x + d.y) * d.z + d.x * d.y
    }

    pub fn largest_axis(&self) -> usize {
        let d = self.diagonal();
        let mut axis = 0;
        if d[axis] < d[1] {
            axis = 1;
        }
        if d[axis] < d[2] {
            axis = 2;
        }
        axis
    }

    /// Slab test. Returns the `[t_enter, t_exit]` interval clipped against
    /// `[ray.tmin, ray.tmax]`, or `None` when the interval is empty.
    /// `inv_dir` must come from `ray.inv_direction()` so that axis-aligned
    /// rays stay finite.
    pub fn intersect(&self, ray: &Ray, inv_dir: Vec3) -> Option<(f32, f32)> {
        let t0 = (self.min - ray.origin) * inv_dir;
        let t1 = (self.max - ray.origin) * inv_dir;

        let t_enter = robust_max(
            robust_min(t0.x, t1.x),
            robust_max(
                robust_min(t0.y, t1.y),
                robust_max(robust_min(t0.z, t1.z), ray.tmin),
            ),
        );
        let t_exit = robust_min(
            robust_max(t0.x, t1.x),
            robust_min(
                robust_max(t0.y, t1.y),
                robust_min(robust_max(t0.z, t1.z), ray.tmax),
            ),
        );

        if t_enter <= t_exit {
            Some((t_enter, t_exit))
        } else {
            None
        }
    }
}

// `a < b ? a : b` selection; a NaN operand falls through to `b`, so the slab
// test rejects instead of propagating.
#[inline(always)]
fn robust_min(a: f32, b: f32) -> f32 {
    if a < b {
        a
    } else {
        b
    }
}

#[inline(always)]
fn robust_max(a: f32, b: f32) -> f32 {
    if a > b {
        a
    } else {
        b
    }
}

use glam::{vec3, Vec3};

/// Computes `1 / x` without producing infinities for components close to
/// zero; the sign of `x` is preserved so slab tests stay well ordered for
/// axis-aligned rays.
#[inline(always)]
pub fn safe_inverse(x: f32) -> f32 {
    if x.abs() <= f32::EPSILON {
        x.signum() / f32::EPSILON
    } else {
        1.0 / x
    }
}

/// A ray with a live `[tmin, tmax]` interval. Intersection tests tighten
/// `tmax` to the nearest hit found so far.
#[derive(Debug, Copy, Clone)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub tmin: f32,
    pub tmax: f32,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Ray {
        Self::with_range(origin, direction, 0.0, f32::MAX)
    }

    pub fn with_range(origin: Vec3, direction: Vec3, tmin: f32, tmax: f32) -> Ray {
        Ray {
            origin,
            direction,
            tmin,
            tmax,
        }
    }

    pub fn inv_direction(&self) -> Vec3 {
        vec3(
            safe_inverse(self.direction.x),
            safe_inverse(self.direction.y),
            safe_inverse(self.direction.z),
        )
    }
}

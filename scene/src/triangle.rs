use bvh::{Aabb, Bounds, Primitive, Ray};
use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub p0: Vec3,
    pub p1: Vec3,
    pub p2: Vec3,
}

impl Triangle {
    pub fn new(p0: Vec3, p1: Vec3, p2: Vec3) -> Triangle {
        Triangle { p0, p1, p2 }
    }

    pub fn center(&self) -> Vec3 {
        (self.p0 + self.p1 + self.p2) * (1.0 / 3.0)
    }
}

impl Primitive for Triangle {
    fn intersect(&self, ray: &mut Ray) -> bool {
        let e1 = self.p0 - self.p1;
        let e2 = self.p2 - self.p0;
        let n = e1.cross(e2);

        let c = self.p0 - ray.origin;
        let r = ray.direction.cross(c);
        let inv_det = 1.0 / n.dot(ray.direction);

        let u = r.dot(e2) * inv_det;
        let v = r.dot(e1) * inv_det;
        let w = 1.0 - u - v;

        // These comparisons are false when u, v, or w is a NaN, so
        // degenerate triangles never report a hit.
        if u >= 0.0 && v >= 0.0 && w >= 0.0 {
            let t = n.dot(c) * inv_det;
            if t >= ray.tmin && t <= ray.tmax {
                ray.tmax = t;
                return true;
            }
        }

        false
    }
}

impl Bounds for Triangle {
    fn bounds(&self) -> Aabb {
        let mut bounds = Aabb::from_point(self.p0);
        bounds.grow(self.p1);
        bounds.grow(self.p2);
        bounds
    }
}

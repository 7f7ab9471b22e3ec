use bvh::Ray;
use glam::Vec3;

/// Pinhole camera. The basis is orthonormalized at construction; per-pixel
/// ray directions are left unnormalized, which closest-hit traversal does
/// not mind.
#[derive(Debug, Copy, Clone)]
pub struct Camera {
    pub eye: Vec3,
    dir: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Camera {
    pub fn new(eye: Vec3, dir: Vec3, up: Vec3) -> Camera {
        let dir = dir.normalize();
        let right = dir.cross(up).normalize();
        let up = right.cross(dir);
        Camera {
            eye,
            dir,
            right,
            up,
        }
    }

    /// Primary ray through normalized screen coordinates in `[-1, 1]`.
    pub fn ray(&self, u: f32, v: f32) -> Ray {
        Ray::new(self.eye, self.dir + u * self.right + v * self.up)
    }
}

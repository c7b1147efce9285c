use cgmath::InnerSpace;

use crate::geometry::bounds::Bounds3f;
use crate::interaction::ShapeHit;
use crate::sampling::uniform_sample_sphere;
use crate::shapes::{Shape, SurfacePoint};
use crate::{consts, Float, Point2f, Point3f, Ray, Vec3f};

#[derive(Clone, Debug)]
pub struct Sphere {
    center: Point3f,
    radius: Float,
    /// Normals point towards the center, for enclosures lit from the inside.
    reverse_orientation: bool,
}

impl Sphere {
    pub fn new(center: Point3f, radius: Float) -> Self {
        Self { center, radius, reverse_orientation: false }
    }

    pub fn inward_facing(center: Point3f, radius: Float) -> Self {
        Self { center, radius, reverse_orientation: true }
    }

    fn oriented(&self, outward: Vec3f) -> Vec3f {
        if self.reverse_orientation { -outward } else { outward }
    }
}

impl Shape for Sphere {
    fn world_bound(&self) -> Bounds3f {
        let r = Vec3f::new(self.radius, self.radius, self.radius);
        Bounds3f::with_bounds(self.center - r, self.center + r)
    }

    fn intersect(&self, ray: &Ray) -> Option<ShapeHit> {
        let oc = ray.origin - self.center;
        let a = ray.dir.magnitude2();
        let b = oc.dot(ray.dir);
        let c = oc.magnitude2() - self.radius * self.radius;
        let discriminant = b * b - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let t = [(-b - root) / a, (-b + root) / a]
            .iter()
            .cloned()
            .find(|&t| ray.contains(t))?;

        let outward = (ray.at(t) - self.center).normalize();
        let n = self.oriented(outward);
        Some(ShapeHit {
            t,
            // reproject onto the surface to limit error in the spawned rays
            p: self.center + outward * self.radius,
            n,
            shading_n: n,
        })
    }

    fn area(&self) -> Float {
        4.0 * consts::PI * self.radius * self.radius
    }

    fn sample(&self, u: Point2f) -> SurfacePoint {
        let outward = uniform_sample_sphere(u);
        SurfacePoint {
            p: self.center + outward * self.radius,
            n: self.oriented(outward),
        }
    }
}

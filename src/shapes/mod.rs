use crate::geometry::bounds::Bounds3f;
use crate::interaction::ShapeHit;
use crate::{Float, Point2f, Point3f, Ray, Vec3f};

pub mod sphere;
pub mod triangle;

pub use sphere::Sphere;
pub use triangle::TriangleMesh;

/// A point drawn from a shape's surface together with its facing normal.
#[derive(Clone, Copy, Debug)]
pub struct SurfacePoint {
    pub p: Point3f,
    pub n: Vec3f,
}

pub trait Shape: Sync + Send {
    fn world_bound(&self) -> Bounds3f;

    fn intersect(&self, ray: &Ray) -> Option<ShapeHit>;

    fn intersect_test(&self, ray: &Ray) -> bool {
        self.intersect(ray).is_some()
    }

    fn area(&self) -> Float;

    /// Samples a point uniformly by area.
    fn sample(&self, u: Point2f) -> SurfacePoint;

    /// Density of `sample` with respect to surface area.
    fn pdf(&self) -> Float {
        1.0 / self.area()
    }
}

use crate::geometry::Frame;
use crate::primitive::Primitive;
use crate::reflection::bsdf::Bsdf;
use crate::{Float, Point3f, Ray, Vec3f};

/// Geometric result of a ray-shape intersection, before the owning primitive is attached.
#[derive(Clone, Copy, Debug)]
pub struct ShapeHit {
    pub t: Float,
    pub p: Point3f,
    /// Geometric normal, facing the side the shape was built to face.
    pub n: Vec3f,
    /// Interpolated normal used to build the shading frame.
    pub shading_n: Vec3f,
}

/// A point on a surface found by `Scene::intersect`. Only lives for a single path-extension step.
#[derive(Clone, Copy)]
pub struct SurfaceInteraction<'s> {
    pub t: Float,
    pub p: Point3f,
    pub n: Vec3f,
    pub frame: Frame,

    /// Unit direction back towards the ray origin
    pub wo: Vec3f,

    pub primitive: &'s Primitive,
}

impl<'s> SurfaceInteraction<'s> {
    pub fn new(hit: ShapeHit, ray: &Ray, primitive: &'s Primitive) -> Self {
        Self {
            t: hit.t,
            p: hit.p,
            n: hit.n,
            frame: Frame::from_normal(hit.shading_n),
            wo: -ray.dir,
            primitive,
        }
    }

    pub fn bsdf(&self) -> &'s Bsdf {
        &self.primitive.bsdf
    }

    pub fn luminaire(&self) -> Option<usize> {
        self.primitive.luminaire
    }

    pub fn to_local(&self, v: Vec3f) -> Vec3f {
        self.frame.to_local(v)
    }

    pub fn to_world(&self, v: Vec3f) -> Vec3f {
        self.frame.to_world(v)
    }

    pub fn spawn_ray(&self, dir: Vec3f) -> Ray {
        Ray::new(self.p, dir)
    }
}

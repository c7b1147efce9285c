use cgmath::InnerSpace;

use crate::{coordinate_system, Float, Point3f, Vec3f, EPSILON, INFINITY};

pub mod bounds;

pub use bounds::{Bounds2i, Bounds3f};

/// A ray with a valid parametric interval `[t_min, t_max]`. Rays are built once and passed
/// by value; intersection routines never shrink the interval in place.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Point3f,
    pub dir: Vec3f,
    pub t_min: Float,
    pub t_max: Float,
}

impl Ray {
    pub fn new(origin: Point3f, dir: Vec3f) -> Self {
        Self { origin, dir, t_min: EPSILON, t_max: INFINITY }
    }

    pub fn with_interval(origin: Point3f, dir: Vec3f, t_min: Float, t_max: Float) -> Self {
        Self { origin, dir, t_min, t_max }
    }

    /// Shadow ray from `p0` towards `p1` that stops just short of `p1`.
    pub fn segment(p0: Point3f, p1: Point3f) -> Self {
        let d = p1 - p0;
        let dist = d.magnitude();
        Self {
            origin: p0,
            dir: d / dist,
            t_min: EPSILON,
            t_max: dist * (1.0 - 1.0e-4),
        }
    }

    pub fn at(&self, t: Float) -> Point3f {
        self.origin + self.dir * t
    }

    pub fn contains(&self, t: Float) -> bool {
        t > self.t_min && t < self.t_max
    }

    /// Copy of the ray whose interval ends at `t_max`, used by the aggregate to only look for
    /// hits closer than the best one found so far.
    pub fn clipped(&self, t_max: Float) -> Self {
        Self { t_max, ..*self }
    }
}

/// Orthonormal shading basis. Local coordinates have the normal along +z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub s: Vec3f,
    pub t: Vec3f,
    pub n: Vec3f,
}

impl Frame {
    pub fn from_normal(n: Vec3f) -> Self {
        let (s, t) = coordinate_system(n);
        Self { s, t, n }
    }

    pub fn to_local(&self, v: Vec3f) -> Vec3f {
        Vec3f::new(v.dot(self.s), v.dot(self.t), v.dot(self.n))
    }

    pub fn to_world(&self, v: Vec3f) -> Vec3f {
        self.s * v.x + self.t * v.y + self.n * v.z
    }
}

#[inline]
pub fn cos_theta(w: Vec3f) -> Float { w.z }

#[inline]
pub fn abs_cos_theta(w: Vec3f) -> Float { w.z.abs() }

#[inline]
pub fn same_hemisphere(w: Vec3f, wp: Vec3f) -> bool {
    w.z * wp.z > 0.0
}

#[macro_use] pub mod macros; // must stay at the top
pub mod error;
pub mod geometry;
pub mod spectrum;
pub mod sampling;
pub mod sampler;
pub mod interaction;
pub mod shapes;
pub mod primitive;
pub mod fresnel;
pub mod reflection;
pub mod light;
pub mod scene;
pub mod camera;
pub mod filter;
pub mod film;
pub mod integrator;
pub mod variance;

pub use geometry::*;
pub use error::RenderError;

use cgmath::{InnerSpace, Point2, Point3, Vector2, Vector3};

pub type Float = f32;

pub type Point2f = Point2<Float>;
pub type Point2i = Point2<i32>;
pub type Point3f = Point3<Float>;
pub type Vec2f = Vector2<Float>;
pub type Vec3f = Vector3<Float>;

/// Offset used to keep spawned rays and shadow segments off the surface they start on.
pub const EPSILON: Float = 1.0e-4;

pub const INFINITY: Float = std::f32::INFINITY;

/// Largest float strictly below one, used to keep remapped samples in `[0, 1)`.
pub const ONE_MINUS_EPSILON: Float = 1.0 - std::f32::EPSILON / 2.0;

pub mod consts {
    pub use std::f32::consts::*;

    pub const INV_PI: f32 = std::f32::consts::FRAC_1_PI;
    pub const INV_2_PI: f32 = 0.5 * std::f32::consts::FRAC_1_PI;
    pub const INV_4_PI: f32 = 0.25 * std::f32::consts::FRAC_1_PI;
}

pub fn abs_dot(v1: Vec3f, v2: Vec3f) -> Float {
    v1.dot(v2).abs()
}

/// Builds two unit vectors that form an orthonormal basis together with the unit vector `v1`.
pub fn coordinate_system(v1: Vec3f) -> (Vec3f, Vec3f) {
    let v2 = if v1.x.abs() > v1.y.abs() {
        Vec3f::new(-v1.z, 0.0, v1.x) / (v1.x * v1.x + v1.z * v1.z).sqrt()
    } else {
        Vec3f::new(0.0, v1.z, -v1.y) / (v1.y * v1.y + v1.z * v1.z).sqrt()
    };
    let v3 = v1.cross(v2);
    (v2, v3)
}

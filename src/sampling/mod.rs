use cgmath::EuclideanSpace;

use crate::consts::{FRAC_PI_2, FRAC_PI_4, INV_2_PI, INV_4_PI, INV_PI, PI};
use crate::{Float, Point2f, Vec2f, Vec3f};

pub mod alias;
pub mod discrete;

pub use alias::AliasTable;
pub use discrete::DiscretePdf;

pub fn concentric_sample_disk(u: Point2f) -> Point2f {
    // map sample from [0, 1] to [-1, 1]
    let u_offset = Point2f::from_vec(2.0 * u.to_vec() - Vec2f::new(1.0, 1.0));
    if u_offset.x == 0.0 && u_offset.y == 0.0 {
        return Point2f::new(0.0, 0.0);
    }

    let (r, theta) = if u_offset.x.abs() > u_offset.y.abs() {
        (u_offset.x, FRAC_PI_4 * (u_offset.y / u_offset.x))
    } else {
        (u_offset.y, FRAC_PI_2 - FRAC_PI_4 * (u_offset.x / u_offset.y))
    };

    Point2f::new(r * theta.cos(), r * theta.sin())
}

pub fn cosine_sample_hemisphere(u: Point2f) -> Vec3f {
    let d = concentric_sample_disk(u);
    let z = Float::sqrt(Float::max(0.0, 1.0 - d.x * d.x - d.y * d.y));
    Vec3f::new(d.x, d.y, z)
}

pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    if cos_theta > 0.0 { cos_theta * INV_PI } else { 0.0 }
}

pub fn uniform_sample_hemisphere(u: Point2f) -> Vec3f {
    let z = u.x;
    let r = Float::sqrt(Float::max(0.0, 1.0 - z * z));
    let phi = 2.0 * PI * u.y;
    Vec3f::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn uniform_hemisphere_pdf() -> Float {
    INV_2_PI
}

pub fn uniform_sample_sphere(u: Point2f) -> Vec3f {
    let z = 1.0 - 2.0 * u.x;
    let r = Float::sqrt(Float::max(0.0, 1.0 - z * z));
    let phi = 2.0 * PI * u.y;
    Vec3f::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn uniform_sphere_pdf() -> Float {
    INV_4_PI
}

/// Barycentric coordinates `(b0, b1)` uniformly distributed over a triangle.
pub fn uniform_sample_triangle(u: Point2f) -> (Float, Float) {
    let su0 = u.x.sqrt();
    (1.0 - su0, u.y * su0)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sampler::random::RandomSampler;
    use crate::sampler::Sampler;
    use approx::assert_abs_diff_eq;
    use cgmath::InnerSpace;

    #[test]
    fn cosine_hemisphere_stays_on_upper_half() {
        let mut sampler = RandomSampler::new_with_seed(1, 7);
        for _ in 0..1000 {
            let w = cosine_sample_hemisphere(sampler.get_2d());
            assert!(w.z >= 0.0);
            assert_abs_diff_eq!(w.magnitude(), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn uniform_hemisphere_integrates_cosine() {
        // E[cos / pdf] over the hemisphere is the integral of cos, which is pi
        let mut sampler = RandomSampler::new_with_seed(1, 11);
        let n = 20_000;
        let mut sum = 0.0;
        for _ in 0..n {
            let w = uniform_sample_hemisphere(sampler.get_2d());
            sum += w.z / uniform_hemisphere_pdf();
        }
        assert_abs_diff_eq!(sum / n as Float, PI, epsilon = 0.05);
    }

    #[test]
    fn triangle_barycentrics_are_valid() {
        let mut sampler = RandomSampler::new_with_seed(1, 3);
        for _ in 0..1000 {
            let (b0, b1) = uniform_sample_triangle(sampler.get_2d());
            assert!(b0 >= 0.0 && b1 >= 0.0 && b0 + b1 <= 1.0 + 1e-6);
        }
    }
}

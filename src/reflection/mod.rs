//! Scattering functions expressed in the local shading frame, where the normal is +z.
//!
//! Direction conventions follow the rest of the crate: `wo` points back along the path towards
//! the vertex the path came from, `wi` is the sampled continuation direction. Both are unit
//! vectors pointing away from the surface.

use bitflags::bitflags;
use cgmath::InnerSpace;

use crate::fresnel::fresnel_dielectric;
use crate::geometry::{abs_cos_theta, cos_theta, same_hemisphere};
use crate::sampling::cosine_sample_hemisphere;
use crate::spectrum::Spectrum;
use crate::{consts, Float, Point2f, Vec3f};

pub mod bsdf;
pub mod phong;

pub use bsdf::Bsdf;
pub use phong::Phong;

bitflags! {
    pub struct BxDFType: u8 {
        const REFLECTION = 1;
        const TRANSMISSION = 1 << 1;
        const DIFFUSE = 1 << 2;
        const GLOSSY = 1 << 3;
        const SPECULAR = 1 << 4;
    }
}

/// Which quantity a path carries. Refraction scales radiance by the squared index ratio but
/// leaves importance, so light sub-paths sample with `Importance`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportMode {
    Radiance,
    Importance,
}

#[derive(Clone, Copy, Debug)]
pub struct ScatterSample {
    /// `f(wo, wi) * |cos θi| / pdf`, or the equivalent ratio for discrete lobes.
    pub weight: Spectrum,
    pub wi: Vec3f,
    /// Solid-angle density of `wi`. For discrete lobes this is the lobe selection probability
    /// and carries no solid-angle meaning.
    pub pdf: Float,
    /// Relative index of refraction across the event, one for reflection.
    pub eta: Float,
    pub sampled_type: BxDFType,
}

impl ScatterSample {
    /// True when `wi` was chosen from a delta distribution.
    pub fn is_discrete(&self) -> bool {
        self.sampled_type.contains(BxDFType::SPECULAR)
    }
}

pub fn reflect(wo: Vec3f, n: Vec3f) -> Vec3f {
    -wo + 2.0 * wo.dot(n) * n
}

/// Refracts `wi` through a boundary with normal `n` on the same side as `wi`, where `eta` is
/// the ratio of the incident to the transmitted index.
pub fn refract(wi: Vec3f, n: Vec3f, eta: Float) -> Option<Vec3f> {
    let cos_theta_i = n.dot(wi);
    let sin2_theta_i = Float::max(0.0, 1.0 - cos_theta_i * cos_theta_i);
    let sin2_theta_t = eta * eta * sin2_theta_i;
    if sin2_theta_t >= 1.0 { return None }
    let cos_theta_t = Float::sqrt(1.0 - sin2_theta_t);
    Some(eta * -wi + (eta * cos_theta_i - cos_theta_t) * n)
}

#[derive(Clone, Debug)]
pub struct Diffuse {
    pub albedo: Spectrum,
}

impl Diffuse {
    pub fn f(&self, wo: Vec3f, wi: Vec3f) -> Spectrum {
        if same_hemisphere(wo, wi) {
            self.albedo * consts::INV_PI
        } else {
            Spectrum::zero()
        }
    }

    pub fn pdf(&self, wo: Vec3f, wi: Vec3f) -> Float {
        if same_hemisphere(wo, wi) { abs_cos_theta(wi) * consts::INV_PI } else { 0.0 }
    }

    pub fn sample(&self, wo: Vec3f, u: Point2f) -> Option<ScatterSample> {
        let mut wi = cosine_sample_hemisphere(u);
        // flip direction if wo is on the opposite hemisphere
        if wo.z < 0.0 { wi.z *= -1.0; }
        let pdf = self.pdf(wo, wi);
        if pdf == 0.0 {
            return None;
        }
        Some(ScatterSample {
            weight: self.albedo,
            wi,
            pdf,
            eta: 1.0,
            sampled_type: BxDFType::REFLECTION | BxDFType::DIFFUSE,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Mirror {
    pub reflectance: Spectrum,
}

impl Mirror {
    pub fn sample(&self, wo: Vec3f) -> Option<ScatterSample> {
        if cos_theta(wo) == 0.0 {
            return None;
        }
        Some(ScatterSample {
            weight: self.reflectance,
            wi: Vec3f::new(-wo.x, -wo.y, wo.z),
            pdf: 1.0,
            eta: 1.0,
            sampled_type: BxDFType::REFLECTION | BxDFType::SPECULAR,
        })
    }
}

/// Smooth dielectric boundary that chooses between specular reflection and refraction in
/// proportion to the Fresnel reflectance.
#[derive(Clone, Debug)]
pub struct Dielectric {
    /// Index on the side the normal points to.
    pub eta_exterior: Float,
    pub eta_interior: Float,
    pub tint: Spectrum,
}

impl Dielectric {
    pub fn glass() -> Self {
        Self { eta_exterior: 1.0, eta_interior: 1.5, tint: Spectrum::uniform(1.0) }
    }

    pub fn sample(&self, wo: Vec3f, u: Point2f, mode: TransportMode) -> Option<ScatterSample> {
        let cos_o = cos_theta(wo);
        if cos_o == 0.0 {
            return None;
        }

        let reflectance = fresnel_dielectric(cos_o, self.eta_exterior, self.eta_interior);
        if u.x < reflectance {
            return Some(ScatterSample {
                weight: self.tint,
                wi: Vec3f::new(-wo.x, -wo.y, wo.z),
                pdf: reflectance,
                eta: 1.0,
                sampled_type: BxDFType::REFLECTION | BxDFType::SPECULAR,
            });
        }

        let entering = cos_o > 0.0;
        let (eta_i, eta_t) = if entering {
            (self.eta_exterior, self.eta_interior)
        } else {
            (self.eta_interior, self.eta_exterior)
        };
        let n = if entering { Vec3f::unit_z() } else { -Vec3f::unit_z() };
        let wi = refract(wo, n, eta_i / eta_t)?;

        let mut weight = self.tint;
        if mode == TransportMode::Radiance {
            weight *= (eta_i * eta_i) / (eta_t * eta_t);
        }

        Some(ScatterSample {
            weight,
            wi,
            pdf: 1.0 - reflectance,
            eta: eta_t / eta_i,
            sampled_type: BxDFType::TRANSMISSION | BxDFType::SPECULAR,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sampler::random::RandomSampler;
    use crate::sampler::Sampler;
    use approx::assert_abs_diff_eq;

    #[test]
    fn diffuse_sample_weight_is_albedo() {
        let diffuse = Diffuse { albedo: Spectrum::uniform(0.6) };
        let mut sampler = RandomSampler::new_with_seed(1, 0);
        let wo = vec3f!(0.3, 0.1, 0.9).normalize();
        for _ in 0..100 {
            let s = diffuse.sample(wo, sampler.get_2d()).unwrap();
            assert!(s.wi.z > 0.0);
            let expected = diffuse.f(wo, s.wi) * abs_cos_theta(s.wi) / s.pdf;
            assert_abs_diff_eq!(s.weight[0], expected[0], epsilon = 1e-4);
        }
    }

    #[test]
    fn diffuse_is_two_sided() {
        let diffuse = Diffuse { albedo: Spectrum::uniform(0.5) };
        let s = diffuse.sample(vec3f!(0, 0, -1), point2f!(0.3, 0.3)).unwrap();
        assert!(s.wi.z < 0.0);
        assert!(diffuse.f(vec3f!(0, 0, 1), vec3f!(0, 0, -1)).is_black());
    }

    #[test]
    fn dielectric_refraction_tracks_eta() {
        let glass = Dielectric::glass();
        // u.x = 0.99 is above the normal-incidence reflectance, forcing refraction
        let enter = glass.sample(vec3f!(0, 0, 1), point2f!(0.99, 0.5), TransportMode::Radiance).unwrap();
        assert!(enter.is_discrete());
        assert_abs_diff_eq!(enter.wi.z, -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(enter.eta, 1.5, epsilon = 1e-6);
        assert_abs_diff_eq!(enter.weight[0], 1.0 / 2.25, epsilon = 1e-5);

        let exit = glass.sample(vec3f!(0, 0, -1), point2f!(0.99, 0.5), TransportMode::Importance).unwrap();
        assert_abs_diff_eq!(exit.eta, 1.0 / 1.5, epsilon = 1e-6);
        assert_abs_diff_eq!(exit.weight[0], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn refract_obeys_snell() {
        let wo = vec3f!(0.5, 0.0, 0.75f32.sqrt());
        let wt = refract(wo, Vec3f::unit_z(), 1.0 / 1.5).unwrap();
        assert_abs_diff_eq!(wt.magnitude(), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(-wt.x, 0.5 / 1.5, epsilon = 1e-5);
    }
}

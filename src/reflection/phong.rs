use crate::geometry::{cos_theta, Frame};
use crate::reflection::{BxDFType, ScatterSample};
use crate::sampling::cosine_sample_hemisphere;
use crate::spectrum::Spectrum;
use crate::{consts, Float, Point2f, Vec3f};
use cgmath::InnerSpace;

/// Energy-normalized modified Phong: a Lambertian term plus a cosine-power lobe around the
/// mirror direction. One-sided, and `kd + ks` must not exceed one per channel.
#[derive(Clone, Debug)]
pub struct Phong {
    kd: Spectrum,
    ks: Spectrum,
    exponent: Float,
    /// Probability of sampling the glossy lobe, from the lobes' luminance.
    specular_weight: Float,
}

impl Phong {
    pub fn new(kd: Spectrum, ks: Spectrum, exponent: Float) -> Self {
        let d = kd.luminance();
        let s = ks.luminance();
        let specular_weight = if d + s > 0.0 { s / (d + s) } else { 0.0 };
        Self { kd, ks, exponent, specular_weight }
    }

    fn mirror_cosine(wo: Vec3f, wi: Vec3f) -> Float {
        Vec3f::new(-wo.x, -wo.y, wo.z).dot(wi)
    }

    pub fn f(&self, wo: Vec3f, wi: Vec3f) -> Spectrum {
        if cos_theta(wo) <= 0.0 || cos_theta(wi) <= 0.0 {
            return Spectrum::zero();
        }
        let mut f = self.kd * consts::INV_PI;
        let alpha = Self::mirror_cosine(wo, wi);
        if alpha > 0.0 {
            f += self.ks * ((self.exponent + 2.0) * consts::INV_2_PI * alpha.powf(self.exponent));
        }
        f
    }

    pub fn pdf(&self, wo: Vec3f, wi: Vec3f) -> Float {
        if cos_theta(wo) <= 0.0 || cos_theta(wi) <= 0.0 {
            return 0.0;
        }
        let alpha = Self::mirror_cosine(wo, wi);
        let specular = if alpha > 0.0 {
            (self.exponent + 1.0) * consts::INV_2_PI * alpha.powf(self.exponent)
        } else {
            0.0
        };
        let diffuse = cos_theta(wi) * consts::INV_PI;
        self.specular_weight * specular + (1.0 - self.specular_weight) * diffuse
    }

    pub fn sample(&self, wo: Vec3f, u: Point2f) -> Option<ScatterSample> {
        if cos_theta(wo) <= 0.0 {
            return None;
        }

        let (wi, lobe) = if u.x < self.specular_weight {
            let ux = u.x / self.specular_weight;
            let cos_alpha = ux.powf(1.0 / (self.exponent + 1.0));
            let sin_alpha = Float::sqrt((1.0 - cos_alpha * cos_alpha).max(0.0));
            let phi = 2.0 * consts::PI * u.y;
            let local = Vec3f::new(sin_alpha * phi.cos(), sin_alpha * phi.sin(), cos_alpha);
            let lobe_frame = Frame::from_normal(Vec3f::new(-wo.x, -wo.y, wo.z));
            (lobe_frame.to_world(local), BxDFType::GLOSSY)
        } else {
            let ux = (u.x - self.specular_weight) / (1.0 - self.specular_weight);
            (cosine_sample_hemisphere(Point2f::new(ux, u.y)), BxDFType::DIFFUSE)
        };

        if cos_theta(wi) <= 0.0 {
            return None;
        }
        let pdf = self.pdf(wo, wi);
        if pdf == 0.0 {
            return None;
        }

        Some(ScatterSample {
            weight: self.f(wo, wi) * cos_theta(wi) / pdf,
            wi,
            pdf,
            eta: 1.0,
            sampled_type: BxDFType::REFLECTION | lobe,
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
    fn sampled_directions_reproduce_albedo() {
        // At normal incidence the whole glossy lobe is above the horizon, so the expected weight
        // is the sum of both albedos.
        let phong = Phong::new(Spectrum::uniform(0.3), Spectrum::uniform(0.5), 20.0);
        let mut sampler = RandomSampler::new_with_seed(1, 21);
        let wo = vec3f!(0, 0, 1);
        let n = 50_000;
        let mut sum = 0.0;
        for _ in 0..n {
            if let Some(s) = phong.sample(wo, sampler.get_2d()) {
                assert!(s.weight.is_non_negative());
                sum += s.weight[0];
            }
        }
        assert_abs_diff_eq!(sum / n as Float, 0.8, epsilon = 0.02);
    }

    #[test]
    fn one_sided() {
        let phong = Phong::new(Spectrum::uniform(0.3), Spectrum::uniform(0.5), 20.0);
        assert!(phong.sample(vec3f!(0, 0, -1), point2f!(0.5, 0.5)).is_none());
        assert_eq!(phong.pdf(vec3f!(0, 0, 1), vec3f!(0, 0, -1)), 0.0);
    }
}

use crate::reflection::{BxDFType, Dielectric, Diffuse, Mirror, Phong, ScatterSample, TransportMode};
use crate::spectrum::Spectrum;
use crate::{Float, Point2f, Vec3f};

/// The closed set of surface scattering models. All directions are in the local shading frame.
#[derive(Clone, Debug)]
pub enum Bsdf {
    Diffuse(Diffuse),
    Mirror(Mirror),
    Dielectric(Dielectric),
    Phong(Phong),
}

impl Bsdf {
    pub fn diffuse(albedo: Spectrum) -> Self {
        Bsdf::Diffuse(Diffuse { albedo })
    }

    pub fn mirror(reflectance: Spectrum) -> Self {
        Bsdf::Mirror(Mirror { reflectance })
    }

    pub fn dielectric(eta_interior: Float) -> Self {
        Bsdf::Dielectric(Dielectric { eta_interior, ..Dielectric::glass() })
    }

    pub fn phong(kd: Spectrum, ks: Spectrum, exponent: Float) -> Self {
        Bsdf::Phong(Phong::new(kd, ks, exponent))
    }

    /// A surface that absorbs everything, for luminaires and light blockers.
    pub fn black() -> Self {
        Self::diffuse(Spectrum::zero())
    }

    pub fn flags(&self) -> BxDFType {
        match self {
            Bsdf::Diffuse(_) => BxDFType::REFLECTION | BxDFType::DIFFUSE,
            Bsdf::Mirror(_) => BxDFType::REFLECTION | BxDFType::SPECULAR,
            Bsdf::Dielectric(_) => BxDFType::REFLECTION | BxDFType::TRANSMISSION | BxDFType::SPECULAR,
            Bsdf::Phong(_) => BxDFType::REFLECTION | BxDFType::DIFFUSE | BxDFType::GLOSSY,
        }
    }

    /// True if every lobe is a delta distribution, so `f` and `pdf` are always zero and
    /// connecting a path through this surface can never succeed.
    pub fn is_delta(&self) -> bool {
        !self.flags().intersects(BxDFType::DIFFUSE | BxDFType::GLOSSY)
    }

    /// Value of the scattering function for a pair of directions. Zero for delta lobes.
    pub fn f(&self, wo: Vec3f, wi: Vec3f) -> Spectrum {
        match self {
            Bsdf::Diffuse(d) => d.f(wo, wi),
            Bsdf::Phong(p) => p.f(wo, wi),
            Bsdf::Mirror(_) | Bsdf::Dielectric(_) => Spectrum::zero(),
        }
    }

    /// Solid-angle density with which `sample` produces `wi` given `wo`. Zero for delta lobes.
    pub fn pdf(&self, wo: Vec3f, wi: Vec3f) -> Float {
        match self {
            Bsdf::Diffuse(d) => d.pdf(wo, wi),
            Bsdf::Phong(p) => p.pdf(wo, wi),
            Bsdf::Mirror(_) | Bsdf::Dielectric(_) => 0.0,
        }
    }

    /// Samples a continuation direction. `None` means the sample was absorbed.
    pub fn sample(&self, wo: Vec3f, u: Point2f, mode: TransportMode) -> Option<ScatterSample> {
        match self {
            Bsdf::Diffuse(d) => d.sample(wo, u),
            Bsdf::Mirror(m) => m.sample(wo),
            Bsdf::Dielectric(d) => d.sample(wo, u, mode),
            Bsdf::Phong(p) => p.sample(wo, u),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn delta_classification() {
        assert!(Bsdf::mirror(Spectrum::uniform(1.0)).is_delta());
        assert!(Bsdf::dielectric(1.5).is_delta());
        assert!(!Bsdf::diffuse(Spectrum::uniform(0.5)).is_delta());
        assert!(!Bsdf::phong(Spectrum::uniform(0.2), Spectrum::uniform(0.2), 10.0).is_delta());
    }

    #[test]
    fn black_surface_absorbs() {
        let s = Bsdf::black()
            .sample(vec3f!(0, 0, 1), point2f!(0.5, 0.5), TransportMode::Radiance)
            .unwrap();
        assert!(s.weight.is_black());
    }

    #[test]
    fn delta_lobes_do_not_evaluate() {
        let mirror = Bsdf::mirror(Spectrum::uniform(1.0));
        assert!(mirror.f(vec3f!(0, 0, 1), vec3f!(0, 0, 1)).is_black());
        assert_eq!(mirror.pdf(vec3f!(0, 0, 1), vec3f!(0, 0, 1)), 0.0);
    }
}

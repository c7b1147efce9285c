use bumpalo::Bump;

use crate::error::RenderError;
use crate::integrator::{sample_one_light, IntegratorRadiance};
use crate::interaction::SurfaceInteraction;
use crate::light::check_sampleable;
use crate::reflection::TransportMode;
use crate::sampler::Sampler;
use crate::sampling::{uniform_hemisphere_pdf, uniform_sample_hemisphere};
use crate::scene::Scene;
use crate::spectrum::Spectrum;
use crate::{abs_dot, Ray};

/// How the single bounce of direct illumination is estimated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectStrategy {
    /// Uniform directions over the hemisphere on the viewer's side of the surface.
    Hemisphere,

    /// One direction sampled from the BSDF.
    Bsdf,

    /// One point sampled on the luminaires. The environment is not sampled by this strategy.
    Light,
}

/// Emission seen directly plus one bounce of light, estimated with a single strategy.
pub struct DirectLightingIntegrator {
    pub strategy: DirectStrategy,
}

impl DirectLightingIntegrator {
    pub fn new(strategy: DirectStrategy) -> Self {
        Self { strategy }
    }

    /// Emitted radiance arriving back along `ray`, with no further bounces.
    fn emitted_along(ray: &Ray, scene: &Scene) -> Spectrum {
        match scene.intersect(ray) {
            Some(si) => scene.emitted_radiance(&si),
            None => scene.environment_radiance(),
        }
    }

    fn hemisphere(si: &SurfaceInteraction, scene: &Scene, sampler: &mut dyn Sampler) -> Spectrum {
        let wo = si.to_local(si.wo);
        let mut wi = uniform_sample_hemisphere(sampler.get_2d());
        if wo.z < 0.0 {
            wi.z = -wi.z;
        }
        let f = si.bsdf().f(wo, wi);
        if f.is_black() {
            return Spectrum::zero();
        }
        let wi_world = si.to_world(wi);
        let li = Self::emitted_along(&si.spawn_ray(wi_world), scene);
        f * li * abs_dot(wi_world, si.frame.n) / uniform_hemisphere_pdf()
    }

    fn bsdf(si: &SurfaceInteraction, scene: &Scene, sampler: &mut dyn Sampler) -> Spectrum {
        let wo = si.to_local(si.wo);
        match si.bsdf().sample(wo, sampler.get_2d(), TransportMode::Radiance) {
            Some(s) if !s.weight.is_black() => {
                s.weight * Self::emitted_along(&si.spawn_ray(si.to_world(s.wi)), scene)
            }
            _ => Spectrum::zero(),
        }
    }
}

impl IntegratorRadiance for DirectLightingIntegrator {
    fn preprocess(&mut self, scene: &Scene) -> Result<(), RenderError> {
        if self.strategy == DirectStrategy::Light {
            check_sampleable(scene.luminaires())?;
        }
        tracing::debug!(strategy = ?self.strategy, "direct lighting ready");
        Ok(())
    }

    fn incident_radiance(&self, ray: &Ray, scene: &Scene, sampler: &mut dyn Sampler, _arena: &Bump) -> Spectrum {
        let si = match scene.intersect(ray) {
            Some(si) => si,
            None => return scene.environment_radiance(),
        };

        let reflected = match self.strategy {
            DirectStrategy::Hemisphere => Self::hemisphere(&si, scene, sampler),
            DirectStrategy::Bsdf => Self::bsdf(&si, scene, sampler),
            DirectStrategy::Light => sample_one_light(&si, scene, sampler),
        };
        scene.emitted_radiance(&si) + reflected
    }
}

use bumpalo::Bump;

use crate::error::RenderError;
use crate::integrator::{sample_one_light, EtaBounds, IntegratorRadiance, RelativeIor, RussianRoulette};
use crate::light::check_sampleable;
use crate::reflection::TransportMode;
use crate::sampler::Sampler;
use crate::scene::Scene;
use crate::spectrum::Spectrum;
use crate::Ray;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathConfig {
    pub roulette: RussianRoulette,
    /// Hard ceiling on the number of surface vertices.
    pub max_depth: u32,
    pub eta_bounds: EtaBounds,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            roulette: RussianRoulette::new(2, 0.8),
            max_depth: 1000,
            eta_bounds: EtaBounds::default(),
        }
    }
}

/// Unidirectional path tracer with next-event estimation at every non-delta vertex.
///
/// Emission found by the random walk is only counted after a discrete bounce (or directly
/// from the camera), since light sampling has already accounted for it otherwise.
pub struct PathIntegrator {
    config: PathConfig,
}

impl PathIntegrator {
    pub fn new(config: PathConfig) -> Self {
        Self { config }
    }
}

impl IntegratorRadiance for PathIntegrator {
    fn preprocess(&mut self, scene: &Scene) -> Result<(), RenderError> {
        self.config.roulette.validate("eye")?;
        self.config.eta_bounds.validate()?;
        check_sampleable(scene.luminaires())?;
        tracing::debug!(luminaires = scene.luminaires().len(), config = ?self.config, "path tracer ready");
        Ok(())
    }

    fn incident_radiance(&self, ray: &Ray, scene: &Scene, sampler: &mut dyn Sampler, _arena: &Bump) -> Spectrum {
        let mut l = Spectrum::zero();
        let mut throughput = Spectrum::uniform(1.0);
        let mut include_emitted = true;
        let mut ior = RelativeIor::new(self.config.eta_bounds);
        let mut ray = *ray;
        let mut depth = 0;

        loop {
            let si = match scene.intersect(&ray) {
                Some(si) => si,
                None => {
                    l += throughput * scene.environment_radiance();
                    break;
                }
            };

            if include_emitted {
                l += throughput * scene.emitted_radiance(&si);
            }

            depth += 1;
            if depth > self.config.max_depth {
                break;
            }

            l += throughput * sample_one_light(&si, scene, sampler);

            let wo = si.to_local(si.wo);
            let sample = match si.bsdf().sample(wo, sampler.get_2d(), TransportMode::Radiance) {
                Some(s) if !s.weight.is_black() => s,
                _ => break,
            };
            if !ior.scatter(sample.eta) {
                break;
            }

            throughput *= sample.weight;
            include_emitted = sample.is_discrete();
            ray = si.spawn_ray(si.to_world(sample.wi));

            match self.config.roulette.survives(depth, sampler) {
                Some(p) => throughput /= p,
                None => break,
            }
        }

        l
    }
}

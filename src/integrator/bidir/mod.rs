//! Bidirectional path tracing.
//!
//! Every camera ray grows an eye sub-path and is paired with one light sub-path traced from a
//! sampled luminaire point. At each non-delta eye vertex the estimator adds next-event
//! estimation (a fresh light sample) and a connection to every non-delta light vertex past the
//! luminaire itself. Emission reached by the eye walk is counted from the camera and after delta
//! bounces. Each contribution is weighted with the balance heuristic, see [`weight`].

use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;
use cgmath::InnerSpace;

use crate::error::RenderError;
use crate::integrator::{EtaBounds, IntegratorRadiance, RelativeIor, RussianRoulette};
use crate::light::{check_sampleable, light_point_pdf, sample_light_point};
use crate::reflection::TransportMode;
use crate::sampler::Sampler;
use crate::scene::Scene;
use crate::spectrum::Spectrum;
use crate::{abs_dot, Ray};

pub mod vertex;
pub mod weight;

use self::vertex::{convert_density, trace_light_path, PathVertex};
use self::weight::{connection_weight, emission_weight};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BidirConfig {
    pub eye_roulette: RussianRoulette,
    pub light_roulette: RussianRoulette,
    /// Hard ceiling on eye vertices, only there to stop pathological loops.
    pub max_eye_depth: u32,
    pub max_light_vertices: usize,
    pub eta_bounds: EtaBounds,
}

impl Default for BidirConfig {
    fn default() -> Self {
        Self {
            eye_roulette: RussianRoulette::new(2, 0.8),
            light_roulette: RussianRoulette::new(0, 0.9),
            max_eye_depth: 1000,
            max_light_vertices: 1000,
            eta_bounds: EtaBounds::default(),
        }
    }
}

impl BidirConfig {
    pub fn validate(&self) -> Result<(), RenderError> {
        self.eye_roulette.validate("eye")?;
        self.light_roulette.validate("light")?;
        self.eta_bounds.validate()?;
        if self.max_eye_depth == 0 || self.max_light_vertices == 0 {
            return Err(RenderError::InvalidConfig("path length limits must be positive".to_string()));
        }
        Ok(())
    }
}

/// Unweighted contribution of joining eye vertex `pt` to light vertex `qs` with a shadow ray.
/// Zero if either side does not scatter towards the other or the segment is blocked.
pub fn connect_vertices(scene: &Scene, pt: &PathVertex, qs: &PathVertex) -> Spectrum {
    let d = qs.p - pt.p;
    let dist2 = d.magnitude2();
    if dist2 == 0.0 {
        return Spectrum::zero();
    }
    let w = d / dist2.sqrt();

    let g = abs_dot(w, pt.frame.n) * abs_dot(w, qs.frame.n) / dist2;
    let contribution = pt.throughput * pt.f(pt.wo, w) * qs.f(qs.wo, -w) * qs.throughput * g;
    if contribution.is_black() || scene.occluded(pt.p, qs.p) {
        return Spectrum::zero();
    }
    contribution
}

pub struct BidirIntegrator {
    config: BidirConfig,
}

impl BidirIntegrator {
    pub fn new(config: BidirConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BidirConfig {
        &self.config
    }

    fn next_event(&self, scene: &Scene, eye: &[PathVertex], sampler: &mut dyn Sampler) -> Spectrum {
        let lp = match sample_light_point(scene.luminaires(), sampler.get_2d()) {
            Some(lp) => lp,
            None => return Spectrum::zero(),
        };
        let light = PathVertex::light(&lp);
        let contribution = connect_vertices(scene, &eye[eye.len() - 1], &light);
        if contribution.is_black() {
            return contribution;
        }
        contribution * connection_weight(eye, std::slice::from_ref(&light))
    }
}

impl IntegratorRadiance for BidirIntegrator {
    fn preprocess(&mut self, scene: &Scene) -> Result<(), RenderError> {
        self.config.validate()?;
        check_sampleable(scene.luminaires())?;
        tracing::debug!(luminaires = scene.luminaires().len(), config = ?self.config, "bidirectional tracer ready");
        Ok(())
    }

    fn incident_radiance(&self, ray: &Ray, scene: &Scene, sampler: &mut dyn Sampler, arena: &Bump) -> Spectrum {
        let light_path = trace_light_path(scene, sampler, &self.config, arena);
        let mut eye: BumpVec<PathVertex> = BumpVec::with_capacity_in(16, arena);

        let mut l = Spectrum::zero();
        let mut throughput = Spectrum::uniform(1.0);
        let mut include_emitted = true;
        let mut ior = RelativeIor::new(self.config.eta_bounds);
        let mut ray = *ray;
        let mut pdf_dir = 0.0;

        loop {
            let si = match scene.intersect(&ray) {
                Some(si) => si,
                None => {
                    // the environment is never sampled by another strategy
                    l += throughput * scene.environment_radiance();
                    break;
                }
            };

            let mut vertex = PathVertex::surface(&si, throughput);
            vertex.pdf_fwd = match eye.last() {
                Some(prev) => convert_density(pdf_dir, prev.p, &vertex),
                None => 1.0,
            };
            eye.push(vertex);

            if include_emitted {
                if let Some(index) = si.luminaire() {
                    let le = scene.emitted_radiance(&si);
                    if !le.is_black() {
                        let w = emission_weight(&eye, light_point_pdf(scene.luminaires(), index));
                        l += throughput * le * w;
                    }
                }
            }

            if eye.len() as u32 > self.config.max_eye_depth {
                break;
            }

            if !vertex.delta {
                l += self.next_event(scene, &eye, sampler);

                for i in 1..light_path.len() {
                    let qs = &light_path[i];
                    if qs.delta {
                        continue;
                    }
                    let contribution = connect_vertices(scene, &vertex, qs);
                    if !contribution.is_black() {
                        l += contribution * connection_weight(&eye, &light_path[..=i]);
                    }
                }
            }

            let wo = si.to_local(si.wo);
            let sample = match si.bsdf().sample(wo, sampler.get_2d(), TransportMode::Radiance) {
                Some(s) if !s.weight.is_black() => s,
                _ => break,
            };
            if !ior.scatter(sample.eta) {
                break;
            }

            let pdf_rev = if sample.is_discrete() {
                pdf_dir = 0.0;
                0.0
            } else {
                pdf_dir = sample.pdf;
                si.bsdf().pdf(sample.wi, wo)
            };
            let n = eye.len();
            if n >= 2 {
                eye[n - 2].pdf_rev = convert_density(pdf_rev, si.p, &eye[n - 2]);
            }

            throughput *= sample.weight;
            include_emitted = sample.is_discrete();
            ray = si.spawn_ray(si.to_world(sample.wi));

            match self.config.eye_roulette.survives(eye.len() as u32, sampler) {
                Some(p) => throughput /= p,
                None => break,
            }
        }

        l
    }
}

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use bumpalo::Bump;
use rayon::prelude::*;

use crate::camera::Camera;
use crate::error::RenderError;
use crate::film::Film;
use crate::filter::BoxFilter;
use crate::interaction::SurfaceInteraction;
use crate::light::LuminaireQuery;
use crate::sampler::Sampler;
use crate::scene::Scene;
use crate::spectrum::Spectrum;
use crate::{abs_dot, Bounds2i, Float, Point2i, Ray};

pub mod bidir;
pub mod depth;
pub mod direct_lighting;
pub mod path;

pub use bidir::{BidirConfig, BidirIntegrator};
pub use depth::{DepthConfig, DepthIntegrator};
pub use direct_lighting::{DirectLightingIntegrator, DirectStrategy};
pub use path::{PathConfig, PathIntegrator};

pub trait IntegratorRadiance: Sync + Send {
    /// Checks the scene against the integrator's requirements before any sample is taken.
    fn preprocess(&mut self, scene: &Scene) -> Result<(), RenderError>;

    /// One Monte Carlo estimate of the radiance arriving along `ray`. `arena` is reset by the
    /// caller after every sample.
    fn incident_radiance(&self, ray: &Ray, scene: &Scene, sampler: &mut dyn Sampler, arena: &Bump) -> Spectrum;
}

/// Continue-with-probability path termination. The first `start_depth` bounces are free.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RussianRoulette {
    pub start_depth: u32,
    pub continue_prob: Float,
}

impl RussianRoulette {
    pub fn new(start_depth: u32, continue_prob: Float) -> Self {
        Self { start_depth, continue_prob }
    }

    pub fn validate(&self, name: &str) -> Result<(), RenderError> {
        if self.continue_prob > 0.0 && self.continue_prob <= 1.0 {
            Ok(())
        } else {
            Err(RenderError::InvalidConfig(format!(
                "{} continuation probability must be in (0, 1], got {}",
                name, self.continue_prob
            )))
        }
    }

    /// Plays one round after bounce number `depth` (counted from one). Returns the survival
    /// probability the throughput must be divided by, or `None` if the path is terminated.
    pub fn survives(&self, depth: u32, sampler: &mut dyn Sampler) -> Option<Float> {
        if depth <= self.start_depth {
            return Some(1.0);
        }
        if sampler.get_1d() < self.continue_prob {
            Some(self.continue_prob)
        } else {
            None
        }
    }
}

/// Allowed range of the accumulated relative index of refraction along one path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EtaBounds {
    pub min: Float,
    pub max: Float,
}

impl Default for EtaBounds {
    fn default() -> Self {
        Self { min: 0.5, max: 2.0 }
    }
}

impl EtaBounds {
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.min > 0.0 && self.min <= 1.0 && self.max >= 1.0 {
            Ok(())
        } else {
            Err(RenderError::InvalidConfig(format!(
                "relative IOR bounds [{}, {}] must contain 1",
                self.min, self.max
            )))
        }
    }
}

/// Running product of the relative indices of refraction crossed by a path.
#[derive(Clone, Copy, Debug)]
pub struct RelativeIor {
    eta: Float,
    bounds: EtaBounds,
}

impl RelativeIor {
    pub fn new(bounds: EtaBounds) -> Self {
        Self { eta: 1.0, bounds }
    }

    pub fn eta(&self) -> Float {
        self.eta
    }

    /// Accumulates one scattering event. Returns false once the product has left the bounds,
    /// after which the path must be abandoned.
    pub fn scatter(&mut self, eta: Float) -> bool {
        self.eta *= eta;
        if self.eta < self.bounds.min || self.eta > self.bounds.max {
            tracing::warn!(eta = self.eta, "relative index of refraction out of range, terminating path");
            false
        } else {
            true
        }
    }
}

/// Next-event estimate at a surface point: one light sample, shadow-tested, without MIS.
pub fn sample_one_light(si: &SurfaceInteraction, scene: &Scene, sampler: &mut dyn Sampler) -> Spectrum {
    let bsdf = si.bsdf();
    let u = sampler.get_2d();
    if bsdf.is_delta() {
        return Spectrum::zero();
    }

    let (query, weighted_radiance) = match LuminaireQuery::sample(scene.luminaires(), si.p, u) {
        Some(sample) => sample,
        None => return Spectrum::zero(),
    };

    let f = bsdf.f(si.to_local(si.wo), si.to_local(query.d));
    let contribution = f * weighted_radiance * abs_dot(query.d, si.frame.n);
    if contribution.is_black() || scene.occluded(si.p, query.p) {
        return Spectrum::zero();
    }
    contribution
}

/// Counters reported after a render.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderStats {
    pub tiles_rendered: usize,
    pub tiles_skipped: usize,
    pub samples: usize,
}

/// Drives an `IntegratorRadiance` over the film, one rayon task per 16×16 tile.
pub struct SamplerIntegrator<R: IntegratorRadiance> {
    pub camera: Box<dyn Camera>,
    pub sampler: Box<dyn Sampler>,
    pub radiance: R,
    progress: Option<indicatif::ProgressBar>,
}

impl<R: IntegratorRadiance> SamplerIntegrator<R> {
    pub fn new(camera: Box<dyn Camera>, sampler: Box<dyn Sampler>, radiance: R) -> Self {
        Self { camera, sampler, radiance, progress: None }
    }

    /// Reports rendered pixels to the bar as tiles complete.
    pub fn with_progress(mut self, progress: indicatif::ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Renders into `film`. Tiles that have not started when `cancel` is raised are skipped;
    /// samples already in flight always complete.
    pub fn render(&mut self, scene: &Scene, film: &Film<BoxFilter>, cancel: &AtomicBool) -> Result<RenderStats, RenderError> {
        let span = tracing::info_span!("render", spp = self.sampler.samples_per_pixel());
        let _enter = span.enter();

        if self.sampler.samples_per_pixel() == 0 {
            return Err(RenderError::InvalidConfig("samples per pixel must be positive".to_string()));
        }
        self.radiance.preprocess(scene)?;

        let sample_bounds = film.sample_bounds();
        let tiles_rendered = AtomicUsize::new(0);
        let tiles_skipped = AtomicUsize::new(0);
        let samples = AtomicUsize::new(0);

        let camera = &self.camera;
        let sampler = &self.sampler;
        let radiance = &self.radiance;
        let progress = &self.progress;

        sample_bounds.iter_tiles(16).par_bridge().for_each(|tile| {
            if cancel.load(Ordering::Relaxed) {
                tiles_skipped.fetch_add(1, Ordering::Relaxed);
                return;
            }
            tracing::trace!(x = tile.min.x, y = tile.min.y, "starting tile");

            let mut arena = Bump::new();
            let mut tile_sampler = sampler.clone_with_seed(Self::tile_id(tile, sample_bounds));
            let mut film_tile = film.get_film_tile(tile);
            let mut n_samples = 0;

            for pixel in tile.iter_points() {
                tile_sampler.start_pixel(pixel);

                while tile_sampler.start_next_sample() {
                    let camera_sample = tile_sampler.get_camera_sample(pixel);
                    let (ray_weight, ray) = camera.generate_ray(camera_sample);

                    let mut l = Spectrum::zero();
                    if ray_weight > 0.0 {
                        l = radiance.incident_radiance(&ray, scene, tile_sampler.as_mut(), &arena);
                        l = check_radiance(l, pixel);
                    }

                    film.add_sample_to_tile(&mut film_tile, camera_sample.p_film, l, ray_weight);
                    arena.reset();
                    n_samples += 1;
                }
            }

            film.merge_film_tile(film_tile);
            tiles_rendered.fetch_add(1, Ordering::Relaxed);
            samples.fetch_add(n_samples, Ordering::Relaxed);
            if let Some(bar) = progress {
                bar.inc(tile.area() as u64);
            }
        });

        let stats = RenderStats {
            tiles_rendered: tiles_rendered.into_inner(),
            tiles_skipped: tiles_skipped.into_inner(),
            samples: samples.into_inner(),
        };
        tracing::info!(?stats, "render finished");
        Ok(stats)
    }

    pub fn render_with_pool(
        &mut self,
        scene: &Scene,
        film: &Film<BoxFilter>,
        cancel: &AtomicBool,
        pool: &rayon::ThreadPool,
    ) -> Result<RenderStats, RenderError> {
        pool.install(|| self.render(scene, film, cancel))
    }

    fn tile_id(tile: Bounds2i, sample_bounds: Bounds2i) -> u64 {
        let n_cols = sample_bounds.max.x;
        (tile.min.y * n_cols + tile.min.x) as u64
    }
}

/// NaN or infinite samples would poison the whole pixel, so they are logged and dropped.
fn check_radiance(l: Spectrum, pixel: Point2i) -> Spectrum {
    if l.has_nans() || !l.is_finite() {
        tracing::error!(x = pixel.x, y = pixel.y, ?l, "invalid radiance value, discarding sample");
        Spectrum::zero()
    } else {
        l
    }
}

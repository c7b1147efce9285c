use std::sync::atomic::AtomicBool;

use anyhow::Context;
use clap::{ArgEnum, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use bdpt::camera::PerspectiveCamera;
use bdpt::film::Film;
use bdpt::filter::BoxFilter;
use bdpt::integrator::{
    BidirConfig, BidirIntegrator, DepthConfig, DepthIntegrator, DirectLightingIntegrator, DirectStrategy,
    IntegratorRadiance, PathConfig, PathIntegrator, RenderStats, RussianRoulette, SamplerIntegrator,
};
use bdpt::sampler::random::RandomSampler;
use bdpt::scene::{presets, Scene};
use bdpt::spectrum::Spectrum;
use bdpt::{Float, Point2i};

#[derive(ArgEnum, Clone, Copy, Debug)]
enum IntegratorKind {
    Bidir,
    Path,
    DirectHemisphere,
    DirectBsdf,
    DirectLight,
    Depth,
}

#[derive(ArgEnum, Clone, Copy, Debug)]
enum SceneKind {
    Cornell,
    Furnace,
}

/// Renders one of the built-in scenes and reports image statistics.
#[derive(Parser, Debug)]
#[clap(name = "render")]
struct Args {
    #[clap(long, arg_enum, default_value = "bidir")]
    integrator: IntegratorKind,

    #[clap(long, arg_enum, default_value = "cornell")]
    scene: SceneKind,

    #[clap(long, default_value_t = 256)]
    width: i32,

    #[clap(long, default_value_t = 256)]
    height: i32,

    #[clap(long, default_value_t = 16)]
    spp: usize,

    #[clap(long, default_value_t = 1)]
    seed: u64,

    /// Worker threads, one per core if omitted.
    #[clap(long)]
    threads: Option<usize>,

    /// Eye sub-path continuation probability.
    #[clap(long, default_value_t = 0.8)]
    eye_rr: Float,

    /// Light sub-path continuation probability.
    #[clap(long, default_value_t = 0.9)]
    light_rr: Float,

    /// Number of free eye bounces before roulette starts.
    #[clap(long, default_value_t = 2)]
    rr_start: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    tracing::debug!(?args, "parsed arguments");

    let resolution = Point2i::new(args.width, args.height);
    let (scene, camera) = match args.scene {
        SceneKind::Cornell => (presets::cornell_box()?, presets::cornell_box_camera(resolution)),
        SceneKind::Furnace => (
            presets::furnace(0.5, 1.0)?,
            PerspectiveCamera::look_at(
                bdpt::point3f!(0, 0, 0),
                bdpt::point3f!(0, 0, -1),
                bdpt::vec3f!(0, 1, 0),
                60.0,
                resolution,
            ),
        ),
    };

    let eye_roulette = RussianRoulette::new(args.rr_start, args.eye_rr);
    let stats_and_image = match args.integrator {
        IntegratorKind::Bidir => {
            let config = BidirConfig {
                eye_roulette,
                light_roulette: RussianRoulette::new(0, args.light_rr),
                ..BidirConfig::default()
            };
            run(&args, &scene, camera, BidirIntegrator::new(config))
        }
        IntegratorKind::Path => {
            let config = PathConfig { roulette: eye_roulette, ..PathConfig::default() };
            run(&args, &scene, camera, PathIntegrator::new(config))
        }
        IntegratorKind::DirectHemisphere => {
            run(&args, &scene, camera, DirectLightingIntegrator::new(DirectStrategy::Hemisphere))
        }
        IntegratorKind::DirectBsdf => run(&args, &scene, camera, DirectLightingIntegrator::new(DirectStrategy::Bsdf)),
        IntegratorKind::DirectLight => run(&args, &scene, camera, DirectLightingIntegrator::new(DirectStrategy::Light)),
        IntegratorKind::Depth => run(&args, &scene, camera, DepthIntegrator::new(DepthConfig::default())),
    };
    let (stats, image) = stats_and_image?;

    let n = image.len() as Float;
    let mean = image.iter().fold(Spectrum::zero(), |acc, &l| acc + l) / n;
    let peak = image.iter().map(|l| l.max_component_value()).fold(0.0, Float::max);
    println!(
        "{} tiles, {} samples, mean radiance {:?}, peak {:.4}",
        stats.tiles_rendered, stats.samples, mean, peak
    );
    Ok(())
}

fn run<R: IntegratorRadiance>(
    args: &Args,
    scene: &Scene,
    camera: PerspectiveCamera,
    radiance: R,
) -> anyhow::Result<(RenderStats, Vec<Spectrum>)> {
    let film = Film::new(camera.resolution(), BoxFilter::default())?;
    let sampler = RandomSampler::new_with_seed(args.spp, args.seed);

    let progress = ProgressBar::new(film.sample_bounds().area() as u64);
    progress.set_style(ProgressStyle::default_bar().template("{elapsed_precise} [{bar:40}] {pos}/{len} px ({eta})"));

    let mut integrator = SamplerIntegrator::new(Box::new(camera), Box::new(sampler), radiance)
        .with_progress(progress.clone());

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = args.threads {
        pool = pool.num_threads(threads);
    }
    let pool = pool.build().context("failed to start worker threads")?;

    let cancel = AtomicBool::new(false);
    let stats = integrator.render_with_pool(scene, &film, &cancel, &pool)?;
    progress.finish();

    Ok((stats, film.into_spectrum_buffer()))
}

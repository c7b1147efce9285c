use std::sync::Arc;

use approx::assert_abs_diff_eq;
use bumpalo::Bump;
use cgmath::InnerSpace;

use bdpt::integrator::{
    BidirConfig, BidirIntegrator, IntegratorRadiance, PathConfig, PathIntegrator, RussianRoulette,
};
use bdpt::reflection::Bsdf;
use bdpt::sampler::random::RandomSampler;
use bdpt::scene::{presets, Scene};
use bdpt::shapes::{Sphere, TriangleMesh};
use bdpt::spectrum::Spectrum;
use bdpt::{point3f, vec3f, Float, Ray};

/// Monte Carlo estimate of the radiance along one ray, with the standard error of the mean.
struct Estimate {
    mean: Spectrum,
    std_error: Spectrum,
}

fn estimate_radiance<R: IntegratorRadiance>(
    mut radiance: R,
    scene: &Scene,
    ray: &Ray,
    n: usize,
    seed: u64,
) -> anyhow::Result<Estimate> {
    radiance.preprocess(scene)?;
    let mut sampler = RandomSampler::new_with_seed(1, seed);
    let mut arena = Bump::new();
    let mut sum = Spectrum::zero();
    let mut sum_sq = Spectrum::zero();
    for _ in 0..n {
        let l = radiance.incident_radiance(ray, scene, &mut sampler, &arena);
        assert!(l.is_non_negative() && l.is_finite());
        sum += l;
        sum_sq += l * l;
        arena.reset();
    }
    let n = n as Float;
    let mean = sum / n;
    let variance = (sum_sq / n - mean * mean).clamp_positive();
    Ok(Estimate { mean, std_error: (variance / n).sqrt() })
}

fn mean_radiance<R: IntegratorRadiance>(
    radiance: R,
    scene: &Scene,
    ray: &Ray,
    n: usize,
    seed: u64,
) -> anyhow::Result<Spectrum> {
    Ok(estimate_radiance(radiance, scene, ray, n, seed)?.mean)
}

/// White diffuse box with a small ceiling light and nothing inside, open towards +z.
fn diffuse_box() -> anyhow::Result<Scene> {
    let white = Bsdf::diffuse(Spectrum::uniform(0.7));
    let scene = Scene::builder()
        .add_primitive(Arc::new(TriangleMesh::quad(point3f!(-1, -1, -1), vec3f!(0, 0, 2), vec3f!(2, 0, 0))), white.clone())
        .add_primitive(Arc::new(TriangleMesh::quad(point3f!(-1, 1, -1), vec3f!(2, 0, 0), vec3f!(0, 0, 2))), white.clone())
        .add_primitive(Arc::new(TriangleMesh::quad(point3f!(-1, -1, -1), vec3f!(2, 0, 0), vec3f!(0, 2, 0))), white.clone())
        .add_primitive(Arc::new(TriangleMesh::quad(point3f!(-1, -1, -1), vec3f!(0, 2, 0), vec3f!(0, 0, 2))), white.clone())
        .add_primitive(Arc::new(TriangleMesh::quad(point3f!(1, -1, -1), vec3f!(0, 0, 2), vec3f!(0, 2, 0))), white)
        .add_area_light(
            Arc::new(TriangleMesh::quad(point3f!(-0.25, 0.98, -0.25), vec3f!(0.5, 0, 0), vec3f!(0, 0, 0.5))),
            Spectrum::uniform(15.0),
            Bsdf::black(),
        )
        .build()?;
    Ok(scene)
}

#[test]
fn sphere_light_over_floor_matches_closed_form() -> anyhow::Result<()> {
    let (radius, height, albedo, le) = (0.5, 3.0, 0.5, 10.0);
    let scene = presets::sphere_over_floor(radius, height, albedo, le)?;
    let ray = Ray::new(point3f!(0, 0.5, 0), vec3f!(0, -1, 0));
    let expected = albedo * le * (radius / height) * (radius / height);

    let path = mean_radiance(PathIntegrator::new(PathConfig::default()), &scene, &ray, 20_000, 1)?;
    assert_abs_diff_eq!(path[0], expected, epsilon = 0.005);

    // light sub-paths only reach the floor edge-on, so the connection strategies add nothing
    let bidir = mean_radiance(BidirIntegrator::new(BidirConfig::default()), &scene, &ray, 20_000, 2)?;
    assert_abs_diff_eq!(bidir[0], expected, epsilon = 0.005);
    Ok(())
}

#[test]
fn bidir_agrees_with_path_tracing() -> anyhow::Result<()> {
    let scene = diffuse_box()?;
    let ray = Ray::new(point3f!(0, 0, 0.9), vec3f!(0.2, -0.3, -1).normalize());

    let path = mean_radiance(PathIntegrator::new(PathConfig::default()), &scene, &ray, 30_000, 3)?;
    let bidir = mean_radiance(BidirIntegrator::new(BidirConfig::default()), &scene, &ray, 30_000, 4)?;

    assert!(path[0] > 0.0);
    let relative = (bidir[0] - path[0]).abs() / path[0];
    assert!(relative < 0.06, "path {:?} bidir {:?}", path, bidir);
    Ok(())
}

#[test]
fn relative_ior_guard_kills_strong_refraction() -> anyhow::Result<()> {
    // Glass of index 3 reflects a quarter at normal incidence. The refracted path leaves the
    // allowed eta range and is terminated, so only the reflected sky remains.
    let scene = Scene::builder()
        .add_primitive(Arc::new(Sphere::new(point3f!(0, 0, 0), 1.0)), Bsdf::dielectric(3.0))
        .add_area_light(Arc::new(Sphere::new(point3f!(10, 10, 10), 0.1)), Spectrum::zero(), Bsdf::black())
        .environment(Spectrum::uniform(1.0))
        .build()?;
    let ray = Ray::new(point3f!(0, 0, 5), vec3f!(0, 0, -1));

    let path = mean_radiance(PathIntegrator::new(PathConfig::default()), &scene, &ray, 10_000, 5)?;
    assert_abs_diff_eq!(path[0], 0.25, epsilon = 0.03);

    let bidir = mean_radiance(BidirIntegrator::new(BidirConfig::default()), &scene, &ray, 10_000, 6)?;
    assert_abs_diff_eq!(bidir[0], 0.25, epsilon = 0.03);
    Ok(())
}

#[test]
fn cornell_box_radiance_is_valid() -> anyhow::Result<()> {
    let scene = presets::cornell_box()?;
    for (i, dir) in [vec3f!(0, 0, -1), vec3f!(-0.1, -0.15, -1), vec3f!(0.1, -0.15, -1), vec3f!(0, 0.2, -1)]
        .iter()
        .enumerate()
    {
        let ray = Ray::new(point3f!(0, 0, 3.8), dir.normalize());
        // mean_radiance checks every sample for negative or non-finite values
        mean_radiance(PathIntegrator::new(PathConfig::default()), &scene, &ray, 500, i as u64)?;
        mean_radiance(BidirIntegrator::new(BidirConfig::default()), &scene, &ray, 500, 100 + i as u64)?;
    }
    Ok(())
}

#[test]
fn bidir_agrees_with_path_tracing_through_glass_and_mirror() -> anyhow::Result<()> {
    let scene = presets::cornell_box()?;
    let eye = point3f!(0, 0, 3.8);
    let targets = [
        // glass sphere centre
        (point3f!(0.45, -0.6, 0.3), 100_000),
        // floor in the glass sphere's shadow, lit only through it
        (point3f!(0.45, -1, 0.75), 200_000),
        // mirror sphere
        (point3f!(-0.45, -0.6, -0.3), 100_000),
        // red wall
        (point3f!(-1, 0.2, -0.2), 100_000),
    ];

    for (i, &(target, n)) in targets.iter().enumerate() {
        let ray = Ray::new(eye, (target - eye).normalize());
        let seed = 10 * i as u64;
        let path = estimate_radiance(PathIntegrator::new(PathConfig::default()), &scene, &ray, n, seed)?;
        let bidir = estimate_radiance(BidirIntegrator::new(BidirConfig::default()), &scene, &ray, n, seed + 1)?;

        assert!(path.mean[0] > 0.0);
        let diff = (bidir.mean[0] - path.mean[0]).abs();
        let sigma = (path.std_error[0] * path.std_error[0] + bidir.std_error[0] * bidir.std_error[0]).sqrt();
        assert!(
            diff < 5.0 * sigma,
            "target {:?}: path {} ± {}, bidir {} ± {}",
            target, path.mean[0], path.std_error[0], bidir.mean[0], bidir.std_error[0]
        );
    }
    Ok(())
}

/// Two 45° mirrors forming a periscope: a ray travelling along -z comes back out along +z
/// after exactly two reflections and sees a white sky.
fn periscope(reflectance: Float) -> anyhow::Result<Scene> {
    let mirror = Bsdf::mirror(Spectrum::uniform(reflectance));
    let scene = Scene::builder()
        .add_primitive(Arc::new(TriangleMesh::quad(point3f!(-1, 0.5, -0.5), vec3f!(0, -1, 1), vec3f!(2, 0, 0))), mirror.clone())
        .add_primitive(Arc::new(TriangleMesh::quad(point3f!(-1, 1.5, -0.5), vec3f!(2, 0, 0), vec3f!(0, 1, 1))), mirror)
        .add_area_light(Arc::new(Sphere::new(point3f!(10, -10, 10), 0.1)), Spectrum::zero(), Bsdf::black())
        .environment(Spectrum::uniform(1.0))
        .build()?;
    Ok(scene)
}

#[test]
fn roulette_on_mirror_path_is_unbiased() -> anyhow::Result<()> {
    let scene = periscope(0.9)?;
    let ray = Ray::new(point3f!(0.1, 0, 5), vec3f!(0, 0, -1));
    let expected = 0.9 * 0.9;

    // without roulette every sample is exact
    let no_rr = PathConfig { roulette: RussianRoulette::new(0, 1.0), ..PathConfig::default() };
    let exact = mean_radiance(PathIntegrator::new(no_rr), &scene, &ray, 100, 7)?;
    assert_abs_diff_eq!(exact[0], expected, epsilon = 1e-5);

    // roulette after both bounces keeps a path with probability 0.49
    let roulette = RussianRoulette::new(0, 0.7);
    let path = mean_radiance(PathIntegrator::new(PathConfig { roulette, ..PathConfig::default() }), &scene, &ray, 20_000, 8)?;
    assert_abs_diff_eq!(path[0], expected, epsilon = 0.03);

    let config = BidirConfig { eye_roulette: roulette, ..BidirConfig::default() };
    let bidir = mean_radiance(BidirIntegrator::new(config), &scene, &ray, 20_000, 9)?;
    assert_abs_diff_eq!(bidir[0], expected, epsilon = 0.03);
    Ok(())
}

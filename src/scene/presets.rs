//! Programmatic scenes for the renderer binary, the benchmark and the tests.

use std::sync::Arc;

use crate::camera::PerspectiveCamera;
use crate::error::RenderError;
use crate::reflection::bsdf::Bsdf;
use crate::scene::Scene;
use crate::shapes::{Sphere, TriangleMesh};
use crate::spectrum::Spectrum;
use crate::{Float, Point2i};

/// Closed box spanning `[-1, 1]³` with a small ceiling light, a mirror sphere and a glass
/// sphere. The open side faces +z.
pub fn cornell_box() -> Result<Scene, RenderError> {
    let white = Bsdf::diffuse(Spectrum::uniform(0.75));
    let red = Bsdf::diffuse(Spectrum::rgb(0.75, 0.25, 0.25));
    let green = Bsdf::diffuse(Spectrum::rgb(0.25, 0.75, 0.25));

    Scene::builder()
        // floor, ceiling, back
        .add_primitive(Arc::new(TriangleMesh::quad(point3f!(-1, -1, -1), vec3f!(0, 0, 2), vec3f!(2, 0, 0))), white.clone())
        .add_primitive(Arc::new(TriangleMesh::quad(point3f!(-1, 1, -1), vec3f!(2, 0, 0), vec3f!(0, 0, 2))), white.clone())
        .add_primitive(Arc::new(TriangleMesh::quad(point3f!(-1, -1, -1), vec3f!(2, 0, 0), vec3f!(0, 2, 0))), white)
        // left, right
        .add_primitive(Arc::new(TriangleMesh::quad(point3f!(-1, -1, -1), vec3f!(0, 2, 0), vec3f!(0, 0, 2))), red)
        .add_primitive(Arc::new(TriangleMesh::quad(point3f!(1, -1, -1), vec3f!(0, 0, 2), vec3f!(0, 2, 0))), green)
        .add_primitive(Arc::new(Sphere::new(point3f!(-0.45, -0.6, -0.3), 0.4)), Bsdf::mirror(Spectrum::uniform(0.95)))
        .add_primitive(Arc::new(Sphere::new(point3f!(0.45, -0.6, 0.3), 0.4)), Bsdf::dielectric(1.5))
        .add_area_light(
            Arc::new(TriangleMesh::quad(point3f!(-0.25, 0.98, -0.25), vec3f!(0.5, 0, 0), vec3f!(0, 0, 0.5))),
            Spectrum::uniform(15.0),
            Bsdf::black(),
        )
        .build()
}

pub fn cornell_box_camera(resolution: Point2i) -> PerspectiveCamera {
    PerspectiveCamera::look_at(point3f!(0, 0, 3.8), point3f!(0, 0, 0), vec3f!(0, 1, 0), 40.0, resolution)
}

/// Inward-facing unit sphere that both emits `emission` and scatters with a diffuse `albedo`.
/// Seen from the inside, the radiance everywhere is `emission / (1 - albedo)`.
pub fn furnace(albedo: Float, emission: Float) -> Result<Scene, RenderError> {
    Scene::builder()
        .add_area_light(
            Arc::new(Sphere::inward_facing(point3f!(0, 0, 0), 1.0)),
            Spectrum::uniform(emission),
            Bsdf::diffuse(Spectrum::uniform(albedo)),
        )
        .build()
}

/// Diffuse floor on the `y = 0` plane under a black spherical light of radius `radius`
/// centred at height `height`. The point directly below the light reflects
/// `albedo · radiance · (radius / height)²`.
pub fn sphere_over_floor(radius: Float, height: Float, albedo: Float, radiance: Float) -> Result<Scene, RenderError> {
    Scene::builder()
        .add_primitive(
            Arc::new(TriangleMesh::quad(point3f!(-50, 0, -50), vec3f!(0, 0, 100), vec3f!(100, 0, 0))),
            Bsdf::diffuse(Spectrum::uniform(albedo)),
        )
        .add_area_light(
            Arc::new(Sphere::new(point3f!(0, height, 0), radius)),
            Spectrum::uniform(radiance),
            Bsdf::black(),
        )
        .build()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn presets_build() {
        let cornell = cornell_box().unwrap();
        assert_eq!(cornell.luminaires().len(), 1);
        assert_eq!(cornell.primitives().len(), 8);
        assert!(cornell.environment().is_none());

        assert_eq!(furnace(0.5, 1.0).unwrap().luminaires().len(), 1);
        assert_eq!(sphere_over_floor(0.5, 3.0, 0.5, 10.0).unwrap().primitives().len(), 2);
    }
}

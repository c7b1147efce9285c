use std::sync::Arc;

use crate::error::RenderError;
use crate::interaction::SurfaceInteraction;
use crate::light::{DiffuseAreaLight, Luminaire, UniformEnvironment};
use crate::primitive::Primitive;
use crate::reflection::bsdf::Bsdf;
use crate::shapes::Shape;
use crate::spectrum::Spectrum;
use crate::{Bounds3f, Point3f, Ray};

pub mod presets;

/// Immutable scene shared read-only by every render thread.
pub struct Scene {
    primitives: Vec<Primitive>,
    luminaires: Vec<Luminaire>,
    environment: Option<UniformEnvironment>,
    bounds: Bounds3f,
}

impl Scene {
    pub fn builder() -> SceneBuilder {
        SceneBuilder::default()
    }

    /// Nearest hit along the ray. Linear scan; shapes cull against their own bounds.
    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceInteraction<'_>> {
        if !self.bounds.intersect_p(ray) {
            return None;
        }
        let mut ray = *ray;
        let mut closest = None;
        for prim in &self.primitives {
            if let Some(hit) = prim.shape.intersect(&ray) {
                ray = ray.clipped(hit.t);
                closest = Some((hit, prim));
            }
        }
        closest.map(|(hit, prim)| SurfaceInteraction::new(hit, &ray, prim))
    }

    pub fn intersect_test(&self, ray: &Ray) -> bool {
        self.bounds.intersect_p(ray)
            && self.primitives.iter().any(|prim| prim.shape.intersect_test(ray))
    }

    /// True if anything blocks the open segment between the two points.
    pub fn occluded(&self, p0: Point3f, p1: Point3f) -> bool {
        self.intersect_test(&Ray::segment(p0, p1))
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Luminaires that can be position-sampled, in the order they were added.
    pub fn luminaires(&self) -> &[Luminaire] {
        &self.luminaires
    }

    pub fn environment(&self) -> Option<&UniformEnvironment> {
        self.environment.as_ref()
    }

    /// Radiance carried by a ray that leaves the scene.
    pub fn environment_radiance(&self) -> Spectrum {
        self.environment.map_or(Spectrum::zero(), |env| env.radiance)
    }

    /// Radiance emitted from the hit point back along the incoming ray.
    pub fn emitted_radiance(&self, si: &SurfaceInteraction) -> Spectrum {
        match si.luminaire() {
            Some(index) => self.luminaires[index].emitted_radiance(si.n, si.wo),
            None => Spectrum::zero(),
        }
    }

    /// Union of every primitive's bounds; rays that miss it skip the scan entirely.
    pub fn world_bound(&self) -> Bounds3f {
        self.bounds
    }
}

#[derive(Default)]
pub struct SceneBuilder {
    primitives: Vec<Primitive>,
    luminaires: Vec<Luminaire>,
    environment: Option<UniformEnvironment>,
    duplicate_environment: bool,
}

impl SceneBuilder {
    pub fn add_primitive(mut self, shape: Arc<dyn Shape>, bsdf: Bsdf) -> Self {
        self.primitives.push(Primitive { shape, bsdf, luminaire: None });
        self
    }

    /// Adds a shape that emits `radiance` from its front side and scatters with `bsdf`.
    pub fn add_area_light(mut self, shape: Arc<dyn Shape>, radiance: Spectrum, bsdf: Bsdf) -> Self {
        let index = self.luminaires.len();
        self.luminaires.push(Luminaire::Area(DiffuseAreaLight::new(shape.clone(), radiance)));
        self.primitives.push(Primitive { shape, bsdf, luminaire: Some(index) });
        self
    }

    pub fn environment(mut self, radiance: Spectrum) -> Self {
        if self.environment.is_some() {
            self.duplicate_environment = true;
        }
        self.environment = Some(UniformEnvironment::new(radiance));
        self
    }

    pub fn build(self) -> Result<Scene, RenderError> {
        if self.duplicate_environment {
            return Err(RenderError::DuplicateEnvironment);
        }
        let bounds = self
            .primitives
            .iter()
            .fold(Bounds3f::empty(), |b, prim| b.union(&prim.world_bound()));

        tracing::debug!(
            primitives = self.primitives.len(),
            luminaires = self.luminaires.len(),
            environment = self.environment.is_some(),
            "built scene"
        );

        Ok(Scene {
            primitives: self.primitives,
            luminaires: self.luminaires,
            environment: self.environment,
            bounds,
        })
    }
}

use std::sync::Arc;

use cgmath::InnerSpace;

use crate::shapes::Shape;
use crate::spectrum::Spectrum;
use crate::Vec3f;

/// Emits constant radiance from the front side of a shape.
pub struct DiffuseAreaLight {
    pub shape: Arc<dyn Shape>,
    pub radiance: Spectrum,
}

impl DiffuseAreaLight {
    pub fn new(shape: Arc<dyn Shape>, radiance: Spectrum) -> Self {
        Self { shape, radiance }
    }

    pub fn emitted_radiance(&self, n: Vec3f, w: Vec3f) -> Spectrum {
        if n.dot(w) > 0.0 {
            self.radiance
        } else {
            Spectrum::zero()
        }
    }
}

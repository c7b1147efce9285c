use std::sync::Arc;

use crate::geometry::bounds::Bounds3f;
use crate::reflection::bsdf::Bsdf;
use crate::shapes::Shape;

/// A shape with the material it scatters with and, if it emits, the index of its luminaire in
/// the scene's luminaire list.
pub struct Primitive {
    pub shape: Arc<dyn Shape>,
    pub bsdf: Bsdf,
    pub luminaire: Option<usize>,
}

impl Primitive {
    pub fn world_bound(&self) -> Bounds3f {
        self.shape.world_bound()
    }
}

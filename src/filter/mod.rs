use crate::{Float, Point2f, Vec2f};

/// Pixel reconstruction filter, evaluated at an offset from the pixel centre.
pub trait Filter: Sync + Send {
    fn evaluate(&self, p: Point2f) -> Float;

    fn radius(&self) -> Vec2f;
}

pub struct BoxFilter {
    pub radius: Vec2f,
}

impl Default for BoxFilter {
    /// Covers exactly one pixel.
    fn default() -> Self {
        Self { radius: Vec2f::new(0.5, 0.5) }
    }
}

impl Filter for BoxFilter {
    fn evaluate(&self, _p: Point2f) -> Float {
        1.0
    }

    fn radius(&self) -> Vec2f {
        self.radius
    }
}

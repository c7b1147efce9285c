use cgmath::EuclideanSpace;

use crate::camera::CameraSample;
use crate::{Float, Point2f, Point2i};

pub mod random;

/// Source of uniform samples in `[0, 1)`. Each render tile owns its own sampler, cloned with a
/// tile-specific seed, so successive draws within one radiance estimate are independent.
pub trait Sampler: Sync + Send {
    fn start_pixel(&mut self, pixel: Point2i);

    fn start_next_sample(&mut self) -> bool;

    fn get_1d(&mut self) -> Float;

    fn get_2d(&mut self) -> Point2f;

    fn clone_with_seed(&self, seed: u64) -> Box<dyn Sampler>;

    fn samples_per_pixel(&self) -> usize;

    fn get_camera_sample(&mut self, p_raster: Point2i) -> CameraSample {
        let p_film = Point2f::new(p_raster.x as Float, p_raster.y as Float) + self.get_2d().to_vec();
        CameraSample { p_film }
    }
}

/// Per-pixel bookkeeping shared by sampler implementations.
#[derive(Clone, Debug)]
pub struct SamplerState {
    pub samples_per_pixel: usize,
    pub current_pixel: Point2i,
    pub current_pixel_sample_index: usize,
}

impl SamplerState {
    pub fn new(samples_per_pixel: usize) -> Self {
        Self {
            samples_per_pixel,
            current_pixel: Point2i::new(0, 0),
            current_pixel_sample_index: 0,
        }
    }

    pub fn start_pixel(&mut self, pixel: Point2i) {
        self.current_pixel = pixel;
        self.current_pixel_sample_index = 0;
    }

    /// Returns false once every sample of the current pixel has been started.
    pub fn start_next_sample(&mut self) -> bool {
        if self.current_pixel_sample_index >= self.samples_per_pixel {
            return false;
        }
        self.current_pixel_sample_index += 1;
        true
    }
}

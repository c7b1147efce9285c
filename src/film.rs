use parking_lot::Mutex;

use crate::error::RenderError;
use crate::filter::Filter;
use crate::spectrum::Spectrum;
use crate::{Bounds2i, Float, Point2f, Point2i};

#[derive(Clone, Copy, Default)]
struct Pixel {
    contrib_sum: Spectrum,
    filter_weight_sum: Float,
}

/// Accumulates filtered radiance samples. Tiles are filled without locking and merged under
/// the film's mutex.
pub struct Film<F: Filter> {
    resolution: Point2i,
    filter: F,
    pixels: Mutex<Vec<Pixel>>,
}

pub struct FilmTile {
    pixel_bounds: Bounds2i,
    pixels: Vec<Pixel>,
}

impl<F: Filter> Film<F> {
    pub fn new(resolution: Point2i, filter: F) -> Result<Self, RenderError> {
        if resolution.x <= 0 || resolution.y <= 0 {
            return Err(RenderError::InvalidConfig(format!(
                "film resolution must be positive, got {}x{}",
                resolution.x, resolution.y
            )));
        }
        let n_pixels = (resolution.x * resolution.y) as usize;
        Ok(Self {
            resolution,
            filter,
            pixels: Mutex::new(vec![Pixel::default(); n_pixels]),
        })
    }

    pub fn resolution(&self) -> Point2i {
        self.resolution
    }

    pub fn pixel_bounds(&self) -> Bounds2i {
        Bounds2i::with_bounds(Point2i::new(0, 0), self.resolution)
    }

    /// The range of pixels that must be sampled. This is larger than the image when the filter
    /// is wider than a pixel so that edge pixels receive as many samples as interior ones.
    pub fn sample_bounds(&self) -> Bounds2i {
        let r = self.filter.radius();
        let low_x = (0.5 - r.x).floor() as i32;
        let low_y = (0.5 - r.y).floor() as i32;
        let high_x = (self.resolution.x as Float - 0.5 + r.x).ceil() as i32;
        let high_y = (self.resolution.y as Float - 0.5 + r.y).ceil() as i32;
        Bounds2i::with_bounds(Point2i::new(low_x, low_y), Point2i::new(high_x, high_y))
    }

    /// A tile covering every image pixel that samples taken in `sample_bounds` can reach.
    pub fn get_film_tile(&self, sample_bounds: Bounds2i) -> FilmTile {
        let r = self.filter.radius();
        let p0 = Point2i::new(
            (sample_bounds.min.x as Float - 0.5 - r.x).ceil() as i32,
            (sample_bounds.min.y as Float - 0.5 - r.y).ceil() as i32,
        );
        let p1 = Point2i::new(
            (sample_bounds.max.x as Float - 0.5 + r.x).floor() as i32 + 1,
            (sample_bounds.max.y as Float - 0.5 + r.y).floor() as i32 + 1,
        );
        let pixel_bounds = Bounds2i::with_bounds(p0, p1).intersection(&self.pixel_bounds());
        FilmTile {
            pixel_bounds,
            pixels: vec![Pixel::default(); pixel_bounds.area().max(0) as usize],
        }
    }

    pub fn add_sample_to_tile(&self, tile: &mut FilmTile, p_film: Point2f, radiance: Spectrum, sample_weight: Float) {
        let r = self.filter.radius();
        let p_discrete = Point2f::new(p_film.x - 0.5, p_film.y - 0.5);
        let x0 = ((p_discrete.x - r.x).ceil() as i32).max(tile.pixel_bounds.min.x);
        let y0 = ((p_discrete.y - r.y).ceil() as i32).max(tile.pixel_bounds.min.y);
        let x1 = ((p_discrete.x + r.x).floor() as i32 + 1).min(tile.pixel_bounds.max.x);
        let y1 = ((p_discrete.y + r.y).floor() as i32 + 1).min(tile.pixel_bounds.max.y);

        for y in y0..y1 {
            for x in x0..x1 {
                let offset = Point2f::new(x as Float - p_discrete.x, y as Float - p_discrete.y);
                let filter_weight = self.filter.evaluate(offset);
                let pixel = tile.get_pixel_mut(Point2i::new(x, y));
                pixel.contrib_sum += radiance * (sample_weight * filter_weight);
                pixel.filter_weight_sum += filter_weight;
            }
        }
    }

    pub fn merge_film_tile(&self, tile: FilmTile) {
        let width = self.resolution.x;
        let mut pixels = self.pixels.lock();
        for (p, tile_pixel) in tile.pixel_bounds.iter_points().zip(tile.pixels.iter()) {
            let pixel = &mut pixels[(p.y * width + p.x) as usize];
            pixel.contrib_sum += tile_pixel.contrib_sum;
            pixel.filter_weight_sum += tile_pixel.filter_weight_sum;
        }
    }

    /// Final pixel values in row-major order. Pixels that received no samples are black.
    pub fn into_spectrum_buffer(self) -> Vec<Spectrum> {
        self.pixels
            .into_inner()
            .into_iter()
            .map(|p| {
                if p.filter_weight_sum > 0.0 {
                    p.contrib_sum / p.filter_weight_sum
                } else {
                    Spectrum::zero()
                }
            })
            .collect()
    }
}

impl FilmTile {
    pub fn pixel_bounds(&self) -> Bounds2i {
        self.pixel_bounds
    }

    fn get_pixel_mut(&mut self, p: Point2i) -> &mut Pixel {
        let width = self.pixel_bounds.width();
        let offset = (p.x - self.pixel_bounds.min.x) + (p.y - self.pixel_bounds.min.y) * width;
        &mut self.pixels[offset as usize]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::filter::BoxFilter;
    use approx::assert_abs_diff_eq;

    #[test]
    fn box_filter_averages_samples_per_pixel() {
        let film = Film::new(Point2i::new(4, 2), BoxFilter::default()).unwrap();
        assert_eq!(film.sample_bounds(), film.pixel_bounds());

        let mut tile = film.get_film_tile(Bounds2i::with_bounds(Point2i::new(0, 0), Point2i::new(2, 2)));
        film.add_sample_to_tile(&mut tile, point2f!(1.25, 0.5), Spectrum::uniform(1.0), 1.0);
        film.add_sample_to_tile(&mut tile, point2f!(1.75, 0.5), Spectrum::uniform(3.0), 1.0);
        film.merge_film_tile(tile);

        let buffer = film.into_spectrum_buffer();
        assert_eq!(buffer.len(), 8);
        assert_abs_diff_eq!(buffer[1][0], 2.0, epsilon = 1e-6);
        assert!(buffer[0].is_black());
    }

    #[test]
    fn rejects_empty_resolution() {
        assert!(Film::new(Point2i::new(0, 8), BoxFilter::default()).is_err());
    }
}

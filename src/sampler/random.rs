use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

use crate::sampler::{Sampler, SamplerState};
use crate::{Float, Point2f, Point2i, ONE_MINUS_EPSILON};

/// Independent uniform random samples from a xoshiro256+ stream.
#[derive(Clone)]
pub struct RandomSampler {
    rng: Xoshiro256Plus,
    state: SamplerState,
}

impl RandomSampler {
    pub fn new_with_seed(samples_per_pixel: usize, seed: u64) -> Self {
        Self {
            rng: Xoshiro256Plus::seed_from_u64(seed),
            state: SamplerState::new(samples_per_pixel),
        }
    }

    fn next(&mut self) -> Float {
        let u: Float = self.rng.gen();
        u.min(ONE_MINUS_EPSILON)
    }
}

impl Sampler for RandomSampler {
    fn start_pixel(&mut self, pixel: Point2i) {
        self.state.start_pixel(pixel);
    }

    fn start_next_sample(&mut self) -> bool {
        self.state.start_next_sample()
    }

    fn get_1d(&mut self) -> Float {
        self.next()
    }

    fn get_2d(&mut self) -> Point2f {
        let x = self.next();
        let y = self.next();
        Point2f::new(x, y)
    }

    fn clone_with_seed(&self, seed: u64) -> Box<dyn Sampler> {
        Box::new(Self {
            rng: Xoshiro256Plus::seed_from_u64(seed),
            state: self.state.clone(),
        })
    }

    fn samples_per_pixel(&self) -> usize {
        self.state.samples_per_pixel
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn draws_are_in_unit_interval() {
        let mut sampler = RandomSampler::new_with_seed(4, 0);
        for _ in 0..10_000 {
            let u = sampler.get_1d();
            assert!(u >= 0.0 && u < 1.0);
        }
    }

    #[test]
    fn pixel_sample_count() {
        let mut sampler = RandomSampler::new_with_seed(3, 0);
        sampler.start_pixel(Point2i::new(2, 5));
        let mut n = 0;
        while sampler.start_next_sample() {
            n += 1;
        }
        assert_eq!(n, 3);
    }

    #[test]
    fn same_seed_same_stream() {
        let a = RandomSampler::new_with_seed(1, 0);
        let mut s1 = a.clone_with_seed(17);
        let mut s2 = a.clone_with_seed(17);
        for _ in 0..16 {
            assert_eq!(s1.get_1d(), s2.get_1d());
        }
    }
}

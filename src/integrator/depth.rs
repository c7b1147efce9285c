use bumpalo::Bump;

use crate::error::RenderError;
use crate::integrator::IntegratorRadiance;
use crate::sampler::Sampler;
use crate::scene::Scene;
use crate::spectrum::Spectrum;
use crate::{Float, Ray};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthConfig {
    pub near: Float,
    pub far: Float,
    /// Brightness floor for the farthest visible surfaces.
    pub ambient: Float,
    pub gamma: Float,
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self { near: 1e-4, far: 1e2, ambient: 0.1, gamma: 5.0 }
    }
}

/// Shades by hit distance: near surfaces are bright, misses are black.
pub struct DepthIntegrator {
    config: DepthConfig,
}

impl DepthIntegrator {
    pub fn new(config: DepthConfig) -> Self {
        Self { config }
    }

    pub fn shade(&self, t: Float) -> Float {
        let DepthConfig { near, far, ambient, gamma } = self.config;
        let kd = (1.0 - (t - near) / (far - near)).max(0.0);
        ambient + (1.0 - ambient) * kd.powf(gamma)
    }
}

impl IntegratorRadiance for DepthIntegrator {
    fn preprocess(&mut self, _scene: &Scene) -> Result<(), RenderError> {
        if self.config.far > self.config.near {
            Ok(())
        } else {
            Err(RenderError::InvalidConfig(format!(
                "depth range [{}, {}] is empty",
                self.config.near, self.config.far
            )))
        }
    }

    fn incident_radiance(&self, ray: &Ray, scene: &Scene, _sampler: &mut dyn Sampler, _arena: &Bump) -> Spectrum {
        match scene.intersect(ray) {
            Some(si) => Spectrum::uniform(self.shade(si.t)),
            None => Spectrum::zero(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn falls_off_to_ambient() {
        let depth = DepthIntegrator::new(DepthConfig::default());
        assert_abs_diff_eq!(depth.shade(1e-4), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(depth.shade(50.0), 0.1 + 0.9 * (0.5 as Float).powf(5.0), epsilon = 1e-3);
        assert_abs_diff_eq!(depth.shade(500.0), 0.1, epsilon = 1e-6);
    }
}

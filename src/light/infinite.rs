use crate::spectrum::Spectrum;

/// Constant radiance arriving from every direction that escapes the scene.
///
/// Escaping rays always pick this up; the environment is never position-sampled.
#[derive(Clone, Copy, Debug)]
pub struct UniformEnvironment {
    pub radiance: Spectrum,
}

impl UniformEnvironment {
    pub fn new(radiance: Spectrum) -> Self {
        Self { radiance }
    }
}

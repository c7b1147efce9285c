use thiserror::Error;

/// Fatal configuration problems. These abort a render before any sample is taken;
/// per-sample numeric degeneracies never surface here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    #[error("scene has no luminaires that can be sampled")]
    NoLuminaires,

    #[error("luminaire {index} cannot be position-sampled")]
    UnsupportedLuminaire { index: usize },

    #[error("scene already has an environment luminaire")]
    DuplicateEnvironment,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

//! Error types
//!
//! Missing surfaces and layers are wiring bugs and must surface immediately.
//! Bad numeric input is rejected before it reaches any simulation state.

use thiserror::Error;

/// Errors produced by the effects core and its platform bindings
#[derive(Error, Debug)]
pub enum Error {
    /// A drawing operation ran before the subsystem's surface was attached
    #[error("{subsystem}: drawing surface not attached")]
    SurfaceMissing {
        /// Which subsystem tried to draw
        subsystem: &'static str,
    },

    /// A parallax layer has no element to move
    #[error("parallax layer not found: {0}")]
    LayerMissing(String),

    /// NaN or infinite numeric input
    #[error("non-finite {what}: {value}")]
    NonFiniteInput {
        /// Name of the rejected quantity
        what: &'static str,
        /// The rejected value
        value: f64,
    },

    /// Score can only grow
    #[error("negative point amount: {0}")]
    NegativePoints(f64),

    /// Tier table does not cover the score axis
    #[error("invalid tier table: {0}")]
    InvalidTierTable(String),

    /// Settings decoded but are out of range
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Settings JSON could not be parsed
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// WebGPU adapter, device or surface failure
    #[error("gpu: {0}")]
    Gpu(String),

    /// Browser/DOM failure
    #[error("platform: {0}")]
    Platform(String),
}

impl From<wgpu::SurfaceError> for Error {
    fn from(err: wgpu::SurfaceError) -> Self {
        Error::Gpu(err.to_string())
    }
}

/// Crate result alias
pub type Result<T> = std::result::Result<T, Error>;

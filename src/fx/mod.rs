//! Visual effects: particles and the glitch overlay
//!
//! All motion is per frame (see `consts`). Nothing here touches the DOM;
//! drawing goes through the `Surface` the engine owns.

pub mod engine;
pub mod glitch;
pub mod particle;

pub use engine::{EngineConfig, ParticleEngine};
pub use glitch::{Glitch, GlitchState};
pub use particle::{Particle, ParticleKind};

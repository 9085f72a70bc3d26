//! Stylish 404 - a rank-driven error page
//!
//! Core modules:
//! - `fx`: Particle engine and glitch overlay
//! - `rank`: Score accumulation and tier state machine
//! - `camera`: Parallax camera with idle drift
//! - `renderer`: Drawing surfaces (software, WebGPU, canvas 2D on web)
//! - `stage`: Event queue and per-frame driver tying the three together
//! - `platform`: Browser bindings (wasm32 only)

pub mod camera;
pub mod color;
pub mod error;
pub mod fx;
pub mod platform;
pub mod rank;
pub mod renderer;
pub mod settings;
pub mod stage;

pub use camera::{CameraMode, LayerSink, ParallaxCamera, ParallaxLayer};
pub use color::{Rgb, TierColor};
pub use error::{Error, Result};
pub use fx::{Glitch, Particle, ParticleEngine};
pub use rank::{RankChange, RankState, RankTier, TierTable};
pub use renderer::{Glow, Surface};
pub use settings::{QualityPreset, Settings};
pub use stage::{Stage, StageEvent};

use glam::Vec2;

/// Tuning constants
///
/// Everything that moves is expressed per frame and tuned for a display
/// refresh of roughly 60 Hz. Faster displays run the effects proportionally
/// faster. Only the timeouts below are measured in milliseconds.
pub mod consts {
    /// Expected frame cadence the per-frame constants were tuned at
    pub const EXPECTED_FPS: f32 = 60.0;

    /// Ambient/pointer particle lifetime (frames)
    pub const AMBIENT_LIFE: u32 = 100;
    /// Explosion particle lifetime (frames)
    pub const EXPLOSION_LIFE: u32 = 60;
    /// Trail particle lifetime (frames)
    pub const TRAIL_LIFE: u32 = 40;

    /// Ambient velocity range per axis: [-MAX, MAX)
    pub const AMBIENT_SPEED: f32 = 2.0;
    /// Trail velocity range per axis: [-MAX, MAX)
    pub const TRAIL_SPEED: f32 = 3.0;
    /// Trail spawn jitter (half the side of the square)
    pub const TRAIL_JITTER: f32 = 20.0;
    /// Explosion speed range
    pub const EXPLOSION_MIN_SPEED: f32 = 4.0;
    pub const EXPLOSION_MAX_SPEED: f32 = 12.0;
    /// Gravity applied to explosion particles (px/frame²)
    pub const EXPLOSION_GRAVITY: f32 = 0.3;

    /// Particle radius ranges [min, max)
    pub const AMBIENT_RADIUS: (f32, f32) = (2.0, 6.0);
    pub const EXPLOSION_RADIUS: (f32, f32) = (3.0, 9.0);
    pub const TRAIL_RADIUS: (f32, f32) = (2.0, 7.0);
    /// Glow extents beyond the radius
    pub const AMBIENT_GLOW: (f32, f32) = (10.0, 30.0);
    pub const EXPLOSION_GLOW: f32 = 30.0;
    pub const TRAIL_GLOW: f32 = 20.0;

    /// Default spawn counts
    pub const DEFAULT_SPAWN_COUNT: usize = 1;
    pub const DEFAULT_EXPLOSION_COUNT: usize = 30;
    pub const DEFAULT_TRAIL_COUNT: usize = 15;

    /// Chance per frame of a spontaneous glitch
    pub const GLITCH_CHANCE: f32 = 0.02;
    /// How long a glitch stays on screen (ms)
    pub const GLITCH_DURATION_MS: f64 = 50.0;
    /// Upper bound of each glitch gradient stop alpha
    pub const GLITCH_MAX_ALPHA: f32 = 0.1;
    /// Upper bound of glitch intensity
    pub const GLITCH_MAX_INTENSITY: f32 = 5.0;

    /// Camera smoothing per frame
    pub const CAMERA_LERP: f32 = 0.1;
    /// Idle drift phase advance per frame (radians)
    pub const DRIFT_PHASE_STEP: f32 = 0.001;
    /// Idle drift amplitude on each axis
    pub const DRIFT_AMPLITUDE: (f32, f32) = (0.3, 0.2);
    /// Ratio between the vertical and horizontal drift frequencies
    pub const DRIFT_Y_FREQUENCY: f32 = 0.7;
    /// Inactivity before the camera drifts again (ms)
    pub const CAMERA_IDLE_TIMEOUT_MS: f64 = 5000.0;
    /// Parallax depth of the background layer (px at full offset)
    pub const BACKGROUND_DEPTH: f32 = 15.0;
    /// Parallax depth of the character layer (px at full offset)
    pub const CHARACTER_DEPTH: f32 = 30.0;

    /// Screen flash on rank change
    pub const FLASH_ALPHA: f32 = 0.5;
    pub const FLASH_DURATION_MS: f64 = 300.0;
    /// Displayed score tween
    pub const SCORE_TWEEN_MS: f64 = 300.0;
    /// Delay between the exit wipe starting and navigation
    pub const EXIT_DELAY_MS: f64 = 800.0;
}

/// Convert a pixel position inside a `width` x `height` viewport to the
/// normalized [-1, 1] range the camera consumes
#[inline]
pub fn normalize_pointer(pos: Vec2, width: f32, height: f32) -> Vec2 {
    if width <= 0.0 || height <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(pos.x / width * 2.0 - 1.0, pos.y / height * 2.0 - 1.0)
}

/// Returns the value if it is finite, otherwise a `NonFiniteInput` error
#[inline]
pub(crate) fn finite(what: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::NonFiniteInput { what, value: f64::from(value) })
    }
}

/// `finite` for millisecond timestamps
#[inline]
pub(crate) fn finite_ms(what: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::NonFiniteInput { what, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pointer_corners() {
        let tl = normalize_pointer(Vec2::ZERO, 800.0, 600.0);
        assert_eq!(tl, Vec2::new(-1.0, -1.0));
        let br = normalize_pointer(Vec2::new(800.0, 600.0), 800.0, 600.0);
        assert_eq!(br, Vec2::new(1.0, 1.0));
        let mid = normalize_pointer(Vec2::new(400.0, 300.0), 800.0, 600.0);
        assert!(mid.length() < 1e-6);
    }

    #[test]
    fn test_normalize_pointer_degenerate_viewport() {
        assert_eq!(normalize_pointer(Vec2::new(5.0, 5.0), 0.0, 600.0), Vec2::ZERO);
    }

    #[test]
    fn test_finite_rejects_nan() {
        assert!(finite("x", f32::NAN).is_err());
        assert!(finite("x", f32::INFINITY).is_err());
        assert_eq!(finite("x", 3.5).ok(), Some(3.5));
    }
}

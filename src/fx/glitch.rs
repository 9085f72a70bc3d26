//! Glitch overlay
//!
//! A translucent red → cyan → transparent diagonal gradient that appears for
//! a few tens of milliseconds.

use rand::Rng;

use crate::color::Rgb;
use crate::consts::{GLITCH_DURATION_MS, GLITCH_MAX_ALPHA, GLITCH_MAX_INTENSITY};

/// One glitch frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glitch {
    /// Gradient direction in degrees [0, 360)
    pub angle_deg: f32,
    /// Alpha of the red stop
    pub red_alpha: f32,
    /// Alpha of the cyan stop
    pub cyan_alpha: f32,
    /// Strength hint for surfaces that distort (0..5)
    pub intensity: f32,
}

impl Glitch {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            angle_deg: rng.random::<f32>() * 360.0,
            red_alpha: rng.random::<f32>() * GLITCH_MAX_ALPHA,
            cyan_alpha: rng.random::<f32>() * GLITCH_MAX_ALPHA,
            intensity: rng.random::<f32>() * GLITCH_MAX_INTENSITY,
        }
    }

    /// CSS background for an overlay element
    pub fn css(&self) -> String {
        format!(
            "linear-gradient({:.1}deg, {}, {}, transparent)",
            self.angle_deg,
            Rgb::RED.css(self.red_alpha),
            Rgb::CYAN.css(self.cyan_alpha),
        )
    }
}

/// The overlay currently on screen and when it goes away
#[derive(Debug, Clone)]
pub struct GlitchState {
    active: Option<(Glitch, f64)>,
    duration_ms: f64,
}

impl Default for GlitchState {
    fn default() -> Self {
        Self {
            active: None,
            duration_ms: GLITCH_DURATION_MS,
        }
    }
}

impl GlitchState {
    /// Show `glitch` from `now_ms` for the glitch duration (replaces any active one)
    pub fn trigger(&mut self, glitch: Glitch, now_ms: f64) {
        self.active = Some((glitch, now_ms + self.duration_ms));
    }

    /// Clear the overlay once its time is up
    pub fn expire(&mut self, now_ms: f64) {
        if let Some((_, until)) = self.active {
            if now_ms >= until {
                self.active = None;
            }
        }
    }

    pub fn current(&self) -> Option<&Glitch> {
        self.active.as_ref().map(|(g, _)| g)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

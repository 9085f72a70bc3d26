//! Particle entity

use glam::Vec2;

use crate::color::Rgb;
use crate::renderer::Glow;

/// Which spawn operation created a particle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    /// Seeded across the whole surface at startup
    Ambient,
    /// Dropped at a point (pointer sparks)
    Spark,
    /// Radial burst with gravity
    Explosion,
    /// Jittered short-lived cue
    Trail,
}

/// A short-lived glowing point
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Drawn core radius
    pub radius: f32,
    /// Soft glow extent beyond the radius
    pub glow: f32,
    pub color: Rgb,
    /// Frames left
    pub life: u32,
    pub max_life: u32,
    /// Added to `vel.y` every frame (explosions only)
    pub gravity: Option<f32>,
}

impl Particle {
    /// Remaining life as opacity in [0, 1]
    #[inline]
    pub fn opacity(&self) -> f32 {
        if self.max_life == 0 {
            return 0.0;
        }
        (self.life as f32 / self.max_life as f32).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0
    }

    /// Advance one frame: move, fall, age
    pub fn step(&mut self) {
        self.pos += self.vel;
        if let Some(g) = self.gravity {
            self.vel.y += g;
        }
        self.life = self.life.saturating_sub(1);
    }

    /// Shape handed to the surface
    pub fn to_glow(&self) -> Glow {
        Glow {
            center: self.pos,
            extent: self.radius + self.glow,
            color: self.color,
            alpha: self.opacity(),
        }
    }
}

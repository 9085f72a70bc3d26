//! Particle engine
//!
//! Owns the live particles and the drawing surface. One `step` per animation
//! frame, one `render` after it. Spawns issued between frames are visible to
//! the next step.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::glitch::{Glitch, GlitchState};
use super::particle::{Particle, ParticleKind};
use crate::color::{Rgb, random_palette_color};
use crate::consts::*;
use crate::error::{Error, Result};
use crate::finite;
use crate::renderer::Surface;
use crate::settings::Settings;

/// Engine limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Live particle cap; the oldest particle is evicted to make room
    pub max_particles: usize,
    /// Chance per step of a spontaneous glitch (0 disables)
    pub glitch_chance: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for EngineConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            max_particles: settings.max_particles(),
            glitch_chance: if settings.effective_glitch() {
                settings.glitch_chance
            } else {
                0.0
            },
        }
    }
}

pub struct ParticleEngine<S: Surface> {
    surface: Option<S>,
    particles: VecDeque<Particle>,
    rng: Pcg32,
    config: EngineConfig,
    glitch: GlitchState,
    /// Particles dropped to honor the cap
    evicted: u64,
}

impl<S: Surface> ParticleEngine<S> {
    /// Engine without a surface yet; spawning and rendering fail until `attach`
    pub fn new(config: EngineConfig, seed: u64) -> Self {
        Self {
            surface: None,
            particles: VecDeque::with_capacity(config.max_particles.min(4096)),
            rng: Pcg32::seed_from_u64(seed),
            config,
            glitch: GlitchState::default(),
            evicted: 0,
        }
    }

    pub fn with_surface(surface: S, config: EngineConfig, seed: u64) -> Self {
        let mut engine = Self::new(config, seed);
        engine.attach(surface);
        engine
    }

    /// Attach (or replace) the drawing surface
    pub fn attach(&mut self, surface: S) {
        let (w, h) = surface.size();
        log::info!("Particle surface attached ({}x{})", w, h);
        self.surface = Some(surface);
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Result<&mut S> {
        self.surface.as_mut().ok_or(Error::SurfaceMissing {
            subsystem: "particles",
        })
    }

    /// Surface size as floats, failing fast without a surface
    fn extent(&self) -> Result<Vec2> {
        let surface = self.surface.as_ref().ok_or(Error::SurfaceMissing {
            subsystem: "particles",
        })?;
        let (w, h) = surface.size();
        Ok(Vec2::new(w as f32, h as f32))
    }

    /// Track the viewport; live particles keep their positions
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.surface_mut()?.resize(width, height);
        Ok(())
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Change limits; shrinking the cap evicts the oldest particles now
    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
        while self.particles.len() > config.max_particles {
            self.particles.pop_front();
            self.evicted += 1;
        }
    }

    /// Live particles in draw order (oldest first)
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Total particles evicted by the cap so far
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Glitch overlay currently shown
    pub fn glitch(&self) -> Option<&Glitch> {
        self.glitch.current()
    }

    /// Add particles, evicting the oldest when the cap is reached
    fn insert(&mut self, batch: Vec<Particle>) {
        let cap = self.config.max_particles;
        if cap == 0 || batch.is_empty() {
            return;
        }
        let mut dropped = 0u64;
        for particle in batch {
            if self.particles.len() >= cap {
                self.particles.pop_front();
                dropped += 1;
            }
            self.particles.push_back(particle);
        }
        if dropped > 0 {
            self.evicted += dropped;
            log::debug!("Evicted {} particles (cap {})", dropped, cap);
        }
    }

    /// How many of `count` new particles can survive the cap; the rest would
    /// be evicted by the same batch, so they are never generated
    fn budget(&self, count: usize) -> usize {
        count.min(self.config.max_particles)
    }

    fn color_or_random(&mut self, color: Option<Rgb>) -> Rgb {
        color.unwrap_or_else(|| random_palette_color(&mut self.rng))
    }

    /// Seed `count` drifting particles uniformly across the surface
    pub fn spawn_ambient(&mut self, count: usize) -> Result<()> {
        let size = self.extent()?;
        let n = self.budget(count);
        let batch = (0..n)
            .map(|_| {
                let pos = Vec2::new(
                    self.rng.random::<f32>() * size.x,
                    self.rng.random::<f32>() * size.y,
                );
                let color = random_palette_color(&mut self.rng);
                self.drifter(ParticleKind::Ambient, pos, color)
            })
            .collect();
        self.insert(batch);
        Ok(())
    }

    /// Drop `count` drifting particles at `pos`
    pub fn spawn_at(&mut self, pos: Vec2, color: Option<Rgb>, count: usize) -> Result<()> {
        self.extent()?;
        let pos = Self::checked(pos)?;
        let n = self.budget(count);
        let batch = (0..n)
            .map(|_| {
                let color = self.color_or_random(color);
                self.drifter(ParticleKind::Spark, pos, color)
            })
            .collect();
        self.insert(batch);
        Ok(())
    }

    /// Symmetric radial burst from `pos`, one color for the whole burst.
    /// Under the cap only the last indices are kept, at their full-burst angles.
    pub fn spawn_explosion(&mut self, pos: Vec2, color: Option<Rgb>, count: usize) -> Result<()> {
        self.extent()?;
        let pos = Self::checked(pos)?;
        let n = self.budget(count);
        if n == 0 {
            return Ok(());
        }
        let color = self.color_or_random(color);
        let batch = (count - n..count)
            .map(|i| {
                let angle = TAU * i as f32 / count as f32;
                let speed = self.rng.random_range(EXPLOSION_MIN_SPEED..EXPLOSION_MAX_SPEED);
                Particle {
                    kind: ParticleKind::Explosion,
                    pos,
                    vel: Vec2::from_angle(angle) * speed,
                    radius: self.rng.random_range(EXPLOSION_RADIUS.0..EXPLOSION_RADIUS.1),
                    glow: EXPLOSION_GLOW,
                    color,
                    life: EXPLOSION_LIFE,
                    max_life: EXPLOSION_LIFE,
                    gravity: Some(EXPLOSION_GRAVITY),
                }
            })
            .collect();
        self.insert(batch);
        Ok(())
    }

    /// Short-lived particles scattered in a small square around `pos`
    pub fn spawn_trail(&mut self, pos: Vec2, color: Option<Rgb>, count: usize) -> Result<()> {
        self.extent()?;
        let pos = Self::checked(pos)?;
        let n = self.budget(count);
        if n == 0 {
            return Ok(());
        }
        let color = self.color_or_random(color);
        let batch = (0..n)
            .map(|_| {
                let jitter = Vec2::new(
                    self.rng.random_range(-TRAIL_JITTER..TRAIL_JITTER),
                    self.rng.random_range(-TRAIL_JITTER..TRAIL_JITTER),
                );
                Particle {
                    kind: ParticleKind::Trail,
                    pos: pos + jitter,
                    vel: Vec2::new(
                        self.rng.random_range(-TRAIL_SPEED..TRAIL_SPEED),
                        self.rng.random_range(-TRAIL_SPEED..TRAIL_SPEED),
                    ),
                    radius: self.rng.random_range(TRAIL_RADIUS.0..TRAIL_RADIUS.1),
                    glow: TRAIL_GLOW,
                    color,
                    life: TRAIL_LIFE,
                    max_life: TRAIL_LIFE,
                    gravity: None,
                }
            })
            .collect();
        self.insert(batch);
        Ok(())
    }

    /// Show a random glitch overlay now
    pub fn trigger_glitch(&mut self, now_ms: f64) {
        let glitch = Glitch::random(&mut self.rng);
        log::debug!("Glitch at {:.0}ms ({:.0}deg)", now_ms, glitch.angle_deg);
        self.glitch.trigger(glitch, now_ms);
    }

    /// Advance every particle one frame and drop the dead ones
    pub fn step(&mut self, now_ms: f64) {
        for particle in self.particles.iter_mut() {
            particle.step();
        }
        self.particles.retain(Particle::is_alive);

        self.glitch.expire(now_ms);
        if self.config.glitch_chance > 0.0 && self.rng.random::<f32>() < self.config.glitch_chance {
            self.trigger_glitch(now_ms);
        }
    }

    /// Clear the surface and draw every particle, oldest first. `step` has
    /// already dropped the dead ones.
    pub fn render(&mut self) -> Result<()> {
        let surface = self.surface.as_mut().ok_or(Error::SurfaceMissing {
            subsystem: "particles",
        })?;
        surface.clear();
        for particle in self.particles.iter() {
            surface.draw_glow(&particle.to_glow());
        }
        surface.set_glitch(self.glitch.current());
        surface.present()
    }

    fn drifter(&mut self, kind: ParticleKind, pos: Vec2, color: Rgb) -> Particle {
        Particle {
            kind,
            pos,
            vel: Vec2::new(
                self.rng.random_range(-AMBIENT_SPEED..AMBIENT_SPEED),
                self.rng.random_range(-AMBIENT_SPEED..AMBIENT_SPEED),
            ),
            radius: self.rng.random_range(AMBIENT_RADIUS.0..AMBIENT_RADIUS.1),
            glow: self.rng.random_range(AMBIENT_GLOW.0..AMBIENT_GLOW.1),
            color,
            life: AMBIENT_LIFE,
            max_life: AMBIENT_LIFE,
            gravity: None,
        }
    }

    fn checked(pos: Vec2) -> Result<Vec2> {
        Ok(Vec2::new(finite("x", pos.x)?, finite("y", pos.y)?))
    }
}

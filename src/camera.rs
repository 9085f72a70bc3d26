//! Parallax camera
//!
//! Two modes: `Tracking` follows the latest pointer sample, `IdleDrift`
//! wanders on a slow Lissajous path. The smoothed offset chases the raw
//! target by a fixed fraction every frame and is written to each layer
//! scaled by that layer's depth.

use glam::Vec2;

use crate::consts::{
    BACKGROUND_DEPTH, CAMERA_IDLE_TIMEOUT_MS, CAMERA_LERP, CHARACTER_DEPTH, DRIFT_AMPLITUDE,
    DRIFT_PHASE_STEP, DRIFT_Y_FREQUENCY,
};
use crate::error::Result;
use crate::{finite, finite_ms};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// Driven by live pointer/touch samples
    Tracking,
    /// Autonomous drift after inactivity (and at startup)
    IdleDrift,
}

/// A visual layer moved by the camera
#[derive(Debug, Clone, PartialEq)]
pub struct ParallaxLayer {
    /// Element id of the layer
    pub id: String,
    /// Pixels of translation at full (±1) offset
    pub depth: f32,
}

impl ParallaxLayer {
    pub fn new(id: &str, depth: f32) -> Self {
        Self {
            id: id.to_string(),
            depth,
        }
    }

    /// Background moves less than the characters in front of it
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("bgLayer", BACKGROUND_DEPTH),
            Self::new("charactersLayer", CHARACTER_DEPTH),
        ]
    }

    pub fn translation(&self, offset: Vec2) -> Vec2 {
        offset * self.depth
    }
}

/// Anything that can translate a named layer
pub trait LayerSink {
    /// Errors with `LayerMissing` when `layer` does not exist
    fn translate(&mut self, layer: &str, offset: Vec2) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct ParallaxCamera {
    mode: CameraMode,
    target: Vec2,
    smoothed: Vec2,
    phase: f32,
    idle_deadline: Option<f64>,
    lerp: f32,
    idle_timeout_ms: f64,
    layers: Vec<ParallaxLayer>,
}

impl Default for ParallaxCamera {
    fn default() -> Self {
        Self::new(ParallaxLayer::defaults())
    }
}

impl ParallaxCamera {
    pub fn new(layers: Vec<ParallaxLayer>) -> Self {
        Self {
            mode: CameraMode::IdleDrift,
            target: Vec2::ZERO,
            smoothed: Vec2::ZERO,
            phase: 0.0,
            idle_deadline: None,
            lerp: CAMERA_LERP,
            idle_timeout_ms: CAMERA_IDLE_TIMEOUT_MS,
            layers,
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Raw target in [-1, 1]
    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Smoothed offset in [-1, 1]
    pub fn offset(&self) -> Vec2 {
        self.smoothed
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn layers(&self) -> &[ParallaxLayer] {
        &self.layers
    }

    /// Drift target for a given phase
    pub fn drift_target(phase: f32) -> Vec2 {
        Vec2::new(
            phase.sin() * DRIFT_AMPLITUDE.0,
            (phase * DRIFT_Y_FREQUENCY).cos() * DRIFT_AMPLITUDE.1,
        )
    }

    /// Feed a normalized pointer/touch sample; switches to tracking and
    /// rearms the inactivity timer
    pub fn on_pointer_sample(&mut self, sample: Vec2, now_ms: f64) -> Result<()> {
        let x = finite("pointer x", sample.x)?;
        let y = finite("pointer y", sample.y)?;
        let now_ms = finite_ms("timestamp", now_ms)?;

        self.target = Vec2::new(x, y).clamp(Vec2::NEG_ONE, Vec2::ONE);
        if self.mode == CameraMode::IdleDrift {
            log::debug!("Camera tracking pointer");
        }
        self.mode = CameraMode::Tracking;
        self.idle_deadline = Some(now_ms + self.idle_timeout_ms);
        Ok(())
    }

    /// Advance one frame
    pub fn step(&mut self, now_ms: f64) {
        if self.mode == CameraMode::Tracking
            && self.idle_deadline.is_some_and(|deadline| now_ms >= deadline)
        {
            log::debug!("Camera idle, drifting");
            self.mode = CameraMode::IdleDrift;
            self.idle_deadline = None;
        }

        if self.mode == CameraMode::IdleDrift {
            self.phase += DRIFT_PHASE_STEP;
            self.target = Self::drift_target(self.phase);
        }

        self.smoothed += (self.target - self.smoothed) * self.lerp;
    }

    /// Write the smoothed offset to every layer
    pub fn apply<L: LayerSink + ?Sized>(&self, sink: &mut L) -> Result<()> {
        for layer in &self.layers {
            sink.translate(&layer.id, layer.translation(self.smoothed))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Recorder {
        known: Vec<&'static str>,
        seen: HashMap<String, Vec2>,
    }

    impl LayerSink for Recorder {
        fn translate(&mut self, layer: &str, offset: Vec2) -> Result<()> {
            if !self.known.contains(&layer) {
                return Err(Error::LayerMissing(layer.to_string()));
            }
            self.seen.insert(layer.to_string(), offset);
            Ok(())
        }
    }

    #[test]
    fn test_starts_drifting() {
        let mut camera = ParallaxCamera::default();
        assert_eq!(camera.mode(), CameraMode::IdleDrift);
        camera.step(0.0);
        assert_eq!(camera.target(), ParallaxCamera::drift_target(DRIFT_PHASE_STEP));
    }

    #[test]
    fn test_sample_switches_to_tracking_and_clamps() {
        let mut camera = ParallaxCamera::default();
        camera.on_pointer_sample(Vec2::new(3.0, -0.5), 0.0).unwrap();
        assert_eq!(camera.mode(), CameraMode::Tracking);
        assert_eq!(camera.target(), Vec2::new(1.0, -0.5));

        camera.step(16.0);
        assert!((camera.offset() - Vec2::new(0.1, -0.05)).length() < 1e-6);
    }

    #[test]
    fn test_non_finite_sample_rejected() {
        let mut camera = ParallaxCamera::default();
        assert!(matches!(
            camera.on_pointer_sample(Vec2::new(f32::NAN, 0.0), 0.0),
            Err(Error::NonFiniteInput { .. })
        ));
        assert_eq!(camera.mode(), CameraMode::IdleDrift);
    }

    #[test]
    fn test_non_finite_timestamp_rejected() {
        let mut camera = ParallaxCamera::default();
        assert!(matches!(
            camera.on_pointer_sample(Vec2::new(0.5, 0.5), f64::NAN),
            Err(Error::NonFiniteInput { what: "timestamp", .. })
        ));
        assert_eq!(camera.mode(), CameraMode::IdleDrift);
        assert_eq!(camera.target(), Vec2::ZERO);

        camera.on_pointer_sample(Vec2::new(0.5, 0.5), 0.0).unwrap();
        camera.step(5_001.0);
        assert_eq!(camera.mode(), CameraMode::IdleDrift);
    }

    #[test]
    fn test_timeout_returns_to_drift() {
        let mut camera = ParallaxCamera::default();
        camera.on_pointer_sample(Vec2::new(0.8, 0.8), 0.0).unwrap();
        camera.step(4999.0);
        assert_eq!(camera.mode(), CameraMode::Tracking);
        assert_eq!(camera.target(), Vec2::new(0.8, 0.8));

        // A later sample pushes the deadline out
        camera.on_pointer_sample(Vec2::new(0.8, 0.8), 4000.0).unwrap();
        camera.step(5500.0);
        assert_eq!(camera.mode(), CameraMode::Tracking);

        camera.step(9000.0);
        assert_eq!(camera.mode(), CameraMode::IdleDrift);
        assert_eq!(camera.target(), ParallaxCamera::drift_target(camera.phase()));
    }

    #[test]
    fn test_apply_scales_by_depth() {
        let mut camera = ParallaxCamera::default();
        camera.on_pointer_sample(Vec2::new(1.0, 1.0), 0.0).unwrap();
        for i in 0..200 {
            camera.step(i as f64);
        }
        let mut sink = Recorder {
            known: vec!["bgLayer", "charactersLayer"],
            ..Default::default()
        };
        camera.apply(&mut sink).unwrap();
        let bg = sink.seen["bgLayer"];
        let chars = sink.seen["charactersLayer"];
        assert!((bg.x - 15.0).abs() < 1e-3);
        assert!((chars.x - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_apply_missing_layer_fails() {
        let camera = ParallaxCamera::default();
        let mut sink = Recorder {
            known: vec!["bgLayer"],
            ..Default::default()
        };
        assert!(matches!(
            camera.apply(&mut sink),
            Err(Error::LayerMissing(id)) if id == "charactersLayer"
        ));
    }

    proptest! {
        #[test]
        fn prop_converges_without_overshoot(
            sx in -1.0f32..1.0, sy in -1.0f32..1.0,
            tx in -1.0f32..1.0, ty in -1.0f32..1.0,
        ) {
            let mut camera = ParallaxCamera::default();
            camera.on_pointer_sample(Vec2::new(sx, sy), 0.0).unwrap();
            for _ in 0..30 {
                camera.step(0.0);
            }
            let target = Vec2::new(tx, ty);
            camera.on_pointer_sample(target, 0.0).unwrap();

            let mut previous = (target - camera.offset()).length();
            let start = camera.offset();
            for _ in 0..300 {
                camera.step(0.0);
                let offset = camera.offset();
                let distance = (target - offset).length();
                prop_assert!(distance <= previous + 1e-6);
                // Never crosses the target on either axis
                prop_assert!((offset.x - start.x) * (target.x - offset.x) >= -1e-9);
                prop_assert!((offset.y - start.y) * (target.y - offset.y) >= -1e-9);
                previous = distance;
            }
            prop_assert!(previous < 1e-3);
        }
    }
}

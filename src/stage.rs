//! Page driver core
//!
//! Input callbacks never touch the simulation directly: they `push` a
//! `StageEvent`, and the next `frame` drains the queue before stepping and
//! rendering. Everything runs on one thread.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::camera::{LayerSink, ParallaxCamera};
use crate::color::Rgb;
use crate::consts::{EXIT_DELAY_MS, FLASH_ALPHA, FLASH_DURATION_MS};
use crate::error::{Error, Result};
use crate::fx::{EngineConfig, ParticleEngine};
use crate::normalize_pointer;
use crate::rank::{ActivityMeter, RankChange, RankState, ScoreTicker, TierTable};
use crate::renderer::Surface;
use crate::settings::{Rewards, Settings};

/// Something that happened on the page since the last frame
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    /// Pointer moved (viewport pixels)
    PointerMoved { pos: Vec2 },
    /// Touch moved (viewport pixels)
    TouchMoved { pos: Vec2 },
    CardHovered { card: usize },
    CardClicked { card: usize },
    /// Pointer entered the return button at `anchor`
    ReturnHovered { anchor: Vec2 },
    ReturnClicked,
    Resized { width: u32, height: u32 },
}

/// A character card in the showcase
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub name: String,
    pub color: Rgb,
    /// Center of the card in viewport pixels
    pub anchor: Vec2,
}

impl Card {
    pub fn new(name: &str, color: Rgb) -> Self {
        Self {
            name: name.to_string(),
            color,
            anchor: Vec2::ZERO,
        }
    }
}

/// Hooks into an optional animation-timeline library. Every method defaults
/// to doing nothing, which is the behavior when no library is present.
pub trait Choreography {
    fn rank_pulse(&mut self, _change: &RankChange) {}

    fn card_hovered(&mut self, _card: usize) {}

    fn card_selected(&mut self, _card: usize) {}

    fn showcase(&mut self, _card: usize) {}

    /// Start the exit wipe; `false` when nothing will animate and the page
    /// should leave right away
    fn exit_wipe(&mut self) -> bool {
        false
    }
}

/// Choreography for pages without an animation library
#[derive(Debug, Default)]
pub struct NoChoreography;

impl Choreography for NoChoreography {}

/// Full screen white flash fading out linearly
#[derive(Debug, Clone)]
pub struct ScreenFlash {
    peak: f32,
    duration_ms: f64,
    started: Option<f64>,
}

impl Default for ScreenFlash {
    fn default() -> Self {
        Self {
            peak: FLASH_ALPHA,
            duration_ms: FLASH_DURATION_MS,
            started: None,
        }
    }
}

impl ScreenFlash {
    pub fn trigger(&mut self, now_ms: f64) {
        self.started = Some(now_ms);
    }

    pub fn alpha(&self, now_ms: f64) -> f32 {
        let Some(started) = self.started else {
            return 0.0;
        };
        let t = (now_ms - started) / self.duration_ms;
        if !(0.0..1.0).contains(&t) {
            return 0.0;
        }
        self.peak * (1.0 - t as f32)
    }
}

/// What a frame produced, for the HUD
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub rank_changes: Vec<RankChange>,
    /// Displayed (animated) integer score
    pub score: i64,
    /// The page should navigate away now
    pub navigate: bool,
}

pub struct Stage<S: Surface> {
    engine: ParticleEngine<S>,
    rank: RankState,
    camera: ParallaxCamera,
    meter: ActivityMeter,
    ticker: ScoreTicker,
    flash: ScreenFlash,
    rewards: Rewards,
    ambient_count: usize,
    glitch_on_rank: bool,
    flash_on_rank: bool,
    viewport: Vec2,
    queue: VecDeque<StageEvent>,
    rng: Pcg32,
    cards: Vec<Card>,
    active_card: usize,
    next_rotation: Option<f64>,
    rank_anchor: Vec2,
    exit_at: Option<f64>,
    exiting: bool,
    choreography: Box<dyn Choreography>,
}

impl<S: Surface> Stage<S> {
    pub fn new(settings: &Settings, seed: u64) -> Self {
        Self {
            engine: ParticleEngine::new(EngineConfig::from(settings), seed),
            rank: RankState::new(TierTable::from_preset(settings.tiers)),
            camera: ParallaxCamera::default(),
            meter: ActivityMeter::from_rewards(&settings.rewards),
            ticker: ScoreTicker::default(),
            flash: ScreenFlash::default(),
            rewards: settings.rewards.clone(),
            ambient_count: settings.ambient_count,
            glitch_on_rank: settings.effective_glitch(),
            flash_on_rank: settings.effective_rank_flash(),
            viewport: Vec2::ZERO,
            queue: VecDeque::new(),
            rng: Pcg32::seed_from_u64(seed.wrapping_add(1)),
            cards: Vec::new(),
            active_card: 0,
            next_rotation: None,
            rank_anchor: Vec2::ZERO,
            exit_at: None,
            exiting: false,
            choreography: Box::new(NoChoreography),
        }
    }

    /// Attach the particle surface; its size becomes the viewport
    pub fn attach(&mut self, surface: S) {
        let (w, h) = surface.size();
        self.viewport = Vec2::new(w as f32, h as f32);
        self.engine.attach(surface);
    }

    pub fn set_choreography(&mut self, choreography: Box<dyn Choreography>) {
        self.choreography = choreography;
    }

    pub fn set_cards(&mut self, cards: Vec<Card>) {
        self.cards = cards;
        self.active_card = 0;
    }

    pub fn set_card_anchor(&mut self, card: usize, anchor: Vec2) {
        if let Some(card) = self.cards.get_mut(card) {
            card.anchor = anchor;
        }
    }

    /// Where rank-change bursts go off
    pub fn set_rank_anchor(&mut self, anchor: Vec2) {
        self.rank_anchor = anchor;
    }

    pub fn engine(&self) -> &ParticleEngine<S> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ParticleEngine<S> {
        &mut self.engine
    }

    pub fn rank(&self) -> &RankState {
        &self.rank
    }

    pub fn camera(&self) -> &ParallaxCamera {
        &self.camera
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn active_card(&self) -> usize {
        self.active_card
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Seed the ambient particles and arm the showcase rotation
    pub fn start(&mut self, now_ms: f64) -> Result<()> {
        self.engine.spawn_ambient(self.ambient_count)?;
        self.next_rotation = Some(now_ms + self.rewards.rotation_interval_ms);
        log::info!("Stage started ({} ambient particles)", self.engine.len());
        Ok(())
    }

    /// Queue an event for the next frame
    pub fn push(&mut self, event: StageEvent) {
        self.queue.push_back(event);
    }

    /// Grant points and react to a rank change right away. Nothing is
    /// committed when the reaction could not run.
    pub fn add_points(&mut self, amount: f64, now_ms: f64) -> Result<Option<RankChange>> {
        self.engine.surface_mut()?;
        let change = self.rank.add_points(amount)?;
        self.ticker.retarget(self.rank.score(), now_ms);
        if let Some(change) = &change {
            self.engine.spawn_explosion(
                self.rank_anchor,
                Some(change.color.primary()),
                self.rewards.rank_change_burst,
            )?;
            if self.glitch_on_rank {
                self.engine.trigger_glitch(now_ms);
            }
            if self.flash_on_rank {
                self.flash.trigger(now_ms);
            }
            self.choreography.rank_pulse(change);
        }
        Ok(change)
    }

    /// Run one animation frame: drain events, advance, render, move layers
    pub fn frame<L: LayerSink + ?Sized>(&mut self, now_ms: f64, layers: &mut L) -> Result<FrameReport> {
        let mut report = FrameReport::default();

        while let Some(event) = self.queue.pop_front() {
            match self.handle(event, now_ms, &mut report) {
                Ok(()) => {}
                Err(e @ (Error::NonFiniteInput { .. } | Error::NegativePoints(_))) => {
                    log::warn!("Dropped event: {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        self.rotate_showcase(now_ms, &mut report)?;

        self.camera.step(now_ms);
        self.engine.step(now_ms);

        if self.exit_at.is_some_and(|at| now_ms >= at) {
            self.exit_at = None;
            report.navigate = true;
        }

        let flash = self.flash.alpha(now_ms);
        self.engine.surface_mut()?.set_flash(flash);
        self.engine.render()?;
        self.camera.apply(layers)?;

        report.score = self.ticker.value(now_ms);
        Ok(report)
    }

    fn award(&mut self, amount: f64, now_ms: f64, report: &mut FrameReport) -> Result<()> {
        if let Some(change) = self.add_points(amount, now_ms)? {
            report.rank_changes.push(change);
        }
        Ok(())
    }

    fn card(&self, card: usize) -> Option<Card> {
        let found = self.cards.get(card).cloned();
        if found.is_none() {
            log::warn!("Unknown card {}", card);
        }
        found
    }

    fn handle(&mut self, event: StageEvent, now_ms: f64, report: &mut FrameReport) -> Result<()> {
        match event {
            StageEvent::PointerMoved { pos } => {
                let sample = normalize_pointer(pos, self.viewport.x, self.viewport.y);
                self.camera.on_pointer_sample(sample, now_ms)?;

                let points = self.meter.grant(now_ms);
                if points > 0.0 {
                    self.award(points, now_ms, report)?;
                }
                if self.rng.random::<f32>() < self.rewards.pointer_spark_chance {
                    self.engine.spawn_at(pos, None, self.rewards.pointer_spark_count)?;
                    self.award(self.rewards.pointer_spark_points, now_ms, report)?;
                }
            }
            StageEvent::TouchMoved { pos } => {
                let sample = normalize_pointer(pos, self.viewport.x, self.viewport.y);
                self.camera.on_pointer_sample(sample, now_ms)?;
            }
            StageEvent::CardHovered { card } => {
                if self.card(card).is_some() {
                    self.choreography.card_hovered(card);
                    self.award(self.rewards.card_hover_points, now_ms, report)?;
                }
            }
            StageEvent::CardClicked { card } => {
                if let Some(selected) = self.card(card) {
                    self.engine.spawn_explosion(
                        selected.anchor,
                        Some(selected.color),
                        self.rewards.card_click_burst,
                    )?;
                    self.choreography.card_selected(card);
                    self.award(self.rewards.card_click_points, now_ms, report)?;
                }
            }
            StageEvent::ReturnHovered { anchor } => {
                self.engine
                    .spawn_trail(anchor, Some(Rgb::CRIMSON), self.rewards.return_hover_trail)?;
                self.award(self.rewards.return_hover_points, now_ms, report)?;
            }
            StageEvent::ReturnClicked => {
                if self.exiting {
                    return Ok(());
                }
                self.exiting = true;
                self.engine.spawn_explosion(
                    self.viewport * 0.5,
                    Some(Rgb::CRIMSON),
                    self.rewards.return_click_burst,
                )?;
                if self.choreography.exit_wipe() {
                    self.exit_at = Some(now_ms + EXIT_DELAY_MS);
                } else {
                    report.navigate = true;
                }
            }
            StageEvent::Resized { width, height } => {
                self.engine.resize(width, height)?;
                self.viewport = Vec2::new(width as f32, height as f32);
            }
        }
        Ok(())
    }

    fn rotate_showcase(&mut self, now_ms: f64, report: &mut FrameReport) -> Result<()> {
        let interval = self.rewards.rotation_interval_ms;
        let due = *self.next_rotation.get_or_insert(now_ms + interval);
        if self.cards.is_empty() || now_ms < due {
            return Ok(());
        }
        self.next_rotation = Some(now_ms + interval);

        self.active_card = (self.active_card + 1) % self.cards.len();
        let card = self.cards[self.active_card].clone();
        self.engine
            .spawn_explosion(card.anchor, Some(card.color), self.rewards.rotation_burst)?;
        self.choreography.showcase(self.active_card);
        self.award(self.rewards.rotation_points, now_ms, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::PixelSurface;
    use std::cell::Cell;
    use std::rc::Rc;

    struct NullLayers;

    impl LayerSink for NullLayers {
        fn translate(&mut self, _layer: &str, _offset: Vec2) -> Result<()> {
            Ok(())
        }
    }

    struct Wipe(Rc<Cell<u32>>);

    impl Choreography for Wipe {
        fn rank_pulse(&mut self, _change: &RankChange) {
            self.0.set(self.0.get() + 1);
        }

        fn exit_wipe(&mut self) -> bool {
            true
        }
    }

    fn quiet_settings() -> Settings {
        let mut settings = Settings {
            ambient_count: 0,
            glitch_chance: 0.0,
            ..Settings::default()
        };
        settings.rewards.pointer_spark_chance = 0.0;
        settings
    }

    fn stage() -> Stage<PixelSurface> {
        let mut stage = Stage::new(&quiet_settings(), 9);
        stage.attach(PixelSurface::new(200, 100));
        stage.set_cards(vec![
            Card::new("Dante", Rgb::CRIMSON),
            Card::new("Vergil", Rgb::BLUE),
        ]);
        stage.set_card_anchor(1, Vec2::new(150.0, 50.0));
        stage
    }

    #[test]
    fn test_frame_without_surface_fails() {
        let mut stage: Stage<PixelSurface> = Stage::new(&quiet_settings(), 1);
        assert!(matches!(
            stage.frame(0.0, &mut NullLayers),
            Err(Error::SurfaceMissing { .. })
        ));
    }

    #[test]
    fn test_points_before_attach_keep_rank_change() {
        let mut stage: Stage<PixelSurface> = Stage::new(&quiet_settings(), 1);
        assert!(matches!(
            stage.add_points(60.0, 0.0),
            Err(Error::SurfaceMissing { .. })
        ));
        assert_eq!(stage.rank().score(), 0.0);
        assert_eq!(stage.rank().tier().name, "DISMAL");

        stage.attach(PixelSurface::new(50, 50));
        let change = stage.add_points(60.0, 1.0).unwrap().expect("rank change");
        assert_eq!(change.name, "CRAZY");
        assert_eq!(stage.engine().len(), 60);
    }

    #[test]
    fn test_events_wait_for_frame() {
        let mut stage = stage();
        stage.push(StageEvent::CardHovered { card: 0 });
        assert_eq!(stage.pending(), 1);
        assert_eq!(stage.rank().score(), 0.0);

        stage.frame(0.0, &mut NullLayers).unwrap();
        assert_eq!(stage.pending(), 0);
        assert_eq!(stage.rank().score(), 25.0);
    }

    #[test]
    fn test_card_click_bursts_in_card_color() {
        let mut stage = stage();
        stage.push(StageEvent::CardClicked { card: 1 });
        stage.frame(0.0, &mut NullLayers).unwrap();

        assert_eq!(stage.rank().score(), 50.0);
        assert_eq!(stage.engine().len(), 50);
        assert!(stage.engine().particles().all(|p| p.color == Rgb::BLUE));
    }

    #[test]
    fn test_unknown_card_ignored() {
        let mut stage = stage();
        stage.push(StageEvent::CardClicked { card: 7 });
        stage.frame(0.0, &mut NullLayers).unwrap();
        assert_eq!(stage.rank().score(), 0.0);
        assert!(stage.engine().is_empty());
    }

    #[test]
    fn test_rank_change_reacts() {
        let mut stage = stage();
        let pulses = Rc::new(Cell::new(0));
        stage.set_choreography(Box::new(Wipe(pulses.clone())));
        stage.set_rank_anchor(Vec2::new(10.0, 10.0));

        stage.push(StageEvent::CardClicked { card: 0 });
        stage.push(StageEvent::CardClicked { card: 0 });
        let report = stage.frame(1000.0, &mut NullLayers).unwrap();

        assert_eq!(report.rank_changes.len(), 1);
        assert_eq!(report.rank_changes[0].name, "CRAZY");
        assert_eq!(pulses.get(), 1);
        // Two card bursts plus the rank burst
        assert_eq!(stage.engine().len(), 50 + 50 + 60);
        assert!(stage.engine().glitch().is_some());
        let surface = stage.engine().surface().unwrap();
        assert!((surface.flash() - FLASH_ALPHA).abs() < 1e-6);

        stage.frame(1400.0, &mut NullLayers).unwrap();
        assert_eq!(stage.engine().surface().unwrap().flash(), 0.0);
    }

    #[test]
    fn test_reduced_motion_skips_flash_and_glitch() {
        let settings = Settings {
            reduced_motion: true,
            ..quiet_settings()
        };
        let mut stage = Stage::new(&settings, 3);
        stage.attach(PixelSurface::new(64, 64));
        stage.add_points(60.0, 0.0).unwrap();
        stage.frame(0.0, &mut NullLayers).unwrap();
        assert!(stage.engine().glitch().is_none());
        assert_eq!(stage.engine().surface().unwrap().flash(), 0.0);
    }

    #[test]
    fn test_pointer_points_capped_per_window() {
        let mut stage = stage();
        for i in 0..200 {
            stage.push(StageEvent::PointerMoved {
                pos: Vec2::new(i as f32 % 200.0, 50.0),
            });
        }
        stage.frame(0.0, &mut NullLayers).unwrap();
        assert_eq!(stage.rank().score(), 50.0);
        assert_eq!(stage.camera().mode(), crate::CameraMode::Tracking);
    }

    #[test]
    fn test_non_finite_pointer_dropped() {
        let mut stage = stage();
        stage.push(StageEvent::PointerMoved {
            pos: Vec2::new(f32::NAN, 1.0),
        });
        stage.push(StageEvent::CardHovered { card: 1 });
        stage.frame(0.0, &mut NullLayers).unwrap();
        assert_eq!(stage.rank().score(), 25.0);
    }

    #[test]
    fn test_return_click_without_choreography_leaves_now() {
        let mut stage = stage();
        stage.push(StageEvent::ReturnClicked);
        let report = stage.frame(0.0, &mut NullLayers).unwrap();
        assert!(report.navigate);
        assert_eq!(stage.engine().len(), 200);
        assert!(stage.engine().particles().all(|p| p.color == Rgb::CRIMSON));
    }

    #[test]
    fn test_return_click_waits_for_wipe() {
        let mut stage = stage();
        stage.set_choreography(Box::new(Wipe(Rc::new(Cell::new(0)))));
        stage.push(StageEvent::ReturnClicked);
        stage.push(StageEvent::ReturnClicked);
        assert!(!stage.frame(0.0, &mut NullLayers).unwrap().navigate);
        assert!(!stage.frame(799.0, &mut NullLayers).unwrap().navigate);
        assert!(stage.frame(800.0, &mut NullLayers).unwrap().navigate);
        assert!(!stage.frame(900.0, &mut NullLayers).unwrap().navigate);
    }

    #[test]
    fn test_return_hover_trails() {
        let mut stage = stage();
        stage.push(StageEvent::ReturnHovered {
            anchor: Vec2::new(100.0, 90.0),
        });
        stage.frame(0.0, &mut NullLayers).unwrap();
        assert_eq!(stage.rank().score(), 5.0);
        assert_eq!(stage.engine().len(), 20);
    }

    #[test]
    fn test_showcase_rotates() {
        let mut stage = stage();
        stage.start(0.0).unwrap();
        stage.frame(4999.0, &mut NullLayers).unwrap();
        assert_eq!(stage.active_card(), 0);

        stage.frame(5000.0, &mut NullLayers).unwrap();
        assert_eq!(stage.active_card(), 1);
        assert_eq!(stage.rank().score(), 3.0);
        assert_eq!(stage.engine().len(), 40);

        stage.frame(10_000.0, &mut NullLayers).unwrap();
        assert_eq!(stage.active_card(), 0);
    }

    #[test]
    fn test_resize_updates_viewport() {
        let mut stage = stage();
        stage.push(StageEvent::Resized {
            width: 320,
            height: 240,
        });
        stage.frame(0.0, &mut NullLayers).unwrap();
        assert_eq!(stage.viewport(), Vec2::new(320.0, 240.0));
        assert_eq!(stage.engine().surface().unwrap().size(), (320, 240));
    }

    #[test]
    fn test_screen_flash_fades() {
        let mut flash = ScreenFlash::default();
        assert_eq!(flash.alpha(0.0), 0.0);
        flash.trigger(100.0);
        assert!((flash.alpha(100.0) - 0.5).abs() < 1e-6);
        assert!((flash.alpha(250.0) - 0.25).abs() < 1e-6);
        assert_eq!(flash.alpha(400.0), 0.0);
    }

    #[test]
    fn test_displayed_score_animates() {
        let mut stage = stage();
        stage.push(StageEvent::CardClicked { card: 0 });
        let first = stage.frame(0.0, &mut NullLayers).unwrap();
        assert_eq!(first.score, 0);
        let later = stage.frame(300.0, &mut NullLayers).unwrap();
        assert_eq!(later.score, 50);
    }
}

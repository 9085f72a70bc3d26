//! End-to-end behavior through the public API

use glam::Vec2;

use stylish_404::fx::{EngineConfig, ParticleKind};
use stylish_404::renderer::PixelSurface;
use stylish_404::stage::{Card, Stage, StageEvent};
use stylish_404::{
    CameraMode, LayerSink, ParallaxCamera, ParticleEngine, RankState, Result, Rgb, Settings,
    TierTable,
};

struct NoLayers;

impl LayerSink for NoLayers {
    fn translate(&mut self, _layer: &str, _offset: Vec2) -> Result<()> {
        Ok(())
    }
}

#[test]
fn score_crossing_first_threshold_fires_one_rank_change() {
    let mut rank = RankState::new(TierTable::stylish());

    assert_eq!(rank.add_points(10.0).unwrap(), None);
    assert_eq!(rank.tier().name, "DISMAL");

    let change = rank.add_points(45.0).unwrap().expect("rank change");
    assert_eq!(rank.score(), 55.0);
    assert_eq!(change.name, "CRAZY");
    assert_eq!(rank.tier().name, "CRAZY");

    assert_eq!(rank.add_points(1.0).unwrap(), None);
}

#[test]
fn trail_particles_keep_vertical_velocity() {
    let mut engine: ParticleEngine<PixelSurface> =
        ParticleEngine::with_surface(PixelSurface::new(200, 200), EngineConfig::default(), 15);
    engine
        .spawn_trail(Vec2::new(100.0, 100.0), Some(Rgb::SKY), 15)
        .unwrap();
    let before: Vec<f32> = engine.particles().map(|p| p.vel.y).collect();
    assert_eq!(before.len(), 15);

    engine.step(16.0);

    let after: Vec<f32> = engine.particles().map(|p| p.vel.y).collect();
    assert_eq!(before, after);
    assert!(engine
        .particles()
        .all(|p| p.kind == ParticleKind::Trail && p.gravity.is_none()));
}

#[test]
fn camera_drifts_after_inactivity() {
    let mut camera = ParallaxCamera::default();
    camera.on_pointer_sample(Vec2::new(0.9, -0.9), 0.0).unwrap();

    let mut now = 0.0;
    while now < 4_900.0 {
        camera.step(now);
        now += 16.0;
    }
    assert_eq!(camera.mode(), CameraMode::Tracking);
    assert_eq!(camera.target(), Vec2::new(0.9, -0.9));

    camera.step(5_001.0);
    assert_eq!(camera.mode(), CameraMode::IdleDrift);

    for i in 0..10 {
        camera.step(5_020.0 + i as f64 * 16.0);
        assert_eq!(camera.target(), ParallaxCamera::drift_target(camera.phase()));
        assert_ne!(camera.target(), Vec2::new(0.9, -0.9));
    }
}

#[test]
fn page_session_through_the_stage() {
    let mut settings = Settings {
        ambient_count: 20,
        glitch_chance: 0.0,
        ..Settings::default()
    };
    settings.rewards.pointer_spark_chance = 0.0;

    let mut stage = Stage::new(&settings, 7);
    stage.attach(PixelSurface::new(320, 180));
    stage.set_cards(vec![
        Card::new("Dante", Rgb::CRIMSON),
        Card::new("Vergil", Rgb::SKY),
    ]);
    stage.start(0.0).unwrap();
    assert_eq!(stage.engine().len(), 20);

    stage.push(StageEvent::CardClicked { card: 0 });
    stage.push(StageEvent::CardHovered { card: 1 });
    let report = stage.frame(16.0, &mut NoLayers).unwrap();
    assert_eq!(stage.rank().score(), 75.0);
    assert_eq!(report.rank_changes.len(), 1);
    assert_eq!(report.rank_changes[0].name, "CRAZY");
    assert!(stage.engine().surface().unwrap().covered_pixels() > 0);

    stage.push(StageEvent::ReturnClicked);
    let report = stage.frame(32.0, &mut NoLayers).unwrap();
    assert!(report.navigate);
}

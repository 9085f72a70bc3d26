//! Page settings and preferences
//!
//! Persisted in LocalStorage on the web. Score and rank are never persisted.

use serde::{Deserialize, Serialize};

use crate::consts::GLITCH_CHANCE;
use crate::error::{Error, Result};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 250,
            QualityPreset::Medium => 800,
            QualityPreset::High => 2000,
        }
    }
}

/// Which tier ladder the rank meter uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TierPreset {
    /// DISMAL → CRAZY → BADASS → APOCALYPTIC → STYLISH!
    #[default]
    Stylish,
    /// D → C → B → A → S → SS → SSS
    LetterGrade,
}

/// Preferred particle renderer on the web
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RendererKind {
    /// WebGPU, falling back to canvas 2D when no adapter is available
    #[default]
    WebGpu,
    Canvas2d,
}

/// Points and burst sizes granted by page interactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rewards {
    /// Points per pointer move, until the window cap is reached
    pub pointer_move_points: f64,
    /// Max pointer-move points per window
    pub pointer_move_cap: f64,
    /// Window length for the cap (ms)
    pub pointer_move_window_ms: f64,
    /// Chance per pointer move of dropping a few sparks (and a point)
    pub pointer_spark_chance: f32,
    pub pointer_spark_count: usize,
    pub pointer_spark_points: f64,
    pub card_hover_points: f64,
    pub card_click_points: f64,
    pub card_click_burst: usize,
    /// Showcase rotation
    pub rotation_interval_ms: f64,
    pub rotation_points: f64,
    pub rotation_burst: usize,
    pub return_hover_points: f64,
    pub return_hover_trail: usize,
    pub return_click_burst: usize,
    /// Burst at the rank display on every rank change
    pub rank_change_burst: usize,
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            pointer_move_points: 0.5,
            pointer_move_cap: 50.0,
            pointer_move_window_ms: 5000.0,
            pointer_spark_chance: 0.1,
            pointer_spark_count: 2,
            pointer_spark_points: 1.0,
            card_hover_points: 25.0,
            card_click_points: 50.0,
            card_click_burst: 50,
            rotation_interval_ms: 5000.0,
            rotation_points: 3.0,
            rotation_burst: 40,
            return_hover_points: 5.0,
            return_hover_trail: 20,
            return_click_burst: 200,
            rank_change_burst: 60,
        }
    }
}

/// Page settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Particle renderer preference
    pub renderer: RendererKind,

    // === Visual Effects ===
    /// Particle effects (ambient, bursts, trails)
    pub particles: bool,
    /// Ambient particles seeded at startup
    pub ambient_count: usize,
    /// Random glitch overlay
    pub glitch: bool,
    /// Chance per frame of a spontaneous glitch
    pub glitch_chance: f32,
    /// Full screen flash on rank change
    pub rank_flash: bool,

    // === Rank ===
    pub tiers: TierPreset,
    pub rewards: Rewards,

    // === Accessibility ===
    /// Reduced motion (no glitches, no flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            renderer: RendererKind::WebGpu,

            particles: true,
            ambient_count: 50,
            glitch: true,
            glitch_chance: GLITCH_CHANCE,
            rank_flash: true,

            tiers: TierPreset::Stylish,
            rewards: Rewards::default(),

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective glitch (respects reduced_motion)
    pub fn effective_glitch(&self) -> bool {
        self.glitch && !self.reduced_motion
    }

    /// Effective rank flash (respects reduced_motion)
    pub fn effective_rank_flash(&self) -> bool {
        self.rank_flash && !self.reduced_motion
    }

    /// Effective live particle cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Decode and validate settings JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.glitch_chance) {
            return Err(Error::InvalidSettings(format!(
                "glitch_chance {} outside [0, 1]",
                self.glitch_chance
            )));
        }
        if !(0.0..=1.0).contains(&self.rewards.pointer_spark_chance) {
            return Err(Error::InvalidSettings(format!(
                "pointer_spark_chance {} outside [0, 1]",
                self.rewards.pointer_spark_chance
            )));
        }
        let r = &self.rewards;
        let points = [
            r.pointer_move_points,
            r.pointer_move_cap,
            r.pointer_spark_points,
            r.card_hover_points,
            r.card_click_points,
            r.rotation_points,
            r.return_hover_points,
        ];
        if points.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(Error::InvalidSettings(
                "reward points must be finite and non-negative".into(),
            ));
        }
        if !(r.pointer_move_window_ms > 0.0 && r.rotation_interval_ms > 0.0) {
            return Err(Error::InvalidSettings("intervals must be positive".into()));
        }
        let max = QualityPreset::High.max_particles();
        let counts = [
            ("ambient_count", self.ambient_count),
            ("pointer_spark_count", r.pointer_spark_count),
            ("card_click_burst", r.card_click_burst),
            ("rotation_burst", r.rotation_burst),
            ("return_hover_trail", r.return_hover_trail),
            ("return_click_burst", r.return_click_burst),
            ("rank_change_burst", r.rank_change_burst),
        ];
        if let Some((name, count)) = counts.iter().find(|(_, c)| *c > max) {
            return Err(Error::InvalidSettings(format!(
                "{} {} above the particle limit {}",
                name, count, max
            )));
        }
        Ok(())
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "stylish_404_settings";

    /// Environment variable naming a settings JSON file (native only)
    #[allow(dead_code)]
    const SETTINGS_ENV: &'static str = "STYLISH_404_SETTINGS";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load settings from the file named by `STYLISH_404_SETTINGS`, if any
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::SETTINGS_ENV) else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path);
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read {}: {}", path, e);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_caps() {
        assert_eq!(Settings::from_preset(QualityPreset::Low).max_particles(), 250);
        assert_eq!(Settings::from_preset(QualityPreset::High).max_particles(), 2000);

        let off = Settings {
            particles: false,
            ..Settings::default()
        };
        assert_eq!(off.max_particles(), 0);
    }

    #[test]
    fn test_reduced_motion_disables_glitch_and_flash() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert!(!settings.effective_glitch());
        assert!(!settings.effective_rank_flash());
        assert!(Settings::default().effective_glitch());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{"quality":"High","rewards":{"card_click_points":7}}"#)
            .unwrap();
        assert_eq!(settings.quality, QualityPreset::High);
        assert_eq!(settings.rewards.card_click_points, 7.0);
        assert_eq!(settings.rewards.card_hover_points, 25.0);
        assert_eq!(settings.ambient_count, 50);
    }

    #[test]
    fn test_json_round_trip_preserves_preferences() {
        let settings = Settings {
            tiers: TierPreset::LetterGrade,
            renderer: RendererKind::Canvas2d,
            ..Settings::default()
        };
        let decoded = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(decoded.tiers, TierPreset::LetterGrade);
        assert_eq!(decoded.renderer, RendererKind::Canvas2d);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(matches!(
            Settings::from_json(r#"{"glitch_chance": 1.5}"#),
            Err(Error::InvalidSettings(_))
        ));
        assert!(matches!(
            Settings::from_json(r#"{"rewards":{"card_hover_points":-3}}"#),
            Err(Error::InvalidSettings(_))
        ));
        assert!(matches!(Settings::from_json("not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_oversized_counts_rejected() {
        assert!(matches!(
            Settings::from_json(r#"{"ambient_count": 18446744073709551615}"#),
            Err(Error::InvalidSettings(_))
        ));
        assert!(matches!(
            Settings::from_json(r#"{"rewards":{"return_click_burst":2001}}"#),
            Err(Error::InvalidSettings(_))
        ));
        assert!(Settings::from_json(r#"{"rewards":{"rank_change_burst":2000}}"#).is_ok());
    }

    #[test]
    fn test_quality_parse() {
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert_eq!(QualityPreset::High.as_str(), "High");
    }
}

//! Colors used by particles, tiers and overlays

use rand::Rng;
use serde::{Deserialize, Serialize};

/// An opaque RGB color; alpha is always computed at draw time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const CRIMSON: Rgb = Rgb::new(220, 20, 60);
    pub const SKY: Rgb = Rgb::new(96, 165, 250);
    pub const BLUE: Rgb = Rgb::new(59, 130, 246);
    pub const VIOLET: Rgb = Rgb::new(124, 58, 237);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const CYAN: Rgb = Rgb::new(0, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`, `RRGGBB` or the short `#RGB` form
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            6 => Some(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&digits[i..=i]).map(|v| v * 17);
                Some(Self::new(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => None,
        }
    }

    /// Like `from_hex` but falls back to white for anything unparseable
    pub fn from_hex_or_white(hex: &str) -> Self {
        Self::from_hex(hex).unwrap_or(Self::WHITE)
    }

    /// CSS `rgba(...)` with the given alpha
    pub fn css(&self, alpha: f32) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha.clamp(0.0, 1.0))
    }

    /// `#rrggbb`
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Normalized float channels with alpha, for GPU upload
    pub fn to_array(&self, alpha: f32) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            alpha,
        ]
    }
}

/// Theme colors particles pick from when none is given
pub const PALETTE: [Rgb; 4] = [Rgb::CRIMSON, Rgb::SKY, Rgb::BLUE, Rgb::VIOLET];

/// Pick a random theme color
pub fn random_palette_color<R: Rng>(rng: &mut R) -> Rgb {
    PALETTE[rng.random_range(0..PALETTE.len())]
}

/// Display color of a rank tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "stops", rename_all = "lowercase")]
pub enum TierColor {
    Solid(Rgb),
    /// Animated horizontal gradient through the stops
    Gradient(Vec<Rgb>),
}

impl TierColor {
    /// The single color used where a gradient can't be drawn (particle bursts)
    pub fn primary(&self) -> Rgb {
        match self {
            TierColor::Solid(c) => *c,
            TierColor::Gradient(stops) => stops.first().copied().unwrap_or(Rgb::WHITE),
        }
    }

    pub fn is_gradient(&self) -> bool {
        matches!(self, TierColor::Gradient(_))
    }

    /// CSS value: a color for solids, a `linear-gradient` for gradients
    pub fn css(&self) -> String {
        match self {
            TierColor::Solid(c) => c.hex(),
            TierColor::Gradient(stops) => {
                let stops: Vec<String> = stops.iter().map(Rgb::hex).collect();
                format!("linear-gradient(90deg, {})", stops.join(", "))
            }
        }
    }
}

//! Drawing surfaces
//!
//! The particle engine only ever talks to a `Surface`. Three implementations:
//! - `PixelSurface`: software RGBA buffer (native demo, tests)
//! - `GpuSurface`: instanced WebGPU glow quads
//! - `platform::web::CanvasSurface`: canvas 2D radial gradients (wasm32 only)

pub mod gpu;
pub mod pixel;
pub mod vertex;

pub use gpu::GpuSurface;
pub use pixel::PixelSurface;

use glam::Vec2;

use crate::color::Rgb;
use crate::error::Result;
use crate::fx::Glitch;

/// A soft radial glow: full `color`/`alpha` at the center fading to
/// transparent at `extent` (particle radius + glow radius)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub center: Vec2,
    pub extent: f32,
    pub color: Rgb,
    pub alpha: f32,
}

impl Glow {
    /// Gradient alpha at distance `d` from the center
    ///
    /// Stops are 0 → alpha, 0.5 → alpha/2, 1 → 0, which is a linear ramp.
    #[inline]
    pub fn falloff(&self, d: f32) -> f32 {
        if self.extent <= 0.0 {
            return 0.0;
        }
        let t = (d / self.extent).clamp(0.0, 1.0);
        self.alpha * (1.0 - t)
    }
}

/// Something the particle engine can draw onto
pub trait Surface {
    /// Current size in pixels
    fn size(&self) -> (u32, u32);

    /// Track the viewport
    fn resize(&mut self, width: u32, height: u32);

    /// Clear to transparent
    fn clear(&mut self);

    /// Composite one glow over whatever is already drawn
    fn draw_glow(&mut self, glow: &Glow);

    /// Show or clear the glitch overlay
    fn set_glitch(&mut self, _glitch: Option<&Glitch>) {}

    /// Full-screen white flash with the given alpha (0 = none)
    fn set_flash(&mut self, _alpha: f32) {}

    /// Finish the frame
    fn present(&mut self) -> Result<()> {
        Ok(())
    }
}

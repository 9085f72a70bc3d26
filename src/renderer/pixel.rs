//! Software RGBA surface
//!
//! Straight-alpha RGBA8 pixels, source-over compositing. Used by the native
//! demo and by tests that need to look at what was drawn.

use super::{Glow, Surface};
use crate::color::Rgb;
use crate::fx::Glitch;

/// Alpha blend a single channel (`alpha` in 0..=255)
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let result = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

/// RGBA8 pixel buffer
pub struct PixelSurface {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    glitch: Option<Glitch>,
    flash: f32,
    frames: u64,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; (width as usize) * (height as usize) * 4],
            width,
            height,
            glitch: None,
            flash: 0.0,
            frames: 0,
        }
    }

    /// Raw RGBA bytes, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA at (x, y), `None` out of bounds
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Glitch overlay currently shown
    pub fn glitch(&self) -> Option<&Glitch> {
        self.glitch.as_ref()
    }

    /// Flash alpha currently shown
    pub fn flash(&self) -> f32 {
        self.flash
    }

    /// Frames presented so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Number of pixels with any coverage
    pub fn covered_pixels(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|p| p[3] > 0).count()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * 4
    }

    /// Source-over blend of `color` at `alpha` (0..1) into one pixel
    fn blend(&mut self, x: u32, y: u32, color: Rgb, alpha: f32) {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u16;
        if a == 0 {
            return;
        }
        let i = self.index(x, y);
        let dst_a = self.pixels[i + 3];
        self.pixels[i] = blend_channel(color.r, self.pixels[i], a);
        self.pixels[i + 1] = blend_channel(color.g, self.pixels[i + 1], a);
        self.pixels[i + 2] = blend_channel(color.b, self.pixels[i + 2], a);
        self.pixels[i + 3] = blend_channel(255, dst_a, a);
    }
}

impl Surface for PixelSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![0; (width as usize) * (height as usize) * 4];
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn draw_glow(&mut self, glow: &Glow) {
        if glow.extent <= 0.0 || glow.alpha <= 0.0 || self.width == 0 || self.height == 0 {
            return;
        }
        let min_x = (glow.center.x - glow.extent).floor().max(0.0) as u32;
        let min_y = (glow.center.y - glow.extent).floor().max(0.0) as u32;
        let max_x = (glow.center.x + glow.extent).ceil().min(self.width as f32 - 1.0);
        let max_y = (glow.center.y + glow.extent).ceil().min(self.height as f32 - 1.0);
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let (max_x, max_y) = (max_x as u32, max_y as u32);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 + 0.5 - glow.center.x;
                let dy = y as f32 + 0.5 - glow.center.y;
                let alpha = glow.falloff((dx * dx + dy * dy).sqrt());
                self.blend(x, y, glow.color, alpha);
            }
        }
    }

    fn set_glitch(&mut self, glitch: Option<&Glitch>) {
        self.glitch = glitch.copied();
    }

    fn set_flash(&mut self, alpha: f32) {
        self.flash = alpha.clamp(0.0, 1.0);
    }

    fn present(&mut self) -> crate::error::Result<()> {
        self.frames += 1;
        Ok(())
    }
}

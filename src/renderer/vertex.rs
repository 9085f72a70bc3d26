//! Instance types for the glow pipeline

use bytemuck::{Pod, Zeroable};

use super::Glow;

/// One glow quad, expanded to six vertices in the shader
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GlowInstance {
    /// Center in surface pixels
    pub center: [f32; 2],
    /// Radius of the quad (particle radius + glow)
    pub extent: f32,
    pub _pad: f32,
    /// Straight-alpha color
    pub color: [f32; 4],
}

impl GlowInstance {
    pub fn from_glow(glow: &Glow) -> Self {
        Self {
            center: [glow.center.x, glow.center.y],
            extent: glow.extent,
            _pad: 0.0,
            color: glow.color.to_array(glow.alpha),
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlowInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Per-frame uniforms (must match glow.wgsl)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Globals {
    pub resolution: [f32; 2],
    /// Full-screen white flash alpha
    pub flash: f32,
    pub _pad: f32,
}

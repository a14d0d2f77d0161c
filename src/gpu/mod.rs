// src/gpu/mod.rs
//! Presentation path: GPU backend contract, the full-screen quad, and the
//! triple-buffered texture presenter.
//!
//! - GpuBackend: the operations the presenter needs from a GPU
//! - TexturePresenter: uploads dirty frames into a ring of 3 textures and
//!   draws the live one each refresh
//! - HeadlessGpu: in-memory backend used for headless runs and tests

pub mod error;
pub mod headless;
pub mod presenter;
pub mod quad;

pub use error::{FrameUnavailable, GpuError};
pub use headless::HeadlessGpu;
pub use presenter::{PresentOutcome, PresenterStats, TexturePresenter, TextureRing, TEXTURE_RING_SIZE};

use crate::color::Argb8888;

/// Texel layouts a backend may be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit BGRA, sRGB encoded. Matches `Argb8888` in little-endian memory.
    Bgra8UnormSrgb,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Bgra8UnormSrgb => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDescriptor {
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
}

impl TextureDescriptor {
    pub const fn bytes_per_row(&self) -> usize {
        self.width * self.format.bytes_per_pixel()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineDescriptor {
    pub label: &'static str,
    pub vertex_function: &'static str,
    pub fragment_function: &'static str,
    pub color_format: PixelFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    TriangleStrip,
}

/// Everything bound for one draw call.
pub struct QuadDraw<'a, G: GpuBackend + ?Sized> {
    pub pipeline: &'a G::Pipeline,
    /// Vertex buffer index 0.
    pub positions: &'a G::Buffer,
    /// Vertex buffer index 1.
    pub tex_coords: &'a G::Buffer,
    /// Fragment texture index 0.
    pub texture: &'a G::Texture,
    pub primitive: PrimitiveType,
    pub vertex_start: usize,
    pub vertex_count: usize,
}

/// The GPU operations the presenter consumes.
///
/// Device and command queue creation happen in the backend's constructor.
/// Every `create_*` failure is fatal to the caller; per-frame failures come
/// back from [`GpuBackend::begin_frame`] and only cost that frame.
pub trait GpuBackend {
    type Buffer;
    type Texture;
    type Pipeline;
    /// A drawable plus the command buffer and encoder recording into it.
    type Frame;

    fn device_name(&self) -> &str;

    fn create_pipeline(&mut self, desc: &PipelineDescriptor) -> Result<Self::Pipeline, GpuError>;

    fn create_buffer(&mut self, label: &str, data: &[f32]) -> Result<Self::Buffer, GpuError>;

    fn create_texture(&mut self, desc: &TextureDescriptor) -> Result<Self::Texture, GpuError>;

    /// Overwrite the full contents of `texture`.
    fn replace_texture(&mut self, texture: &mut Self::Texture, pixels: &[Argb8888], bytes_per_row: usize);

    /// Acquire drawable and render pass, begin a command buffer and encoder.
    fn begin_frame(&mut self) -> Result<Self::Frame, FrameUnavailable>;

    /// Bind pipeline, buffers and texture, then encode the draw.
    fn draw(&mut self, frame: &mut Self::Frame, draw: QuadDraw<'_, Self>);

    /// End encoding, present the drawable, commit.
    fn end_frame(&mut self, frame: Self::Frame);
}

#[cfg(test)]
mod tests;

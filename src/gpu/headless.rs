// src/gpu/headless.rs
//! Headless GPU backend.
//!
//! Textures and the drawable live in host memory and the quad is rasterized
//! by the software pass-through shader. Used for headless runs and tests; it
//! can also be told to run out of textures or drawables to exercise the
//! failure paths.

use crate::color::Argb8888;
use crate::gpu::quad::{draw_strip, Surface, TextureView, PASSTHROUGH_FRAGMENT, PASSTHROUGH_VERTEX};
use crate::gpu::{FrameUnavailable, GpuBackend, GpuError, PipelineDescriptor, PrimitiveType, QuadDraw, TextureDescriptor};
use log::{info, trace};

pub struct HeadlessBuffer {
    pub label: String,
    pub data: Vec<f32>,
}

pub struct HeadlessTexture {
    pub id: usize,
    pub desc: TextureDescriptor,
    pub pixels: Vec<Argb8888>,
    /// Number of `replace_texture` calls that targeted this texture.
    pub writes: u64,
}

pub struct HeadlessPipeline {
    pub desc: PipelineDescriptor,
}

/// Drawable being recorded for one frame.
pub struct HeadlessFrame {
    target: Vec<Argb8888>,
    drawn_texture: Option<usize>,
}

pub struct HeadlessGpu {
    drawable_width: usize,
    drawable_height: usize,
    texture_budget: Option<usize>,
    textures_created: usize,
    drawables_missing: usize,
    last_frame: Option<Vec<Argb8888>>,
    last_presented_texture: Option<usize>,
    frames_presented: u64,
}

impl HeadlessGpu {
    /// Creates a device whose drawable is `width` x `height` pixels.
    pub fn new(width: usize, height: usize) -> Result<Self, GpuError> {
        if width == 0 || height == 0 {
            return Err(GpuError::DeviceUnavailable(format!(
                "drawable size {}x{} is empty",
                width, height
            )));
        }
        info!("HeadlessGpu: device created, drawable {}x{}", width, height);
        Ok(Self {
            drawable_width: width,
            drawable_height: height,
            texture_budget: None,
            textures_created: 0,
            drawables_missing: 0,
            last_frame: None,
            last_presented_texture: None,
            frames_presented: 0,
        })
    }

    /// Fail texture allocation after `budget` textures.
    pub fn with_texture_budget(mut self, budget: usize) -> Self {
        self.texture_budget = Some(budget);
        self
    }

    /// The next `frames` calls to `begin_frame` find no drawable.
    pub fn drop_drawables(&mut self, frames: usize) {
        self.drawables_missing = frames;
    }

    /// Contents of the most recently presented drawable.
    pub fn last_frame(&self) -> Option<&[Argb8888]> {
        self.last_frame.as_deref()
    }

    pub fn last_presented_texture(&self) -> Option<usize> {
        self.last_presented_texture
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn drawable_size(&self) -> (usize, usize) {
        (self.drawable_width, self.drawable_height)
    }
}

impl GpuBackend for HeadlessGpu {
    type Buffer = HeadlessBuffer;
    type Texture = HeadlessTexture;
    type Pipeline = HeadlessPipeline;
    type Frame = HeadlessFrame;

    fn device_name(&self) -> &str {
        "headless"
    }

    fn create_pipeline(&mut self, desc: &PipelineDescriptor) -> Result<Self::Pipeline, GpuError> {
        for function in [desc.vertex_function, desc.fragment_function] {
            if function != PASSTHROUGH_VERTEX && function != PASSTHROUGH_FRAGMENT {
                return Err(GpuError::Pipeline {
                    label: desc.label.to_string(),
                    reason: format!("unknown shader function '{}'", function),
                });
            }
        }
        Ok(HeadlessPipeline { desc: desc.clone() })
    }

    fn create_buffer(&mut self, label: &str, data: &[f32]) -> Result<Self::Buffer, GpuError> {
        if data.is_empty() {
            return Err(GpuError::BufferAllocation {
                label: label.to_string(),
                reason: "zero length".to_string(),
            });
        }
        Ok(HeadlessBuffer {
            label: label.to_string(),
            data: data.to_vec(),
        })
    }

    fn create_texture(&mut self, desc: &TextureDescriptor) -> Result<Self::Texture, GpuError> {
        if self.texture_budget.is_some_and(|budget| self.textures_created >= budget) {
            return Err(GpuError::TextureAllocation {
                width: desc.width,
                height: desc.height,
                reason: "out of texture memory".to_string(),
            });
        }
        let id = self.textures_created;
        self.textures_created += 1;
        Ok(HeadlessTexture {
            id,
            desc: *desc,
            pixels: vec![Argb8888::CLEAR; desc.width * desc.height],
            writes: 0,
        })
    }

    fn replace_texture(&mut self, texture: &mut Self::Texture, pixels: &[Argb8888], bytes_per_row: usize) {
        let row = bytes_per_row / texture.desc.format.bytes_per_pixel();
        for (dst, src) in texture
            .pixels
            .chunks_mut(texture.desc.width)
            .zip(pixels.chunks(row.max(1)))
        {
            let n = dst.len().min(src.len());
            dst[..n].copy_from_slice(&src[..n]);
        }
        texture.writes += 1;
        trace!("HeadlessGpu: replaced texture {}", texture.id);
    }

    fn begin_frame(&mut self) -> Result<Self::Frame, FrameUnavailable> {
        if self.drawables_missing > 0 {
            self.drawables_missing -= 1;
            return Err(FrameUnavailable::NoDrawable);
        }
        Ok(HeadlessFrame {
            target: vec![Argb8888::CLEAR; self.drawable_width * self.drawable_height],
            drawn_texture: None,
        })
    }

    fn draw(&mut self, frame: &mut Self::Frame, draw: QuadDraw<'_, Self>) {
        let PrimitiveType::TriangleStrip = draw.primitive;
        let mut surface = Surface {
            pixels: &mut frame.target,
            width: self.drawable_width,
            height: self.drawable_height,
        };
        let texture = TextureView {
            pixels: &draw.texture.pixels,
            width: draw.texture.desc.width,
            height: draw.texture.desc.height,
        };
        draw_strip(
            &mut surface,
            &draw.positions.data,
            &draw.tex_coords.data,
            draw.vertex_start,
            draw.vertex_count,
            &texture,
        );
        frame.drawn_texture = Some(draw.texture.id);
    }

    fn end_frame(&mut self, frame: Self::Frame) {
        self.last_presented_texture = frame.drawn_texture;
        self.last_frame = Some(frame.target);
        self.frames_presented += 1;
    }
}

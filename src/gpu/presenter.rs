// src/gpu/presenter.rs
//! TexturePresenter - moves finished frames onto the GPU and draws them.
//!
//! ## Frame states
//! - Idle: the frame buffer is clean; `present` redraws the live texture.
//! - Upload: the frame buffer is dirty; `upload_if_dirty` advances the ring,
//!   copies the whole frame into the new live slot and clears the flag.
//! - Present: runs on the host's refresh cadence, independent of uploads, and
//!   always draws the live slot as one full-screen quad.
//!
//! Three slots keep the slot being written apart from the one the GPU may
//! still be reading from an earlier submission.

use crate::framebuffer::{PixelFrameBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::gpu::quad::{passthrough_pipeline, QUAD_POSITIONS, QUAD_TEX_COORDS, QUAD_VERTEX_COUNT};
use crate::gpu::{FrameUnavailable, GpuBackend, PixelFormat, PrimitiveType, QuadDraw, TextureDescriptor};
use anyhow::{Context, Result};
use log::{debug, info, trace};

pub const TEXTURE_RING_SIZE: usize = 3;

/// Texture format shared by the ring and the pipeline's color attachment.
pub const FRAME_FORMAT: PixelFormat = PixelFormat::Bgra8UnormSrgb;

/// Fixed ring of equally sized textures with one live slot.
pub struct TextureRing<T> {
    slots: [T; TEXTURE_RING_SIZE],
    current: usize,
}

impl<T> TextureRing<T> {
    pub fn new(slots: [T; TEXTURE_RING_SIZE]) -> Self {
        Self { slots, current: 0 }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The live slot.
    pub fn current(&self) -> &T {
        &self.slots[self.current]
    }

    pub fn slot(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Makes the next slot live and returns it for writing.
    pub fn advance(&mut self) -> &mut T {
        self.current = (self.current + 1) % self.slots.len();
        &mut self.slots[self.current]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresenterStats {
    pub uploads: u64,
    pub presented: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Presented { texture: usize },
    Skipped(FrameUnavailable),
}

/// Owns the GPU objects of the presentation path.
pub struct TexturePresenter<G: GpuBackend> {
    gpu: G,
    pipeline: G::Pipeline,
    positions: G::Buffer,
    tex_coords: G::Buffer,
    ring: TextureRing<G::Texture>,
    texture_desc: TextureDescriptor,
    stats: PresenterStats,
}

impl<G: GpuBackend> TexturePresenter<G> {
    /// Builds pipeline, quad buffers and the texture ring. Any failure here
    /// means there is nothing to present with.
    pub fn new(mut gpu: G) -> Result<Self> {
        info!("TexturePresenter: Using GPU device '{}'", gpu.device_name());

        let pipeline_desc = passthrough_pipeline(FRAME_FORMAT);
        let pipeline = gpu
            .create_pipeline(&pipeline_desc)
            .context("Failed to create render pipeline state")?;
        let positions = gpu
            .create_buffer("quad positions", &QUAD_POSITIONS)
            .context("Failed to create vertex buffer")?;
        let tex_coords = gpu
            .create_buffer("quad texture coordinates", &QUAD_TEX_COORDS)
            .context("Failed to create texture coordinate buffer")?;

        let texture_desc = TextureDescriptor {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            format: FRAME_FORMAT,
        };
        let slots = [
            gpu.create_texture(&texture_desc).context("Failed to create texture 0")?,
            gpu.create_texture(&texture_desc).context("Failed to create texture 1")?,
            gpu.create_texture(&texture_desc).context("Failed to create texture 2")?,
        ];
        info!(
            "TexturePresenter: Created {} textures of {}x{}",
            TEXTURE_RING_SIZE, texture_desc.width, texture_desc.height
        );

        Ok(Self {
            gpu,
            pipeline,
            positions,
            tex_coords,
            ring: TextureRing::new(slots),
            texture_desc,
            stats: PresenterStats::default(),
        })
    }

    /// Copies the frame into the next ring slot if it changed since the last
    /// upload. Returns whether an upload happened.
    pub fn upload_if_dirty(&mut self, framebuffer: &mut PixelFrameBuffer) -> bool {
        if !framebuffer.take_dirty() {
            return false;
        }
        let bytes_per_row = self.texture_desc.bytes_per_row();
        let texture = self.ring.advance();
        self.gpu.replace_texture(texture, framebuffer.snapshot(), bytes_per_row);
        self.stats.uploads += 1;
        trace!("TexturePresenter: Uploaded frame into slot {}", self.ring.current_index());
        true
    }

    /// Draws the live slot full-screen. A missing drawable or descriptor
    /// skips this frame only.
    pub fn present(&mut self) -> PresentOutcome {
        let mut frame = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(reason) => {
                debug!("TexturePresenter: Skipping frame: {}", reason);
                self.stats.skipped += 1;
                return PresentOutcome::Skipped(reason);
            }
        };

        let draw = QuadDraw {
            pipeline: &self.pipeline,
            positions: &self.positions,
            tex_coords: &self.tex_coords,
            texture: self.ring.current(),
            primitive: PrimitiveType::TriangleStrip,
            vertex_start: 0,
            vertex_count: QUAD_VERTEX_COUNT,
        };
        self.gpu.draw(&mut frame, draw);
        self.gpu.end_frame(frame);
        self.stats.presented += 1;

        PresentOutcome::Presented {
            texture: self.ring.current_index(),
        }
    }

    pub fn ring(&self) -> &TextureRing<G::Texture> {
        &self.ring
    }

    pub fn stats(&self) -> PresenterStats {
        self.stats
    }

    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }
}

// src/gpu/error.rs

use thiserror::Error;

/// Construction-time failures. Any of these leaves the simulator without a
/// presentation path, so startup aborts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GpuError {
    #[error("no GPU device available: {0}")]
    DeviceUnavailable(String),
    #[error("failed to create command queue: {0}")]
    CommandQueue(String),
    #[error("failed to create pipeline '{label}': {reason}")]
    Pipeline { label: String, reason: String },
    #[error("failed to allocate buffer '{label}': {reason}")]
    BufferAllocation { label: String, reason: String },
    #[error("failed to allocate {width}x{height} texture: {reason}")]
    TextureAllocation { width: usize, height: usize, reason: String },
}

/// Per-frame resources that were not available. The frame is skipped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameUnavailable {
    #[error("no drawable")]
    NoDrawable,
    #[error("no render pass descriptor")]
    NoRenderPassDescriptor,
    #[error("no command buffer")]
    NoCommandBuffer,
    #[error("no render command encoder")]
    NoEncoder,
}

// src/display/driver.rs
//! DisplayDriver trait - the write half of the embedded engine's driver
//! contract.
//!
//! The engine renders into its own draw buffer and reports finished pixels
//! through these three calls. All of them run synchronously inside the
//! engine's task dispatcher, on the simulator's single timeline.
//!
//! ## Flow control
//! `flush_region` is the only call the engine blocks on: its redraw pipeline
//! does not reuse the draw buffer until the driver calls
//! [`FlushReady::flush_ready`]. Implementations must make that call exactly
//! once per flush, including when the region is rejected.

use crate::color::Rgb565;
use crate::display::region::DisplayRegion;

/// Acknowledgment handle the engine passes along with every flush.
pub trait FlushReady {
    /// Tell the engine the flushed buffer may be reused.
    fn flush_ready(&mut self);
}

/// Display-driver capability set the engine receives at registration time.
pub trait DisplayDriver {
    /// Copy `colors` into `region` row by row, then acknowledge via `ready`.
    ///
    /// `colors` must hold at least `region.area()` entries.
    fn flush_region(&mut self, region: DisplayRegion, colors: &[Rgb565], ready: &mut dyn FlushReady);

    /// Paint every pixel of `region` with `color`. No acknowledgment.
    fn fill_region(&mut self, region: DisplayRegion, color: Rgb565);

    /// Same writes as `flush_region`, without the acknowledgment.
    fn map_region(&mut self, region: DisplayRegion, colors: &[Rgb565]);
}

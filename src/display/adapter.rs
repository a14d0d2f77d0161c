// src/display/adapter.rs
//! DisplayDriverAdapter - validates engine writes and lands them in the
//! frame buffer.

use crate::color::{Argb8888, Rgb565};
use crate::display::driver::{DisplayDriver, FlushReady};
use crate::display::region::DisplayRegion;
use crate::framebuffer::PixelFrameBuffer;
use log::{trace, warn};

/// Counters for driver traffic, reported by the simulator on shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayStats {
    pub flushes: u64,
    pub fills: u64,
    pub maps: u64,
    pub rejected: u64,
}

/// Owns the frame buffer and implements [`DisplayDriver`] on top of it.
pub struct DisplayDriverAdapter {
    framebuffer: PixelFrameBuffer,
    stats: DisplayStats,
}

impl DisplayDriverAdapter {
    pub fn new() -> Self {
        Self {
            framebuffer: PixelFrameBuffer::new(),
            stats: DisplayStats::default(),
        }
    }

    pub fn framebuffer(&self) -> &PixelFrameBuffer {
        &self.framebuffer
    }

    pub(crate) fn framebuffer_mut(&mut self) -> &mut PixelFrameBuffer {
        &mut self.framebuffer
    }

    pub fn stats(&self) -> DisplayStats {
        self.stats
    }

    fn accept(&mut self, op: &str, region: &DisplayRegion) -> bool {
        if region.is_on_screen() {
            return true;
        }
        warn!("DisplayDriver: {} rejected, region {:?} is off screen", op, region);
        self.stats.rejected += 1;
        false
    }

    fn write_sequence(&mut self, op: &str, region: DisplayRegion, colors: &[Rgb565]) {
        if !self.accept(op, &region) {
            return;
        }
        let area = region.area();
        if colors.len() < area {
            warn!(
                "DisplayDriver: {} rejected, {} colors supplied for {} pixels in {:?}",
                op,
                colors.len(),
                area,
                region
            );
            self.stats.rejected += 1;
            return;
        }

        for ((x, y), &color) in region.points().zip(colors) {
            self.framebuffer.write(x, y, Argb8888::from(color));
        }
        self.framebuffer.mark_dirty();
        trace!("DisplayDriver: {} wrote {} px at {:?}", op, area, region);
    }
}

impl Default for DisplayDriverAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayDriver for DisplayDriverAdapter {
    fn flush_region(&mut self, region: DisplayRegion, colors: &[Rgb565], ready: &mut dyn FlushReady) {
        self.stats.flushes += 1;
        self.write_sequence("flush", region, colors);
        // The engine stalls until this fires, so it runs on every path.
        ready.flush_ready();
    }

    fn fill_region(&mut self, region: DisplayRegion, color: Rgb565) {
        self.stats.fills += 1;
        if !self.accept("fill", &region) {
            return;
        }
        let packed = Argb8888::from(color);
        for (x, y) in region.points() {
            self.framebuffer.write(x, y, packed);
        }
        self.framebuffer.mark_dirty();
        trace!("DisplayDriver: fill wrote {} px at {:?}", region.area(), region);
    }

    fn map_region(&mut self, region: DisplayRegion, colors: &[Rgb565]) {
        self.stats.maps += 1;
        self.write_sequence("map", region, colors);
    }
}

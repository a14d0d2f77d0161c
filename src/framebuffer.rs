// src/framebuffer.rs

//! The full-screen software frame buffer written by the display bridge.

use crate::color::Argb8888;

/// Logical horizontal resolution of the simulated LCD.
pub const SCREEN_WIDTH: usize = 240;
/// Logical vertical resolution of the simulated LCD.
pub const SCREEN_HEIGHT: usize = 320;
/// Number of pixels in one frame.
pub const SCREEN_PIXELS: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

/// Flat `SCREEN_WIDTH` x `SCREEN_HEIGHT` array of packed colors plus a dirty
/// flag.
///
/// Allocated once, zero-initialized, never reallocated. There is no internal
/// synchronization; every access happens on the simulator's single
/// cooperative timeline.
pub struct PixelFrameBuffer {
    pixels: Box<[Argb8888]>,
    dirty: bool,
}

impl PixelFrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: vec![Argb8888::CLEAR; SCREEN_PIXELS].into_boxed_slice(),
            dirty: false,
        }
    }

    /// Linear index of `(x, y)`.
    #[inline]
    pub const fn index_of(x: usize, y: usize) -> usize {
        SCREEN_WIDTH * y + x
    }

    /// Sets one pixel. Coordinates are not checked here beyond the slice
    /// bounds check; callers validate regions first.
    #[inline]
    pub fn write(&mut self, x: usize, y: usize, color: Argb8888) {
        self.pixels[Self::index_of(x, y)] = color;
    }

    #[inline]
    pub fn read(&self, x: usize, y: usize) -> Argb8888 {
        self.pixels[Self::index_of(x, y)]
    }

    /// Read-only view of the whole frame, row-major.
    pub fn snapshot(&self) -> &[Argb8888] {
        &self.pixels
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clears the dirty flag, returning its previous value.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

impl Default for PixelFrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_cleared_and_clean() {
        let fb = PixelFrameBuffer::new();
        assert_eq!(fb.snapshot().len(), SCREEN_PIXELS);
        assert!(fb.snapshot().iter().all(|&p| p == Argb8888::CLEAR));
        assert!(!fb.is_dirty());
    }

    #[test]
    fn write_lands_at_row_major_index() {
        let mut fb = PixelFrameBuffer::new();
        let c = Argb8888::from_rgb(1, 2, 3);
        fb.write(SCREEN_WIDTH - 1, 2, c);
        assert_eq!(fb.snapshot()[SCREEN_WIDTH * 2 + SCREEN_WIDTH - 1], c);
        assert_eq!(fb.read(SCREEN_WIDTH - 1, 2), c);
        assert_eq!(fb.read(0, 3), Argb8888::CLEAR);
    }

    #[test]
    fn take_dirty_clears_flag() {
        let mut fb = PixelFrameBuffer::new();
        fb.mark_dirty();
        assert!(fb.take_dirty());
        assert!(!fb.take_dirty());
        assert!(!fb.is_dirty());
    }
}

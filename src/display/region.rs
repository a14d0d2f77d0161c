// src/display/region.rs
//! Bounding box of a single display-driver write.

use crate::framebuffer::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Inclusive pixel rectangle `(x1, y1)`-`(x2, y2)` in engine coordinates.
///
/// Coordinates are signed because the engine's coordinate type is; a region
/// is only written when [`DisplayRegion::is_on_screen`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRegion {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl DisplayRegion {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// The whole screen.
    pub const fn full_screen() -> Self {
        Self::new(0, 0, SCREEN_WIDTH as i32 - 1, SCREEN_HEIGHT as i32 - 1)
    }

    /// `0 <= x1 <= x2 < W` and `0 <= y1 <= y2 < H`.
    ///
    /// The same rule applies to flush, fill and map; a coordinate equal to
    /// the resolution is out of range for all three.
    pub fn is_on_screen(&self) -> bool {
        let w = SCREEN_WIDTH as i32;
        let h = SCREEN_HEIGHT as i32;
        0 <= self.x1 && self.x1 <= self.x2 && self.x2 < w && 0 <= self.y1 && self.y1 <= self.y2 && self.y2 < h
    }

    /// Width in pixels. Only meaningful for on-screen regions.
    pub fn width(&self) -> usize {
        (self.x2 - self.x1 + 1).max(0) as usize
    }

    /// Height in pixels. Only meaningful for on-screen regions.
    pub fn height(&self) -> usize {
        (self.y2 - self.y1 + 1).max(0) as usize
    }

    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// Smallest region covering both.
    pub fn union(&self, other: &DisplayRegion) -> DisplayRegion {
        DisplayRegion::new(
            self.x1.min(other.x1),
            self.y1.min(other.y1),
            self.x2.max(other.x2),
            self.y2.max(other.y2),
        )
    }

    /// Overlap of two regions, if any.
    pub fn intersect(&self, other: &DisplayRegion) -> Option<DisplayRegion> {
        let r = DisplayRegion::new(
            self.x1.max(other.x1),
            self.y1.max(other.y1),
            self.x2.min(other.x2),
            self.y2.min(other.y2),
        );
        (r.x1 <= r.x2 && r.y1 <= r.y2).then_some(r)
    }

    /// Visits every pixel in row-major order (left to right, top to bottom).
    pub fn points(&self) -> impl Iterator<Item = (usize, usize)> {
        let (x1, x2) = (self.x1.max(0) as usize, self.x2.max(0) as usize);
        let (y1, y2) = (self.y1.max(0) as usize, self.y2.max(0) as usize);
        (y1..=y2).flat_map(move |y| (x1..=x2).map(move |x| (x, y)))
    }
}

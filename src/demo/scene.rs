// src/demo/scene.rs
//! Stopwatch screen layout and per-pixel rendering.
//!
//! Layout, top to bottom: a title band with a stopwatch icon, then the body
//! with a seconds gauge and a seven-segment `MM:SS.cc` readout over a
//! blue-to-navy gradient. A touch marker follows the pressed pointer.

use crate::color::Rgb565;
use crate::display::DisplayRegion;
use crate::framebuffer::{SCREEN_HEIGHT, SCREEN_WIDTH};

pub const TITLE_BAND_HEIGHT: i32 = 30;
pub const TITLE_COLOR: Rgb565 = Rgb565::BLACK;

pub const TITLE_BAND: DisplayRegion = DisplayRegion::new(0, 0, SCREEN_WIDTH as i32 - 1, TITLE_BAND_HEIGHT - 1);
pub const BODY: DisplayRegion =
    DisplayRegion::new(0, TITLE_BAND_HEIGHT, SCREEN_WIDTH as i32 - 1, SCREEN_HEIGHT as i32 - 1);

const ICON_SIZE: i32 = 16;
pub const ICON_AREA: DisplayRegion = DisplayRegion::new(8, 7, 8 + ICON_SIZE - 1, 7 + ICON_SIZE - 1);

const GAUGE_CX: i32 = 120;
const GAUGE_CY: i32 = 150;
const GAUGE_INNER: i32 = 80;
const GAUGE_OUTER: i32 = 95;
/// The scale spans 270 degrees starting at the lower left, clockwise.
const GAUGE_START_DEG: f32 = 135.0;
const GAUGE_SWEEP_DEG: f32 = 270.0;
const GAUGE_RANGE: f32 = 60.0;
pub const GAUGE_AREA: DisplayRegion = DisplayRegion::new(
    GAUGE_CX - GAUGE_OUTER,
    GAUGE_CY - GAUGE_OUTER,
    GAUGE_CX + GAUGE_OUTER,
    GAUGE_CY + GAUGE_OUTER,
);

const DIGIT_W: i32 = 20;
const DIGIT_H: i32 = 36;
const SEPARATOR_W: i32 = 8;
const GLYPH_GAP: i32 = 4;
const SEGMENT: i32 = 4;
const READOUT_Y: i32 = 262;
const READOUT_W: i32 = 6 * DIGIT_W + 2 * SEPARATOR_W + 7 * GLYPH_GAP;
const READOUT_X: i32 = (SCREEN_WIDTH as i32 - READOUT_W) / 2;
pub const READOUT_AREA: DisplayRegion =
    DisplayRegion::new(READOUT_X, READOUT_Y, READOUT_X + READOUT_W - 1, READOUT_Y + DIGIT_H - 1);

pub const MARKER_RADIUS: i32 = 4;

// Segment bits: a b c d e f g.
const DIGIT_SEGMENTS: [u8; 10] = [
    0b111_1110, // 0
    0b011_0000, // 1
    0b110_1101, // 2
    0b111_1001, // 3
    0b011_0011, // 4
    0b101_1011, // 5
    0b101_1111, // 6
    0b111_0000, // 7
    0b111_1111, // 8
    0b111_1011, // 9
];

/// `MM:SS.cc`, minutes wrapping at 60.
pub fn readout_text(elapsed_ms: u32) -> String {
    let minutes = (elapsed_ms / 60_000) % 60;
    let seconds = (elapsed_ms / 1_000) % 60;
    let centis = (elapsed_ms / 10) % 100;
    format!("{:02}:{:02}.{:02}", minutes, seconds, centis)
}

/// Seconds shown on the gauge.
pub fn gauge_value(elapsed_ms: u32) -> u32 {
    (elapsed_ms / 1_000) % 60
}

/// Square around a marker centre, clipped to the body.
pub fn marker_area(x: i32, y: i32) -> Option<DisplayRegion> {
    DisplayRegion::new(x - MARKER_RADIUS, y - MARKER_RADIUS, x + MARKER_RADIUS, y + MARKER_RADIUS).intersect(&BODY)
}

/// What is on screen, as far as rendering is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scene {
    pub elapsed_ms: u32,
    pub marker: Option<(i32, i32)>,
}

impl Scene {
    /// Color of a title band pixel inside [`ICON_AREA`].
    pub fn icon_pixel(&self, x: usize, y: usize) -> Rgb565 {
        let lx = x as i32 - ICON_AREA.x1;
        let ly = y as i32 - ICON_AREA.y1;
        // Crown.
        if ly < 2 && (6..10).contains(&lx) {
            return Rgb565::WHITE;
        }
        // Hand.
        if (7..9).contains(&lx) && (5..10).contains(&ly) {
            return Rgb565::ORANGE;
        }
        // Dial.
        let dx = 2 * lx - 15;
        let dy = 2 * ly - 19;
        let d2 = dx * dx + dy * dy;
        if (9 * 9..=13 * 13).contains(&d2) {
            return Rgb565::WHITE;
        }
        TITLE_COLOR
    }

    /// Color of a body pixel.
    pub fn body_pixel(&self, x: usize, y: usize) -> Rgb565 {
        let (x, y) = (x as i32, y as i32);
        if let Some((mx, my)) = self.marker {
            if (x - mx).abs() <= MARKER_RADIUS && (y - my).abs() <= MARKER_RADIUS {
                return Rgb565::WHITE;
            }
        }
        if self.readout_lit(x, y) {
            return Rgb565::WHITE;
        }
        if let Some(lit) = self.gauge_mark(x, y) {
            return if lit { Rgb565::ORANGE } else { Rgb565::SILVER };
        }
        gradient(y)
    }

    /// `Some(lit)` when the pixel is on one of the gauge's scale marks.
    fn gauge_mark(&self, x: i32, y: i32) -> Option<bool> {
        let (dx, dy) = (x - GAUGE_CX, y - GAUGE_CY);
        let d2 = dx * dx + dy * dy;
        if !(GAUGE_INNER * GAUGE_INNER..=GAUGE_OUTER * GAUGE_OUTER).contains(&d2) {
            return None;
        }
        let angle = (dy as f32).atan2(dx as f32).to_degrees();
        let offset = (angle - GAUGE_START_DEG).rem_euclid(360.0);
        if offset > GAUGE_SWEEP_DEG {
            return None;
        }
        let value = offset / GAUGE_SWEEP_DEG * GAUGE_RANGE;
        if value.fract() >= 0.5 {
            return None;
        }
        Some((value as u32) < gauge_value(self.elapsed_ms))
    }

    fn readout_lit(&self, x: i32, y: i32) -> bool {
        if !(READOUT_AREA.y1..=READOUT_AREA.y2).contains(&y) || !(READOUT_AREA.x1..=READOUT_AREA.x2).contains(&x) {
            return false;
        }
        let ly = y - READOUT_Y;
        let mut gx = READOUT_X;
        for ch in readout_text(self.elapsed_ms).chars() {
            let width = if ch.is_ascii_digit() { DIGIT_W } else { SEPARATOR_W };
            if (gx..gx + width).contains(&x) {
                let lx = x - gx;
                return match ch.to_digit(10) {
                    Some(d) => segment_lit(DIGIT_SEGMENTS[d as usize], lx, ly),
                    None => separator_lit(ch, lx, ly),
                };
            }
            gx += width + GLYPH_GAP;
        }
        false
    }
}

fn gradient(y: i32) -> Rgb565 {
    let span = BODY.y2 - BODY.y1;
    let t = (y - BODY.y1).clamp(0, span);
    let blue = 0xFF - t * 0x7F / span;
    Rgb565::new(0, 0, blue as u8)
}

fn segment_lit(bits: u8, lx: i32, ly: i32) -> bool {
    let half = DIGIT_H / 2;
    let horizontal = (SEGMENT / 2..DIGIT_W - SEGMENT / 2).contains(&lx);
    let left = lx < SEGMENT;
    let right = lx >= DIGIT_W - SEGMENT;
    let upper = (SEGMENT / 2..half).contains(&ly);
    let lower = (half..DIGIT_H - SEGMENT / 2).contains(&ly);
    let on = |bit: u8| bits & (1 << (6 - bit)) != 0;

    (on(0) && horizontal && ly < SEGMENT)
        || (on(1) && right && upper)
        || (on(2) && right && lower)
        || (on(3) && horizontal && ly >= DIGIT_H - SEGMENT)
        || (on(4) && left && lower)
        || (on(5) && left && upper)
        || (on(6) && horizontal && (half - SEGMENT / 2..half + SEGMENT / 2).contains(&ly))
}

fn separator_lit(ch: char, lx: i32, ly: i32) -> bool {
    let dot = |cy: i32| (2..6).contains(&lx) && (cy..cy + SEGMENT).contains(&ly);
    match ch {
        ':' => dot(DIGIT_H / 4) || dot(3 * DIGIT_H / 4 - SEGMENT),
        '.' => dot(DIGIT_H - SEGMENT),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readout_formats_minutes_seconds_centis() {
        assert_eq!(readout_text(0), "00:00.00");
        assert_eq!(readout_text(62_345), "01:02.34");
        assert_eq!(readout_text(3_600_000 + 5_000), "00:05.00");
    }

    #[test]
    fn layout_regions_are_on_screen_and_disjoint() {
        for region in [TITLE_BAND, BODY, ICON_AREA, GAUGE_AREA, READOUT_AREA] {
            assert!(region.is_on_screen(), "{:?}", region);
        }
        assert!(TITLE_BAND.intersect(&BODY).is_none());
        assert!(GAUGE_AREA.intersect(&READOUT_AREA).is_none());
        assert!(GAUGE_AREA.intersect(&TITLE_BAND).is_none());
        assert_eq!(ICON_AREA.intersect(&TITLE_BAND), Some(ICON_AREA));
    }

    #[test]
    fn gradient_runs_blue_to_navy() {
        let scene = Scene::default();
        assert_eq!(scene.body_pixel(0, BODY.y1 as usize), Rgb565::new(0, 0, 0xFF));
        assert_eq!(scene.body_pixel(0, BODY.y2 as usize), Rgb565::new(0, 0, 0x80));
    }

    #[test]
    fn marker_draws_over_everything() {
        let scene = Scene { elapsed_ms: 0, marker: Some((120, 270)) };
        assert_eq!(scene.body_pixel(120, 270), Rgb565::WHITE);
        assert_eq!(scene.body_pixel(124, 274), Rgb565::WHITE);
        assert_ne!(scene.body_pixel(130, 150), Rgb565::WHITE);
    }

    #[test]
    fn marker_area_is_clipped_to_body() {
        assert_eq!(marker_area(0, 31), Some(DisplayRegion::new(0, 30, 4, 35)));
        assert_eq!(marker_area(120, 10), None);
        assert_eq!(marker_area(239, 319), Some(DisplayRegion::new(235, 315, 239, 319)));
    }

    #[test]
    fn gauge_lights_elapsed_seconds() {
        // Second mark of the scale, just past its start at the lower left.
        let x = GAUGE_CX - 67;
        let y = GAUGE_CY + 56;
        let idle = Scene::default();
        let running = Scene { elapsed_ms: 30_000, marker: None };
        assert_eq!(idle.body_pixel(x as usize, y as usize), Rgb565::SILVER);
        assert_eq!(running.body_pixel(x as usize, y as usize), Rgb565::ORANGE);
    }

    #[test]
    fn gauge_ring_includes_both_radii() {
        // Straight up is the middle mark of the scale.
        let scene = Scene::default();
        assert_eq!(scene.gauge_mark(GAUGE_CX, GAUGE_CY - GAUGE_INNER), Some(false));
        assert_eq!(scene.gauge_mark(GAUGE_CX, GAUGE_CY - GAUGE_OUTER), Some(false));
        assert_eq!(scene.gauge_mark(GAUGE_CX, GAUGE_CY - GAUGE_INNER + 1), None);
        assert_eq!(scene.gauge_mark(GAUGE_CX, GAUGE_CY - GAUGE_OUTER - 1), None);
    }

    #[test]
    fn readout_shows_segments() {
        let scene = Scene::default();
        // Top segment of the first digit '0'.
        assert_eq!(scene.body_pixel((READOUT_X + DIGIT_W / 2) as usize, (READOUT_Y + 1) as usize), Rgb565::WHITE);
        // Middle segment of '0' is dark.
        assert_ne!(
            scene.body_pixel((READOUT_X + DIGIT_W / 2) as usize, (READOUT_Y + DIGIT_H / 2) as usize),
            Rgb565::WHITE
        );
    }

    #[test]
    fn icon_has_dial_and_background() {
        let scene = Scene::default();
        assert_eq!(scene.icon_pixel(ICON_AREA.x1 as usize, ICON_AREA.y1 as usize), TITLE_COLOR);
        assert_eq!(scene.icon_pixel((ICON_AREA.x1 + 7) as usize, (ICON_AREA.y1 + 6) as usize), Rgb565::ORANGE);
    }
}

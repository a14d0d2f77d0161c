// src/input/mod.rs
//! Input half of the engine bridge: the single simulated pointer.
//!
//! Host pointer events overwrite [`PointerState`]; the engine samples it once
//! per dispatcher run through [`InputDriver::read`]. There is no queue, so
//! motion between two polls coalesces and a press released before the next
//! poll is never seen by the engine.

use crate::framebuffer::{SCREEN_HEIGHT, SCREEN_WIDTH};
use log::trace;

/// Press state reported to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerPhase {
    #[default]
    Released,
    Pressed,
}

/// One sample as the engine's input-driver contract expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerData {
    pub x: i32,
    pub y: i32,
    pub state: PointerPhase,
}

impl PointerData {
    pub fn is_pressed(&self) -> bool {
        self.state == PointerPhase::Pressed
    }
}

/// The read half of the input-driver contract.
pub trait InputDriver {
    /// Fill `data` with the current pointer sample.
    ///
    /// Returns `true` when more buffered samples are waiting. Never blocks.
    fn read(&mut self, data: &mut PointerData) -> bool;
}

/// Last reported pointer position and press state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerState {
    pub x: i32,
    pub y: i32,
    pub pressed: bool,
}

/// Holds [`PointerState`] and serves it to the engine.
#[derive(Debug, Default)]
pub struct InputDriverAdapter {
    state: PointerState,
}

impl InputDriverAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PointerState {
        self.state
    }

    pub fn on_pointer_moved(&mut self, x: i32, y: i32) {
        self.set_position(x, y);
    }

    pub fn on_pointer_down(&mut self, x: i32, y: i32) {
        self.set_position(x, y);
        self.state.pressed = true;
    }

    pub fn on_pointer_up(&mut self, x: i32, y: i32) {
        self.set_position(x, y);
        self.state.pressed = false;
    }

    fn set_position(&mut self, x: i32, y: i32) {
        self.state.x = x.clamp(0, SCREEN_WIDTH as i32 - 1);
        self.state.y = y.clamp(0, SCREEN_HEIGHT as i32 - 1);
    }
}

impl InputDriver for InputDriverAdapter {
    fn read(&mut self, data: &mut PointerData) -> bool {
        data.x = self.state.x;
        data.y = self.state.y;
        data.state = if self.state.pressed {
            PointerPhase::Pressed
        } else {
            PointerPhase::Released
        };
        trace!("InputDriver: read {:?}", data);
        // Single-sample model: nothing is ever buffered behind this one.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(adapter: &mut InputDriverAdapter) -> (PointerData, bool) {
        let mut data = PointerData::default();
        let more = adapter.read(&mut data);
        (data, more)
    }

    #[test_log::test]
    fn read_is_idempotent_without_events() {
        let mut adapter = InputDriverAdapter::new();
        adapter.on_pointer_down(17, 42);

        let first = sample(&mut adapter);
        let second = sample(&mut adapter);

        assert_eq!(first, second);
        assert_eq!(first.0, PointerData { x: 17, y: 42, state: PointerPhase::Pressed });
        assert!(!first.1);
    }

    #[test_log::test]
    fn last_move_wins() {
        let mut adapter = InputDriverAdapter::new();
        adapter.on_pointer_moved(5, 5);
        adapter.on_pointer_moved(9, 2);

        let (data, _) = sample(&mut adapter);
        assert_eq!((data.x, data.y), (9, 2));
    }

    #[test_log::test]
    fn press_and_release_between_polls_is_coalesced() {
        let mut adapter = InputDriverAdapter::new();
        adapter.on_pointer_down(30, 30);
        adapter.on_pointer_up(31, 32);

        let (data, _) = sample(&mut adapter);
        assert_eq!(data, PointerData { x: 31, y: 32, state: PointerPhase::Released });
    }

    #[test_log::test]
    fn position_tracks_moves_while_pressed() {
        let mut adapter = InputDriverAdapter::new();
        adapter.on_pointer_down(1, 1);
        adapter.on_pointer_moved(100, 120);

        let (data, _) = sample(&mut adapter);
        assert!(data.is_pressed());
        assert_eq!((data.x, data.y), (100, 120));
    }

    #[test_log::test]
    fn positions_are_clamped_to_screen() {
        let mut adapter = InputDriverAdapter::new();
        adapter.on_pointer_moved(-10, 10_000);
        assert_eq!(adapter.state(), PointerState { x: 0, y: SCREEN_HEIGHT as i32 - 1, pressed: false });

        adapter.on_pointer_moved(SCREEN_WIDTH as i32, -1);
        assert_eq!(adapter.state().x, SCREEN_WIDTH as i32 - 1);
        assert_eq!(adapter.state().y, 0);
    }
}

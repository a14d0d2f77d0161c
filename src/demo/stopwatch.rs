// src/demo/stopwatch.rs
//! Stopwatch application driven by the board's single button.
//!
//! Every transition fires on button release:
//! - Stopped: start running.
//! - Running: pause.
//! - Paused: a short press resumes; a press held for [`LONG_PRESS_MS`] or
//!   longer resets to Stopped.
//!
//! LEDs: green while running, red while paused, both off when stopped.

use crate::controls::{Led, PhysicalControls};
use crate::engine::{Application, UiEngine};
use log::info;

pub const LONG_PRESS_MS: u32 = 400;

/// What the stopwatch needs from the engine besides the engine contract.
pub trait StopwatchFace: UiEngine {
    /// The engine's millisecond time base. Wraps.
    fn ticks(&self) -> u32;
    /// Show `elapsed_ms` on the gauge and the readout.
    fn show_elapsed(&mut self, elapsed_ms: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopwatchState {
    #[default]
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Default)]
pub struct Stopwatch {
    state: StopwatchState,
    elapsed_ms: u32,
    last_ticks: u32,
    last_button_pressed: bool,
    last_button_ticks: u32,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> StopwatchState {
        self.state
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    fn show_leds(&self, controls: &mut dyn PhysicalControls) {
        let (green, red) = match self.state {
            StopwatchState::Stopped => (false, false),
            StopwatchState::Running => (true, false),
            StopwatchState::Paused => (false, true),
        };
        controls.set_led(Led::Green, green);
        controls.set_led(Led::Red, red);
    }

    fn enter(&mut self, state: StopwatchState, controls: &mut dyn PhysicalControls) {
        info!("Stopwatch: {:?} -> {:?} at {} ms", self.state, state, self.elapsed_ms);
        self.state = state;
        self.show_leds(controls);
    }
}

impl<E: StopwatchFace> Application<E> for Stopwatch {
    fn init(&mut self, engine: &mut E, controls: &mut dyn PhysicalControls) {
        self.last_ticks = engine.ticks();
        self.last_button_ticks = self.last_ticks;
        self.last_button_pressed = controls.is_button_pressed();
        engine.show_elapsed(self.elapsed_ms);
        self.show_leds(controls);
    }

    fn update(&mut self, engine: &mut E, controls: &mut dyn PhysicalControls) {
        let ticks = engine.ticks();
        let pressed = controls.is_button_pressed();
        let released = !pressed && self.last_button_pressed;

        match self.state {
            StopwatchState::Stopped => {
                if released {
                    self.enter(StopwatchState::Running, controls);
                }
            }
            StopwatchState::Running => {
                self.elapsed_ms = self.elapsed_ms.wrapping_add(ticks.wrapping_sub(self.last_ticks));
                engine.show_elapsed(self.elapsed_ms);
                if released {
                    self.enter(StopwatchState::Paused, controls);
                }
            }
            StopwatchState::Paused => {
                if released {
                    let held = ticks.wrapping_sub(self.last_button_ticks);
                    if held < LONG_PRESS_MS {
                        self.enter(StopwatchState::Running, controls);
                    } else {
                        self.elapsed_ms = 0;
                        engine.show_elapsed(0);
                        self.enter(StopwatchState::Stopped, controls);
                    }
                }
            }
        }

        if pressed != self.last_button_pressed {
            self.last_button_ticks = ticks;
        }
        self.last_button_pressed = pressed;
        self.last_ticks = ticks;
    }
}

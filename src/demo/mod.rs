// src/demo/mod.rs
//! Built-in engine and application so the simulator runs on its own.
//!
//! - DemoEngine: software UI engine rendering the stopwatch screen
//! - Stopwatch: the board's stopwatch application

pub mod engine;
pub mod scene;
pub mod stopwatch;

pub use engine::DemoEngine;
pub use stopwatch::{Stopwatch, StopwatchFace, StopwatchState, LONG_PRESS_MS};

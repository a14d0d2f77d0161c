// src/host/mod.rs
//! Host side of the simulator: where pointer and button events come from.
//!
//! A host turns its native events into [`HostEvent`]s with coordinates already
//! in simulated-screen pixels. The X11 host (feature `x11-host`) reads them
//! from a window; [`ScriptedHost`] replays a fixed timeline for headless runs.

#[cfg(feature = "x11-host")]
pub mod x11;

use crate::framebuffer::{SCREEN_HEIGHT, SCREEN_WIDTH};
use anyhow::Result;
use log::debug;
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    PointerMoved { x: i32, y: i32 },
    PointerDown { x: i32, y: i32 },
    PointerUp { x: i32, y: i32 },
    ButtonDown,
    ButtonUp,
    CloseRequested,
}

/// Source of host events, polled once per loop iteration.
pub trait HostInput {
    /// Returns every event that arrived up to `now`, oldest first.
    fn poll_events(&mut self, now: Duration) -> Result<Vec<HostEvent>>;
}

/// Replays events at fixed simulation times.
#[derive(Debug, Default)]
pub struct ScriptedHost {
    script: VecDeque<(Duration, HostEvent)>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `event` for delivery once the clock reaches `at`. Events must
    /// be pushed in time order.
    pub fn at(mut self, at: Duration, event: HostEvent) -> Self {
        self.script.push_back((at, event));
        self
    }

    /// Presses and releases the physical button.
    pub fn button_press(self, down_at: Duration, up_at: Duration) -> Self {
        self.at(down_at, HostEvent::ButtonDown).at(up_at, HostEvent::ButtonUp)
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl HostInput for ScriptedHost {
    fn poll_events(&mut self, now: Duration) -> Result<Vec<HostEvent>> {
        let mut due = Vec::new();
        while let Some(&(at, event)) = self.script.front() {
            if at > now {
                break;
            }
            debug!("ScriptedHost: {:?} at {:?}", event, at);
            due.push(event);
            self.script.pop_front();
        }
        Ok(due)
    }
}

/// Maps a point in a `win_w` x `win_h` host window onto the simulated screen,
/// clamped to the screen bounds.
pub fn map_window_point(x: i32, y: i32, win_w: u32, win_h: u32) -> (i32, i32) {
    fn axis(v: i32, window: u32, screen: usize) -> i32 {
        let window = i64::from(window.max(1));
        let scaled = i64::from(v) * screen as i64 / window;
        scaled.clamp(0, screen as i64 - 1) as i32
    }
    (axis(x, win_w, SCREEN_WIDTH), axis(y, win_h, SCREEN_HEIGHT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_events_arrive_when_due() {
        let mut host = ScriptedHost::new()
            .at(Duration::from_millis(10), HostEvent::PointerDown { x: 1, y: 2 })
            .button_press(Duration::from_millis(20), Duration::from_millis(30));

        assert!(host.poll_events(Duration::from_millis(5)).unwrap().is_empty());
        assert_eq!(
            host.poll_events(Duration::from_millis(25)).unwrap(),
            vec![HostEvent::PointerDown { x: 1, y: 2 }, HostEvent::ButtonDown]
        );
        assert_eq!(host.remaining(), 1);
        assert_eq!(host.poll_events(Duration::from_secs(1)).unwrap(), vec![HostEvent::ButtonUp]);
        assert_eq!(host.remaining(), 0);
    }

    #[test]
    fn window_points_scale_down() {
        assert_eq!(map_window_point(0, 0, 480, 640), (0, 0));
        assert_eq!(map_window_point(479, 639, 480, 640), (239, 319));
        assert_eq!(map_window_point(240, 320, 480, 640), (120, 160));
    }

    #[test]
    fn window_points_outside_are_clamped() {
        assert_eq!(map_window_point(-5, 700, 480, 640), (0, 319));
        assert_eq!(map_window_point(10_000, -1, 480, 640), (239, 0));
    }

    #[test]
    fn zero_sized_window_does_not_divide_by_zero() {
        assert_eq!(map_window_point(3, 3, 0, 0), (239, 319));
    }
}

// src/controls.rs

//! Simulated physical controls: one push button and the board LEDs.
//!
//! These sit outside the UI engine's driver protocol. The application logic
//! calls them directly, at any point in its update step.

use log::{debug, info, warn};
use std::fmt;

/// The board's LEDs. The set is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Led {
    Green = 0,
    Red = 1,
}

impl Led {
    pub const COUNT: usize = 2;
    pub const ALL: [Led; Led::COUNT] = [Led::Green, Led::Red];

    /// Maps the identity the firmware passes across its C boundary.
    pub fn from_raw(raw: u32) -> Option<Led> {
        match raw {
            0 => Some(Led::Green),
            1 => Some(Led::Red),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Led {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Led::Green => write!(f, "GREEN"),
            Led::Red => write!(f, "RED"),
        }
    }
}

/// Receives LED changes, e.g. the host window's indicator.
pub trait LedObserver {
    fn on_led_changed(&mut self, which: Led, on: bool);
}

/// Observer for hosts without a visible indicator.
pub struct LoggingLedObserver;

impl LedObserver for LoggingLedObserver {
    fn on_led_changed(&mut self, which: Led, on: bool) {
        info!("LED {} {}", which, if on { "on" } else { "off" });
    }
}

/// What the application logic sees of the board.
pub trait PhysicalControls {
    fn is_button_pressed(&self) -> bool;
    fn set_led(&mut self, which: Led, on: bool);
}

/// Button and LED state, with LED changes forwarded to an observer.
pub struct PhysicalControlsAdapter {
    button_pressed: bool,
    leds: [bool; Led::COUNT],
    observer: Box<dyn LedObserver>,
}

impl PhysicalControlsAdapter {
    pub fn new(observer: Box<dyn LedObserver>) -> Self {
        Self {
            button_pressed: false,
            leds: [false; Led::COUNT],
            observer,
        }
    }

    /// Host-side press/release. Last write wins.
    pub fn on_button(&mut self, pressed: bool) {
        debug!("Controls: button {}", if pressed { "down" } else { "up" });
        self.button_pressed = pressed;
    }

    pub fn led(&self, which: Led) -> bool {
        self.leds[which.index()]
    }

    /// Sets an LED by its raw firmware id (`0` green, `1` red), the form the
    /// board interface passes across its C boundary. Typed callers use
    /// [`PhysicalControls::set_led`]. Unknown ids are a logic fault in the
    /// caller: logged, nothing changes.
    pub fn set_led_raw(&mut self, which: u32, on: bool) {
        match Led::from_raw(which) {
            Some(led) => self.set_led(led, on),
            None => warn!("Controls: set_led for unknown LED id {} ignored", which),
        }
    }
}

impl PhysicalControls for PhysicalControlsAdapter {
    fn is_button_pressed(&self) -> bool {
        self.button_pressed
    }

    fn set_led(&mut self, which: Led, on: bool) {
        self.leds[which.index()] = on;
        self.observer.on_led_changed(which, on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingObserver {
        calls: Rc<RefCell<Vec<(Led, bool)>>>,
    }

    impl LedObserver for RecordingObserver {
        fn on_led_changed(&mut self, which: Led, on: bool) {
            self.calls.borrow_mut().push((which, on));
        }
    }

    fn adapter() -> (PhysicalControlsAdapter, Rc<RefCell<Vec<(Led, bool)>>>) {
        let observer = RecordingObserver::default();
        let calls = observer.calls.clone();
        (PhysicalControlsAdapter::new(Box::new(observer)), calls)
    }

    #[test_log::test]
    fn led_toggle_notifies_twice_in_order() {
        let (mut controls, calls) = adapter();

        controls.set_led(Led::Green, true);
        controls.set_led(Led::Green, false);

        assert_eq!(*calls.borrow(), vec![(Led::Green, true), (Led::Green, false)]);
        assert!(!controls.led(Led::Green));
    }

    #[test_log::test]
    fn repeated_set_still_notifies() {
        let (mut controls, calls) = adapter();

        controls.set_led(Led::Red, true);
        controls.set_led(Led::Red, true);

        assert_eq!(calls.borrow().len(), 2);
        assert!(controls.led(Led::Red));
        assert!(!controls.led(Led::Green));
    }

    #[test_log::test]
    fn unknown_led_is_ignored() {
        let (mut controls, calls) = adapter();

        controls.set_led_raw(7, true);

        assert!(calls.borrow().is_empty());
        assert!(Led::ALL.iter().all(|&led| !controls.led(led)));
    }

    #[test_log::test]
    fn raw_identities_map_to_leds() {
        let (mut controls, calls) = adapter();

        controls.set_led_raw(1, true);

        assert_eq!(*calls.borrow(), vec![(Led::Red, true)]);
    }

    #[test_log::test]
    fn button_reflects_latest_event() {
        let (mut controls, _) = adapter();
        assert!(!controls.is_button_pressed());

        controls.on_button(true);
        assert!(controls.is_button_pressed());
        // Reads do not consume the state.
        assert!(controls.is_button_pressed());

        controls.on_button(false);
        controls.on_button(true);
        assert!(controls.is_button_pressed());
    }
}

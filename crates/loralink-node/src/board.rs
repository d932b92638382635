//! Board I/O interface and button debouncing.

use serde::{Deserialize, Serialize};

/// Front-panel push buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Sw1,
    Sw2,
}

impl Button {
    pub const ALL: [Button; 2] = [Button::Sw1, Button::Sw2];

    pub fn name(&self) -> &'static str {
        match self {
            Button::Sw1 => "sw1",
            Button::Sw2 => "sw2",
        }
    }
}

/// Buzzer, indicator LED and buttons.
pub trait Board {
    /// Sound the buzzer `count` times.
    fn beep(&mut self, count: u8);

    /// Switch the indicator LED.
    fn set_indicator(&mut self, on: bool);

    /// Raw (undebounced) button level.
    fn button_pressed(&mut self, button: Button) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebounceState {
    Released,
    PressPending(u8),
    Pressed,
    ReleasePending(u8),
}

/// Edge detector for one button.
///
/// A level change must be seen on `stable_samples` consecutive polls before it
/// counts. [`ButtonDebouncer::update`] reports `true` exactly once per press,
/// however long the button is held.
#[derive(Debug, Clone)]
pub struct ButtonDebouncer {
    state: DebounceState,
    stable_samples: u8,
}

impl ButtonDebouncer {
    pub fn new(stable_samples: u8) -> Self {
        ButtonDebouncer {
            state: DebounceState::Released,
            stable_samples: stable_samples.max(1),
        }
    }

    /// Feed one raw sample. Returns `true` on a debounced press edge.
    pub fn update(&mut self, level: bool) -> bool {
        use DebounceState::*;

        let (next, pressed) = match (self.state, level) {
            (Released, true) => self.count_towards_press(1),
            (Released, false) => (Released, false),
            (PressPending(n), true) => self.count_towards_press(n + 1),
            (PressPending(_), false) => (Released, false),
            (Pressed, true) => (Pressed, false),
            (Pressed, false) => self.count_towards_release(1),
            (ReleasePending(_), true) => (Pressed, false),
            (ReleasePending(n), false) => self.count_towards_release(n + 1),
        };
        self.state = next;
        pressed
    }

    /// Whether the button is currently considered held.
    pub fn is_pressed(&self) -> bool {
        matches!(self.state, DebounceState::Pressed | DebounceState::ReleasePending(_))
    }

    fn count_towards_press(&self, n: u8) -> (DebounceState, bool) {
        if n >= self.stable_samples {
            (DebounceState::Pressed, true)
        } else {
            (DebounceState::PressPending(n), false)
        }
    }

    fn count_towards_release(&self, n: u8) -> (DebounceState, bool) {
        if n >= self.stable_samples {
            (DebounceState::Released, false)
        } else {
            (DebounceState::ReleasePending(n), false)
        }
    }
}

impl Default for ButtonDebouncer {
    fn default() -> Self {
        ButtonDebouncer::new(2)
    }
}

//! Press/release protocol with hold-to-repeat.
//!
//! Each slot owns one [`RepeatTimers`] table indexed by the combined button
//! index (see [`crate::buttons`]). A table entry is only meaningful while the
//! corresponding button is held.

use crate::config::Settings;
use crate::constants::BUTTON_COUNT;

/// Tolerance when comparing the frame time against a scheduled repeat, so a
/// repeat due at `t` still fires on a frame stamped a hair before `t`.
const REPEAT_EPSILON: f64 = 1e-6;

/// Repeat delays in seconds, copied out of [`Settings`] once.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RepeatDelays {
    pub initial: f64,
    pub repeat: f64,
}

impl Default for RepeatDelays {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for RepeatDelays {
    fn from(settings: &Settings) -> Self {
        Self {
            initial: f64::from(settings.initial_repeat_delay),
            repeat: f64::from(settings.repeat_delay),
        }
    }
}

/// Outcome of feeding one frame's button state through the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonEdge {
    Pressed { repeat: bool },
    Released,
}

/// Per-slot table of next-repeat timestamps.
#[derive(Clone, Debug, PartialEq)]
pub struct RepeatTimers {
    next_repeat_time: [f64; BUTTON_COUNT],
}

impl Default for RepeatTimers {
    fn default() -> Self {
        Self {
            next_repeat_time: [0.0; BUTTON_COUNT],
        }
    }
}

impl RepeatTimers {
    /// Advance the state machine of button `index` by one frame.
    ///
    /// Out-of-range indices never produce an edge.
    pub fn update(
        &mut self,
        index: usize,
        was_down: bool,
        is_down: bool,
        now: f64,
        delays: RepeatDelays,
    ) -> Option<ButtonEdge> {
        let next = self.next_repeat_time.get_mut(index)?;

        if was_down != is_down {
            if is_down {
                *next = now + delays.initial;
                return Some(ButtonEdge::Pressed { repeat: false });
            }
            return Some(ButtonEdge::Released);
        }

        if is_down && now + REPEAT_EPSILON >= *next {
            *next = now + delays.repeat;
            return Some(ButtonEdge::Pressed { repeat: true });
        }

        None
    }

    pub fn next_repeat_time(&self, index: usize) -> Option<f64> {
        self.next_repeat_time.get(index).copied()
    }

    pub fn reset(&mut self) {
        self.next_repeat_time = [0.0; BUTTON_COUNT];
    }

    pub fn is_reset(&self) -> bool {
        self.next_repeat_time.iter().all(|t| *t == 0.0)
    }
}

//! Raw per-frame input snapshots and the pending output state.
//!
//! These are plain value types: the transport fills an [`InputSnapshot`] on every
//! read and consumes an [`OutputState`] on every write. Neither carries any
//! normalization; that happens in [`crate::diff`].

use serde::{Deserialize, Serialize};

/// One analog stick in signed 8-bit units (`-128..=127`, up and right positive).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalogStick {
    pub x: i8,
    pub y: i8,
}

/// Raw motion sensor vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// One touchpad contact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub x: u32,
    pub y: u32,
    pub down: bool,
    pub id: u8,
}

/// Immutable-per-frame hardware input state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub left_stick: AnalogStick,
    pub right_stick: AnalogStick,
    pub left_trigger: u8,
    pub right_trigger: u8,
    /// Button bitmask, see [`crate::buttons`] for the bit layout.
    pub buttons: u32,
    pub touch_point1: TouchPoint,
    pub touch_point2: TouchPoint,
    pub gyroscope: Vec3,
    pub accelerometer: Vec3,
}

impl InputSnapshot {
    #[inline]
    pub fn is_down(&self, mask: u32) -> bool {
        self.buttons & mask != 0
    }
}

/// Lightbar color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Player LED brightness as understood by the hardware.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedBrightness {
    #[default]
    High,
    Medium,
    Low,
}

impl LedBrightness {
    pub fn to_raw(self) -> u8 {
        match self {
            LedBrightness::High => 0x00,
            LedBrightness::Medium => 0x01,
            LedBrightness::Low => 0x02,
        }
    }
}

pub const PLAYER_LED_LEFT: u8 = 0x01;
pub const PLAYER_LED_MIDDLE_LEFT: u8 = 0x02;
pub const PLAYER_LED_MIDDLE: u8 = 0x04;
pub const PLAYER_LED_MIDDLE_RIGHT: u8 = 0x08;
pub const PLAYER_LED_RIGHT: u8 = 0x10;

/// Player indicator LEDs below the touchpad.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLeds {
    /// Combination of the `PLAYER_LED_*` bits.
    pub mask: u8,
    pub fade: bool,
    pub brightness: LedBrightness,
}

/// Program running on one adaptive trigger.
///
/// Exactly one payload is active at a time. [`TriggerEffect::Vibration`] is
/// representable so that hardware state can be described faithfully, but no
/// output property ever produces it (see [`crate::output`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerEffect {
    #[default]
    NoResistance,
    Continuous {
        start_position: u8,
        force: u8,
    },
    Section {
        start_position: u8,
        end_position: u8,
    },
    ReleaseAll,
    Vibration {
        start_position: u8,
        keep_effect: bool,
        begin_force: u8,
        middle_force: u8,
        end_force: u8,
        frequency: u8,
    },
}

/// Everything the coalescer writes to a device in one go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputState {
    pub left_rumble: u8,
    pub right_rumble: u8,
    pub lightbar: Color,
    pub player_leds: PlayerLeds,
    pub left_trigger_effect: TriggerEffect,
    pub right_trigger_effect: TriggerEffect,
}

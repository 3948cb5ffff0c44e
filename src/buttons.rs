//! Logical controls and the hardware bit layout behind them.
//!
//! The raw snapshot reports buttons as a single `u32` bitmask. [`REGULAR_BUTTONS`]
//! maps those bits onto logical [`ButtonId`]s in a fixed order; that order is
//! load-bearing because a button's position in the combined table is also its
//! index into the per-slot repeat-timer table:
//!
//! | indices | source |
//! |---------|--------|
//! | `0..19` | [`REGULAR_BUTTONS`] in table order |
//! | `19..27` | [`VIRTUAL_BUTTONS`] (stick directions) |
//! | `27..29` | [`TOUCH_BUTTONS`] (touch point down flags) |

use serde::{Deserialize, Serialize};

pub const BTN_DPAD_LEFT: u32 = 0x01;
pub const BTN_DPAD_DOWN: u32 = 0x02;
pub const BTN_DPAD_RIGHT: u32 = 0x04;
pub const BTN_DPAD_UP: u32 = 0x08;

pub const BTN_SQUARE: u32 = 0x10;
pub const BTN_CROSS: u32 = 0x20;
pub const BTN_CIRCLE: u32 = 0x40;
pub const BTN_TRIANGLE: u32 = 0x80;

pub const BTN_BUMPER_LEFT: u32 = 0x0100;
pub const BTN_BUMPER_RIGHT: u32 = 0x0200;
pub const BTN_TRIGGER_LEFT: u32 = 0x0400;
pub const BTN_TRIGGER_RIGHT: u32 = 0x0800;

pub const BTN_SELECT: u32 = 0x1000;
pub const BTN_MENU: u32 = 0x2000;

pub const BTN_STICK_LEFT: u32 = 0x4000;
pub const BTN_STICK_RIGHT: u32 = 0x8000;

pub const BTN_PLAYSTATION_LOGO: u32 = 0x01_0000;
pub const BTN_PAD_BUTTON: u32 = 0x02_0000;
pub const BTN_MIC_BUTTON: u32 = 0x04_0000;

/// Every button-like control the engine reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonId {
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    FaceButtonTop,
    FaceButtonBottom,
    FaceButtonLeft,
    FaceButtonRight,
    LeftTriggerThreshold,
    RightTriggerThreshold,
    LeftShoulder,
    RightShoulder,
    LeftThumb,
    RightThumb,
    SpecialLeft,
    SpecialRight,
    Touchpad,
    Logo,
    Mute,
    LeftStickUp,
    LeftStickDown,
    LeftStickLeft,
    LeftStickRight,
    RightStickUp,
    RightStickDown,
    RightStickLeft,
    RightStickRight,
    Touch1,
    Touch2,
}

/// Every analog channel the engine reports.
///
/// Stick values are normalized to `[-1, 1]`, triggers to `[0, 1]`, gyroscope
/// components are scaled raw readings and touch axes carry raw positional deltas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisId {
    LeftStickX,
    LeftStickY,
    RightStickX,
    RightStickY,
    LeftTrigger,
    RightTrigger,
    GyroPitch,
    GyroYaw,
    GyroRoll,
    Touch1X,
    Touch1Y,
    Touch2X,
    Touch2Y,
}

/// Hardware bit → logical button, in repeat-timer index order.
pub const REGULAR_BUTTONS: [(ButtonId, u32); 19] = [
    (ButtonId::DPadUp, BTN_DPAD_UP),
    (ButtonId::DPadDown, BTN_DPAD_DOWN),
    (ButtonId::DPadLeft, BTN_DPAD_LEFT),
    (ButtonId::DPadRight, BTN_DPAD_RIGHT),
    (ButtonId::FaceButtonTop, BTN_TRIANGLE),
    (ButtonId::FaceButtonBottom, BTN_CROSS),
    (ButtonId::FaceButtonLeft, BTN_SQUARE),
    (ButtonId::FaceButtonRight, BTN_CIRCLE),
    (ButtonId::LeftTriggerThreshold, BTN_TRIGGER_LEFT),
    (ButtonId::RightTriggerThreshold, BTN_TRIGGER_RIGHT),
    (ButtonId::LeftShoulder, BTN_BUMPER_LEFT),
    (ButtonId::RightShoulder, BTN_BUMPER_RIGHT),
    (ButtonId::LeftThumb, BTN_STICK_LEFT),
    (ButtonId::RightThumb, BTN_STICK_RIGHT),
    (ButtonId::SpecialLeft, BTN_SELECT),
    (ButtonId::SpecialRight, BTN_MENU),
    (ButtonId::Touchpad, BTN_PAD_BUTTON),
    (ButtonId::Logo, BTN_PLAYSTATION_LOGO),
    (ButtonId::Mute, BTN_MIC_BUTTON),
];

/// Which stick a virtual direction button reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stick {
    Left,
    Right,
}

/// Direction a stick must cross the dead zone in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Virtual stick-direction buttons, in repeat-timer index order.
pub const VIRTUAL_BUTTONS: [(ButtonId, Stick, Direction); 8] = [
    (ButtonId::LeftStickUp, Stick::Left, Direction::Up),
    (ButtonId::LeftStickDown, Stick::Left, Direction::Down),
    (ButtonId::LeftStickLeft, Stick::Left, Direction::Left),
    (ButtonId::LeftStickRight, Stick::Left, Direction::Right),
    (ButtonId::RightStickUp, Stick::Right, Direction::Up),
    (ButtonId::RightStickDown, Stick::Right, Direction::Down),
    (ButtonId::RightStickLeft, Stick::Right, Direction::Left),
    (ButtonId::RightStickRight, Stick::Right, Direction::Right),
];

/// Touch-down buttons, one per touch point, in repeat-timer index order.
pub const TOUCH_BUTTONS: [ButtonId; 2] = [ButtonId::Touch1, ButtonId::Touch2];

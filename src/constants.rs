//! Fixed capacities and thresholds shared by every component.

/// Number of device slots. Slot storage is a fixed array of this length.
pub const MAX_DEVICES: usize = 4;

/// Size of the per-slot repeat-timer table: 19 regular buttons, 8 virtual
/// stick-direction buttons and 2 touch-down buttons.
pub const BUTTON_COUNT: usize = 29;

/// Stick magnitude (signed 8-bit units) above which an axis is reported every
/// frame and a virtual stick-direction button counts as held.
pub const STICK_DEAD_ZONE: i8 = 30;

/// Trigger value (unsigned 8-bit units) above which a trigger is reported every frame.
pub const TRIGGER_DEAD_ZONE: u8 = 30;

/// Scale applied to raw gyroscope components before they are reported.
pub const GYRO_SCALE: f32 = 0.0001;

/// Upper bound of the section-resistance trigger positions.
pub const MAX_SECTION_POSITION: f32 = 9.0;

//! Output coalescing.
//!
//! Haptics, lighting and trigger effects are requested independently and
//! merged into one pending [`OutputState`] per slot. Every writer reports
//! whether the effective state changed; the caller folds that into the slot's
//! dirty flag so hardware is only written when something actually differs.

use crate::config::TriggerLimits;
use crate::constants::MAX_SECTION_POSITION;
use crate::state::{Color, LedBrightness, OutputState, PlayerLeds, TriggerEffect};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One of the four independent force-feedback magnitudes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForceFeedbackChannel {
    LeftLarge,
    LeftSmall,
    RightLarge,
    RightSmall,
}

/// All four channel magnitudes, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceFeedbackValues {
    pub left_large: f32,
    pub left_small: f32,
    pub right_large: f32,
    pub right_small: f32,
}

/// Last requested magnitude of every channel, quantized to 8 bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceFeedbackChannels {
    pub left_large: u8,
    pub left_small: u8,
    pub right_large: u8,
    pub right_small: u8,
}

impl ForceFeedbackChannels {
    fn set(&mut self, channel: ForceFeedbackChannel, value: u8) {
        match channel {
            ForceFeedbackChannel::LeftLarge => self.left_large = value,
            ForceFeedbackChannel::LeftSmall => self.left_small = value,
            ForceFeedbackChannel::RightLarge => self.right_large = value,
            ForceFeedbackChannel::RightSmall => self.right_small = value,
        }
    }

    /// Effective motor strength per side: the larger of the two channels.
    pub fn rumble(&self) -> (u8, u8) {
        (
            self.left_large.max(self.left_small),
            self.right_large.max(self.right_small),
        )
    }
}

/// Set of triggers a trigger property applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerMask(u8);

impl TriggerMask {
    pub const NONE: TriggerMask = TriggerMask(0);
    pub const LEFT: TriggerMask = TriggerMask(0b01);
    pub const RIGHT: TriggerMask = TriggerMask(0b10);
    pub const BOTH: TriggerMask = TriggerMask(0b11);

    pub fn contains(self, other: TriggerMask) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for TriggerMask {
    type Output = TriggerMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        TriggerMask(self.0 | rhs.0)
    }
}

/// High-level output request addressed to one slot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum DeviceProperty {
    /// Lightbar color; a disabled light is black.
    LightColor { enable: bool, color: Color },
    PlayerLeds {
        mask: u8,
        fade: bool,
        brightness: LedBrightness,
    },
    /// Drop any trigger program on the affected sides.
    TriggerReset { affected: TriggerMask },
    /// Continuous resistance from `position` on, with `strength`.
    TriggerFeedback {
        affected: TriggerMask,
        position: u32,
        strength: u32,
    },
    /// Resistance between two positions. Strengths are accepted but not
    /// representable on the hardware and are ignored.
    TriggerResistance {
        affected: TriggerMask,
        start_position: u32,
        end_position: u32,
        start_strength: u32,
        end_strength: u32,
    },
    /// Vibration while the trigger is held. Never applied.
    TriggerVibration {
        affected: TriggerMask,
        trigger_position: u32,
        frequency: u32,
        amplitude: u32,
    },
}

/// Result of an output request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyOutcome {
    /// The request was merged into the pending state.
    Applied { changed: bool },
    /// The request has no faithful hardware encoding and was dropped.
    Unsupported,
    /// No connected device at the addressed slot.
    Ignored,
}

impl PropertyOutcome {
    pub fn changed(self) -> bool {
        matches!(self, PropertyOutcome::Applied { changed: true })
    }
}

/// Quantize a `[0, 1]` magnitude to 8 bits. Out-of-range input saturates.
#[inline]
pub fn quantize_magnitude(value: f32) -> u8 {
    (value * 255.0) as u8
}

/// Scale `value` from `[0, max]` into the 8-bit range; a non-positive maximum
/// maps everything to `0`.
#[inline]
pub fn scale_to_u8(value: f32, max: f32) -> u8 {
    if max > 0.0 {
        (value / max * 255.0) as u8
    } else {
        0
    }
}

fn store_rumble(output: &mut OutputState, channels: &ForceFeedbackChannels) -> bool {
    let (left, right) = channels.rumble();
    let changed = output.left_rumble != left || output.right_rumble != right;
    output.left_rumble = left;
    output.right_rumble = right;
    changed
}

/// Set a single force-feedback channel. Returns whether the effective rumble changed.
pub fn apply_channel_value(
    output: &mut OutputState,
    channels: &mut ForceFeedbackChannels,
    channel: ForceFeedbackChannel,
    value: f32,
) -> bool {
    channels.set(channel, quantize_magnitude(value));
    store_rumble(output, channels)
}

/// Set all four force-feedback channels at once.
pub fn apply_channel_values(
    output: &mut OutputState,
    channels: &mut ForceFeedbackChannels,
    values: &ForceFeedbackValues,
) -> bool {
    *channels = ForceFeedbackChannels {
        left_large: quantize_magnitude(values.left_large),
        left_small: quantize_magnitude(values.left_small),
        right_large: quantize_magnitude(values.right_large),
        right_small: quantize_magnitude(values.right_small),
    };
    store_rumble(output, channels)
}

/// Replace the effect of every side in `affected`; returns whether any changed.
fn update_triggers(output: &mut OutputState, affected: TriggerMask, effect: TriggerEffect) -> bool {
    let mut changed = false;
    if affected.contains(TriggerMask::LEFT) {
        changed |= output.left_trigger_effect != effect;
        output.left_trigger_effect = effect;
    }
    if affected.contains(TriggerMask::RIGHT) {
        changed |= output.right_trigger_effect != effect;
        output.right_trigger_effect = effect;
    }
    changed
}

/// Merge `property` into `output`.
pub fn apply_property(
    output: &mut OutputState,
    property: &DeviceProperty,
    limits: &TriggerLimits,
) -> PropertyOutcome {
    let changed = match *property {
        DeviceProperty::LightColor { enable, color } => {
            let color = if enable { color } else { Color::BLACK };
            let changed = output.lightbar != color;
            output.lightbar = color;
            changed
        }
        DeviceProperty::PlayerLeds {
            mask,
            fade,
            brightness,
        } => {
            let leds = PlayerLeds {
                mask,
                fade,
                brightness,
            };
            let changed = output.player_leds != leds;
            output.player_leds = leds;
            changed
        }
        DeviceProperty::TriggerReset { affected } => {
            update_triggers(output, affected, TriggerEffect::ReleaseAll)
        }
        DeviceProperty::TriggerFeedback {
            affected,
            position,
            strength,
        } => {
            let effect = TriggerEffect::Continuous {
                start_position: scale_to_u8(position as f32, limits.max_feedback_position as f32),
                force: scale_to_u8(strength as f32, limits.max_feedback_strength as f32),
            };
            update_triggers(output, affected, effect)
        }
        DeviceProperty::TriggerResistance {
            affected,
            start_position,
            end_position,
            ..
        } => {
            let effect = TriggerEffect::Section {
                start_position: scale_to_u8(start_position as f32, MAX_SECTION_POSITION),
                end_position: scale_to_u8(end_position as f32, MAX_SECTION_POSITION),
            };
            update_triggers(output, affected, effect)
        }
        DeviceProperty::TriggerVibration { affected, .. } => {
            debug!(?affected, "trigger vibration is not supported; request dropped");
            return PropertyOutcome::Unsupported;
        }
    };
    PropertyOutcome::Applied { changed }
}

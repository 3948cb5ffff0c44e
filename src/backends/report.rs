//! DualSense HID report layout.
//!
//! Input arrives as report `0x01` over USB (64 bytes) or `0x31` over Bluetooth
//! (78 bytes, one extra header byte). Both carry the same payload:
//!
//! | offset | field |
//! |--------|-------|
//! | 0..4   | left X/Y, right X/Y (unsigned, 0x80 centered, Y grows downwards) |
//! | 4..6   | left/right trigger |
//! | 7      | D-pad hat (low nibble), face buttons (high nibble) |
//! | 8      | shoulders, trigger clicks, create/options, stick clicks |
//! | 9      | PS, touchpad click, mute |
//! | 15..21 | gyroscope X/Y/Z, little-endian `i16` |
//! | 21..27 | accelerometer X/Y/Z, little-endian `i16` |
//! | 32..40 | two touch contacts, 4 bytes each |
//!
//! Output is report `0x02` over USB and `0x31` over Bluetooth; the Bluetooth
//! variant ends in a CRC32 seeded with the `0xA2` transaction header.

use crate::buttons::{BTN_DPAD_DOWN, BTN_DPAD_LEFT, BTN_DPAD_RIGHT, BTN_DPAD_UP};
use crate::error::TransportError;
use crate::state::{AnalogStick, InputSnapshot, OutputState, TouchPoint, TriggerEffect, Vec3};
use crate::transport::ConnectionKind;

pub const USB_INPUT_REPORT_ID: u8 = 0x01;
pub const USB_INPUT_REPORT_LEN: usize = 64;
pub const BT_INPUT_REPORT_ID: u8 = 0x31;
pub const BT_INPUT_REPORT_LEN: usize = 78;

pub const USB_OUTPUT_REPORT_ID: u8 = 0x02;
pub const USB_OUTPUT_REPORT_LEN: usize = 48;
pub const BT_OUTPUT_REPORT_ID: u8 = 0x31;
pub const BT_OUTPUT_REPORT_LEN: usize = 78;

/// Reading this feature report switches a Bluetooth controller to full reports.
pub const CALIBRATION_FEATURE_REPORT_ID: u8 = 0x05;
pub const CALIBRATION_FEATURE_REPORT_LEN: usize = 41;

const PAYLOAD_LEN: usize = 40;
const COMMON_LEN: usize = 47;
const TRIGGER_EFFECT_LEN: usize = 11;
const BT_CRC_SEED: u8 = 0xA2;

// Offsets within the common output block.
const OUT_VALID_FLAG0: usize = 0;
const OUT_VALID_FLAG1: usize = 1;
const OUT_MOTOR_RIGHT: usize = 2;
const OUT_MOTOR_LEFT: usize = 3;
const OUT_RIGHT_TRIGGER: usize = 10;
const OUT_LEFT_TRIGGER: usize = 21;
const OUT_VALID_FLAG2: usize = 38;
const OUT_LED_BRIGHTNESS: usize = 42;
const OUT_PLAYER_LEDS: usize = 43;
const OUT_LIGHTBAR: usize = 44;

const FLAG0_COMPATIBLE_VIBRATION: u8 = 0x01;
const FLAG0_HAPTICS_SELECT: u8 = 0x02;
const FLAG0_RIGHT_TRIGGER: u8 = 0x04;
const FLAG0_LEFT_TRIGGER: u8 = 0x08;
const FLAG1_LIGHTBAR: u8 = 0x04;
const FLAG1_PLAYER_INDICATOR: u8 = 0x10;
const FLAG2_LED_BRIGHTNESS: u8 = 0x01;
const PLAYER_LEDS_INSTANT: u8 = 0x20;

/// Hat value → D-pad bits. Index 8 (and anything above) is neutral.
const HAT_TO_DPAD: [u32; 8] = [
    BTN_DPAD_UP,
    BTN_DPAD_UP | BTN_DPAD_RIGHT,
    BTN_DPAD_RIGHT,
    BTN_DPAD_DOWN | BTN_DPAD_RIGHT,
    BTN_DPAD_DOWN,
    BTN_DPAD_DOWN | BTN_DPAD_LEFT,
    BTN_DPAD_LEFT,
    BTN_DPAD_UP | BTN_DPAD_LEFT,
];

/// Decode one raw input report (report id included).
pub fn parse_input(report: &[u8]) -> Result<InputSnapshot, TransportError> {
    let payload = match report.first() {
        Some(&USB_INPUT_REPORT_ID) if report.len() >= USB_INPUT_REPORT_LEN => &report[1..],
        Some(&BT_INPUT_REPORT_ID) if report.len() >= BT_INPUT_REPORT_LEN => &report[2..],
        Some(id) => {
            return Err(TransportError::MalformedReport(format!(
                "unexpected input report 0x{id:02x} of {} bytes",
                report.len()
            )))
        }
        None => return Err(TransportError::MalformedReport("empty report".into())),
    };
    Ok(parse_payload(&payload[..PAYLOAD_LEN]))
}

fn parse_payload(p: &[u8]) -> InputSnapshot {
    let i16_at = |i: usize| i32::from(i16::from_le_bytes([p[i], p[i + 1]]));
    let vec_at = |i: usize| Vec3 {
        x: i16_at(i),
        y: i16_at(i + 2),
        z: i16_at(i + 4),
    };

    let hat = usize::from(p[7] & 0x0F);
    let mut buttons = HAT_TO_DPAD.get(hat).copied().unwrap_or(0);
    buttons |= u32::from(p[7] & 0xF0);
    buttons |= u32::from(p[8]) << 8;
    buttons |= u32::from(p[9] & 0x07) << 16;

    InputSnapshot {
        left_stick: stick(p[0], p[1]),
        right_stick: stick(p[2], p[3]),
        left_trigger: p[4],
        right_trigger: p[5],
        buttons,
        touch_point1: touch(&p[32..36]),
        touch_point2: touch(&p[36..40]),
        gyroscope: vec_at(15),
        accelerometer: vec_at(21),
    }
}

/// Center the raw axes and flip Y so up is positive.
fn stick(x: u8, y: u8) -> AnalogStick {
    AnalogStick {
        x: (i16::from(x) - 128) as i8,
        y: (128 - i16::from(y)).min(i16::from(i8::MAX)) as i8,
    }
}

fn touch(b: &[u8]) -> TouchPoint {
    TouchPoint {
        down: b[0] & 0x80 == 0,
        id: b[0] & 0x7F,
        x: u32::from(b[1]) | (u32::from(b[2] & 0x0F) << 8),
        y: u32::from(b[2] >> 4) | (u32::from(b[3]) << 4),
    }
}

fn encode_trigger_effect(effect: &TriggerEffect, out: &mut [u8]) {
    match *effect {
        TriggerEffect::NoResistance => out[0] = 0x00,
        TriggerEffect::Continuous {
            start_position,
            force,
        } => {
            out[0] = 0x01;
            out[1] = start_position;
            out[2] = force;
        }
        TriggerEffect::Section {
            start_position,
            end_position,
        } => {
            out[0] = 0x02;
            out[1] = start_position;
            out[2] = end_position;
        }
        TriggerEffect::ReleaseAll => out[0] = 0x05,
        TriggerEffect::Vibration {
            start_position,
            keep_effect,
            begin_force,
            middle_force,
            end_force,
            frequency,
        } => {
            out[0] = 0x26;
            out[1] = 0xFF - start_position;
            out[2] = if keep_effect { 0x02 } else { 0x00 };
            out[4] = begin_force;
            out[5] = middle_force;
            out[6] = end_force;
            out[9] = (frequency / 2).max(1);
        }
    }
}

fn encode_common(output: &OutputState, out: &mut [u8]) {
    out[OUT_VALID_FLAG0] =
        FLAG0_COMPATIBLE_VIBRATION | FLAG0_HAPTICS_SELECT | FLAG0_RIGHT_TRIGGER | FLAG0_LEFT_TRIGGER;
    out[OUT_VALID_FLAG1] = FLAG1_LIGHTBAR | FLAG1_PLAYER_INDICATOR;
    out[OUT_VALID_FLAG2] = FLAG2_LED_BRIGHTNESS;

    out[OUT_MOTOR_RIGHT] = output.right_rumble;
    out[OUT_MOTOR_LEFT] = output.left_rumble;

    encode_trigger_effect(
        &output.right_trigger_effect,
        &mut out[OUT_RIGHT_TRIGGER..OUT_RIGHT_TRIGGER + TRIGGER_EFFECT_LEN],
    );
    encode_trigger_effect(
        &output.left_trigger_effect,
        &mut out[OUT_LEFT_TRIGGER..OUT_LEFT_TRIGGER + TRIGGER_EFFECT_LEN],
    );

    let leds = &output.player_leds;
    out[OUT_LED_BRIGHTNESS] = leds.brightness.to_raw();
    out[OUT_PLAYER_LEDS] = (leds.mask & 0x1F) | if leds.fade { 0 } else { PLAYER_LEDS_INSTANT };

    out[OUT_LIGHTBAR] = output.lightbar.r;
    out[OUT_LIGHTBAR + 1] = output.lightbar.g;
    out[OUT_LIGHTBAR + 2] = output.lightbar.b;
}

/// Encode a full output report for the given connection.
///
/// `sequence` only matters over Bluetooth, where its low 4 bits tag the report.
pub fn encode_output(output: &OutputState, connection: ConnectionKind, sequence: u8) -> Vec<u8> {
    match connection {
        ConnectionKind::Usb => {
            let mut report = vec![0u8; USB_OUTPUT_REPORT_LEN];
            report[0] = USB_OUTPUT_REPORT_ID;
            encode_common(output, &mut report[1..1 + COMMON_LEN]);
            report
        }
        ConnectionKind::Bluetooth => {
            let mut report = vec![0u8; BT_OUTPUT_REPORT_LEN];
            report[0] = BT_OUTPUT_REPORT_ID;
            report[1] = (sequence & 0x0F) << 4;
            report[2] = 0x10;
            encode_common(output, &mut report[3..3 + COMMON_LEN]);

            let crc_at = BT_OUTPUT_REPORT_LEN - 4;
            let crc = bluetooth_crc(&report[..crc_at]);
            report[crc_at..].copy_from_slice(&crc.to_le_bytes());
            report
        }
    }
}

/// CRC32 over the `0xA2` output transaction header followed by `data`.
pub fn bluetooth_crc(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&[BT_CRC_SEED]);
    hasher.update(data);
    hasher.finalize()
}

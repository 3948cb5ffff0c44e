//! `hidapi`-backed DualSense transport.
//!
//! [`HidTransport`] implements [`Transport`] for Sony DualSense and DualSense
//! Edge controllers on any platform `hidapi` supports. It is responsible for:
//! - filtering the HID device list down to supported controllers
//! - deriving a stable, non-zero `unique_id` from the device path
//! - switching Bluetooth controllers to full input reports on connect
//! - draining a bounded number of reports per read and decoding the latest
//! - encoding and writing output reports
//!
//! Report byte layout lives in [`super::report`].

use super::report::{
    encode_output, parse_input, BT_INPUT_REPORT_LEN, CALIBRATION_FEATURE_REPORT_ID,
    CALIBRATION_FEATURE_REPORT_LEN,
};
use crate::error::TransportError;
use crate::metadata::{DeviceMeta, DUALSENSE_EDGE_PID, DUALSENSE_PID};
use crate::state::{InputSnapshot, OutputState};
use crate::transport::{ConnectionKind, DeviceDescriptor, Transport};
use hidapi::{BusType, DeviceInfo, HidApi, HidDevice};
use std::ffi::CString;
use tracing::{debug, trace};

pub const SONY_VENDOR_ID: u16 = 0x054C;

/// Upper bound on a blocking read, in milliseconds.
const READ_TIMEOUT_MS: i32 = 100;

/// Maximum number of queued reports drained per read.
///
/// Only the newest report is decoded; older ones are stale by the time the
/// host polls again.
const MAX_REPORTS_PER_TICK: usize = 32;

fn hid_error(err: hidapi::HidError) -> TransportError {
    TransportError::Hid(err.to_string())
}

fn is_supported(info: &DeviceInfo) -> bool {
    info.vendor_id() == SONY_VENDOR_ID
        && matches!(
            info.product_id(),
            DUALSENSE_PID | DUALSENSE_EDGE_PID
        )
}

/// Stable id derived from the OS path. Never `0`.
pub fn unique_id_for_path(path: &[u8]) -> u32 {
    match crc32fast::hash(path) {
        0 => 1,
        id => id,
    }
}

fn descriptor_for(info: &DeviceInfo) -> DeviceDescriptor {
    let path = info.path().to_string_lossy().into_owned();
    let connection = match info.bus_type() {
        BusType::Bluetooth => ConnectionKind::Bluetooth,
        _ => ConnectionKind::Usb,
    };
    DeviceDescriptor {
        unique_id: unique_id_for_path(info.path().to_bytes()),
        path,
        connection,
        meta: DeviceMeta {
            vid: Some(info.vendor_id()),
            pid: Some(info.product_id()),
            product_string: info.product_string().map(str::to_string),
            serial_number: info.serial_number().map(str::to_string),
            interface_number: Some(info.interface_number()),
        },
    }
}

/// Open DualSense connection.
pub struct HidHandle {
    device: HidDevice,
    connection: ConnectionKind,
    sequence: u8,
    buf: Vec<u8>,
}

/// DualSense transport over `hidapi`.
pub struct HidTransport {
    api: HidApi,
}

impl HidTransport {
    pub fn new() -> Result<Self, TransportError> {
        let api = HidApi::new().map_err(hid_error)?;
        Ok(Self { api })
    }
}

impl Transport for HidTransport {
    type Handle = HidHandle;

    fn enumerate(
        &mut self,
        devices: &mut Vec<DeviceDescriptor>,
        capacity: usize,
    ) -> Result<(), TransportError> {
        self.api.refresh_devices().map_err(hid_error)?;

        for info in self.api.device_list().filter(|info| is_supported(info)) {
            let descriptor = descriptor_for(info);
            if devices.iter().any(|d| d.unique_id == descriptor.unique_id) {
                continue;
            }
            if devices.len() == capacity {
                return Err(TransportError::InsufficientBuffer);
            }
            trace!(
                path = %descriptor.path,
                id = descriptor.unique_id,
                model = %descriptor.meta.model(),
                "enumerated"
            );
            devices.push(descriptor);
        }
        Ok(())
    }

    fn connect(&mut self, descriptor: &DeviceDescriptor) -> Result<HidHandle, TransportError> {
        let path = CString::new(descriptor.path.as_str()).map_err(|_| TransportError::InvalidArgs)?;
        let device = self.api.open_path(&path).map_err(hid_error)?;

        if descriptor.connection == ConnectionKind::Bluetooth {
            let mut feature = [0u8; CALIBRATION_FEATURE_REPORT_LEN];
            feature[0] = CALIBRATION_FEATURE_REPORT_ID;
            device
                .get_feature_report(&mut feature)
                .map_err(|_| TransportError::BluetoothComm)?;
        }

        Ok(HidHandle {
            device,
            connection: descriptor.connection,
            sequence: 0,
            buf: vec![0u8; BT_INPUT_REPORT_LEN],
        })
    }

    fn disconnect(&mut self, handle: HidHandle) {
        debug!(connection = %handle.connection, "closing HID handle");
        drop(handle);
    }

    fn read_input(&mut self, handle: &mut HidHandle) -> Result<InputSnapshot, TransportError> {
        let mut len = handle
            .device
            .read_timeout(&mut handle.buf, READ_TIMEOUT_MS)
            .map_err(hid_error)?;
        if len == 0 {
            return Err(TransportError::IoTimedOut);
        }

        for _ in 0..MAX_REPORTS_PER_TICK {
            match handle.device.read_timeout(&mut handle.buf, 0) {
                Ok(0) => break,
                Ok(n) => len = n,
                Err(err) => return Err(hid_error(err)),
            }
        }

        parse_input(&handle.buf[..len])
    }

    fn write_output(
        &mut self,
        handle: &mut HidHandle,
        output: &OutputState,
    ) -> Result<(), TransportError> {
        let report = encode_output(output, handle.connection, handle.sequence);
        handle.sequence = handle.sequence.wrapping_add(1) & 0x0F;
        handle.device.write(&report).map_err(hid_error)?;
        Ok(())
    }
}

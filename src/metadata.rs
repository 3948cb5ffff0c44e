//! What the OS reports about a controller.
//!
//! [`DeviceMeta`] travels inside every
//! [`DeviceDescriptor`](crate::transport::DeviceDescriptor). It is informational
//! only: slot assignment keys on `unique_id`, never on these fields. Transports
//! fill in what the platform exposes and leave the rest `None`.
//!
//! # Example
//! ```
//! use dsinput::backends::virtual_input::VirtualTransport;
//! use dsinput::{DeviceManager, EventBuffer, Settings};
//!
//! let mut transport = VirtualTransport::new();
//! transport.plug(3);
//! let manager = DeviceManager::new(transport, EventBuffer::new(), Settings::default());
//! for (slot, device) in manager.devices() {
//!     println!("slot {slot}: {} {}", device.connection, device.meta.model());
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DUALSENSE_PID: u16 = 0x0CE6;
pub const DUALSENSE_EDGE_PID: u16 = 0x0DF2;

/// Controller family, derived from the product id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceModel {
    DualSense,
    DualSenseEdge,
    Unknown,
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeviceModel::DualSense => "DualSense",
            DeviceModel::DualSenseEdge => "DualSense Edge",
            DeviceModel::Unknown => "unknown controller",
        })
    }
}

/// Optional descriptive fields for one controller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMeta {
    pub vid: Option<u16>,
    pub pid: Option<u16>,
    pub product_string: Option<String>,
    /// Over Bluetooth this is usually the controller's MAC address.
    pub serial_number: Option<String>,
    /// `-1` on stacks without interface numbers.
    pub interface_number: Option<i32>,
}

impl DeviceMeta {
    pub fn model(&self) -> DeviceModel {
        match self.pid {
            Some(DUALSENSE_PID) => DeviceModel::DualSense,
            Some(DUALSENSE_EDGE_PID) => DeviceModel::DualSenseEdge,
            _ => DeviceModel::Unknown,
        }
    }
}

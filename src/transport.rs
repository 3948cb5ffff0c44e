//! Hardware access seam.
//!
//! A [`Transport`] enumerates controllers, opens and closes them, and moves raw
//! snapshots in and out. The manager owns exactly one transport and never
//! talks to hardware any other way.
//!
//! # Identity
//! [`DeviceDescriptor::unique_id`] must be stable for the lifetime of a
//! physical connection and never `0` (which marks an empty slot). Transports
//! derive it from something the platform keeps constant across
//! re-enumeration, such as the device path.

use crate::error::TransportError;
use crate::metadata::DeviceMeta;
use crate::state::{InputSnapshot, OutputState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a controller is attached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionKind {
    #[default]
    Usb,
    Bluetooth,
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionKind::Usb => f.write_str("USB"),
            ConnectionKind::Bluetooth => f.write_str("Bluetooth"),
        }
    }
}

/// One enumerated controller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub unique_id: u32,
    /// OS path; opaque, used for opening and diagnostics.
    pub path: String,
    pub connection: ConnectionKind,
    pub meta: DeviceMeta,
}

/// Hardware-access backend.
///
/// All calls are synchronous and may block for a transport-defined bounded
/// time. Errors are per-call; the manager reacts by disconnecting the slot.
pub trait Transport {
    /// Open per-device context. Exclusively owned by one slot at a time.
    type Handle;

    /// Fill `devices` with at most `capacity` present controllers.
    ///
    /// When more are present, the first `capacity` are kept and
    /// [`TransportError::InsufficientBuffer`] is returned; callers treat that
    /// as a truncated success.
    fn enumerate(
        &mut self,
        devices: &mut Vec<DeviceDescriptor>,
        capacity: usize,
    ) -> Result<(), TransportError>;

    fn connect(&mut self, descriptor: &DeviceDescriptor) -> Result<Self::Handle, TransportError>;

    /// Release the handle. Consuming it makes a second release impossible.
    fn disconnect(&mut self, handle: Self::Handle);

    fn read_input(&mut self, handle: &mut Self::Handle) -> Result<InputSnapshot, TransportError>;

    fn write_output(
        &mut self,
        handle: &mut Self::Handle,
        output: &OutputState,
    ) -> Result<(), TransportError>;
}

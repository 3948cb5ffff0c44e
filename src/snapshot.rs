//! Per-frame snapshot of slot states.
//!
//! [`Snapshot`] is an **owned**, read-only view of every slot at a point in
//! time (typically “this frame”). It is produced by
//! [`DeviceManager::snapshot`](crate::manager::DeviceManager::snapshot) and is
//! cheap to clone for fan-out to multiple consumers.
//!
//! # Semantics
//! - There is one entry per slot, connected or not, in slot order.
//! - A snapshot is **immutable**. To refresh, run a tick and request a new one.
//! - `Snapshot` does **not** poll devices; it reflects the manager's last-known state.
//!
//! # Examples
//! Dump the connected slots as JSON:
//! ```no_run
//! use dsinput::backends::virtual_input::VirtualTransport;
//! use dsinput::{DeviceManager, EventBuffer};
//!
//! fn dump(manager: &DeviceManager<VirtualTransport, EventBuffer>) -> serde_json::Result<()> {
//!     for slot in manager.snapshot().connected() {
//!         println!("slot {}: {}", slot.slot, serde_json::to_string(&slot.input)?);
//!     }
//!     println!("{}", manager.snapshot().to_json_pretty()?);
//!     Ok(())
//! }
//! ```

use crate::state::{InputSnapshot, OutputState};
use crate::transport::DeviceDescriptor;
use serde::{Deserialize, Serialize};

/// State of one slot at snapshot time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    pub slot: usize,
    pub connected: bool,
    pub unique_id: u32,
    pub device: Option<DeviceDescriptor>,
    pub input: InputSnapshot,
    pub output: OutputState,
    pub dirty: bool,
}

/// Owned snapshot of all slots.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot(pub Vec<SlotSnapshot>);

impl Snapshot {
    /// State of a specific slot.
    #[inline]
    pub fn get(&self, slot: usize) -> Option<&SlotSnapshot> {
        self.0.get(slot)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &SlotSnapshot> {
        self.0.iter()
    }

    /// Only the slots that currently hold a device.
    pub fn connected(&self) -> impl Iterator<Item = &SlotSnapshot> {
        self.0.iter().filter(|s| s.connected)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Consume the snapshot and return the inner list.
    #[inline]
    pub fn into_inner(self) -> Vec<SlotSnapshot> {
        self.0
    }
}

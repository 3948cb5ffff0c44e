//! dsinput: slot-based DualSense input backend.
//!
//! Discovers up to [`MAX_DEVICES`] controllers, tracks each one in a fixed
//! slot, turns raw per-frame snapshots into discrete input events (button
//! edges with key repeat, analog updates with dead zones, touch deltas) and
//! coalesces haptic, lighting and trigger-effect requests into at most one
//! write per device per frame.
//!
//! The entry point is [`DeviceManager`]. Hardware access goes through a
//! [`Transport`]; events go to an [`EventSink`].

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod backends;
pub mod buttons;
pub mod clock;
pub mod config;
pub mod constants;
pub mod diff;
pub mod error;
pub mod event;
pub mod eventbus;
pub mod filtered_listener;
pub mod logger;
pub mod manager;
pub mod metadata;
pub mod output;
pub mod registry;
pub mod repeat;
pub mod slot;
pub mod snapshot;
pub mod state;
pub mod transport;

pub use buttons::{AxisId, ButtonId};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{Settings, TriggerLimits};
pub use constants::MAX_DEVICES;
pub use error::{ConfigError, TransportError};
pub use event::*;
pub use eventbus::*;
pub use filtered_listener::FilteredSink;
pub use logger::LoggingSink;
pub use manager::*;
pub use metadata::{DeviceMeta, DeviceModel};
pub use output::{
    DeviceProperty, ForceFeedbackChannel, ForceFeedbackValues, PropertyOutcome, TriggerMask,
};
pub use snapshot::{SlotSnapshot, Snapshot};
pub use state::*;
pub use transport::{ConnectionKind, DeviceDescriptor, Transport};

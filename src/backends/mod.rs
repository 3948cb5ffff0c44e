//! Transport backends for `dsinput`.
//!
//! Implementations of [`Transport`](crate::transport::Transport).
//!
//! # Feature flags
//! - **`hid`** (default): the `hidapi`-backed DualSense transport in [`hid`],
//!   plus the report codec in [`report`].
//!
//! [`virtual_input`] is always available; it needs no hardware and is what the
//! test suite runs against.

#[cfg(feature = "hid")]
#[cfg_attr(docsrs, doc(cfg(feature = "hid")))]
pub mod hid;

#[cfg(feature = "hid")]
#[cfg_attr(docsrs, doc(cfg(feature = "hid")))]
pub mod report;

pub mod virtual_input;

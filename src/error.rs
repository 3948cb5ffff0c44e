//! Error types.
//!
//! Transport failures never escape the poll cycle: a failing slot is
//! disconnected and the error is logged. They are still typed so transports and
//! hosts can tell a removed device from a stalled one.

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Operation encountered an unknown error")]
    Unknown,
    #[error("The user supplied buffer is too small")]
    InsufficientBuffer,
    #[error("External unexpected platform error")]
    ExternalPlatform,
    #[error("Not enough memory on the stack")]
    StackOverflow,
    #[error("Invalid arguments")]
    InvalidArgs,
    #[error("This feature is currently not supported")]
    NotSupported,
    #[error("Device was disconnected")]
    DeviceRemoved,
    #[error("Bluetooth communication error")]
    BluetoothComm,
    #[error("IO timeout")]
    IoTimedOut,
    #[error("IO failed")]
    IoFailed,
    #[error("Overlapped IO request was not found")]
    IoNotFound,
    #[error("IO did not complete because it is running in the background")]
    IoPending,
    /// Error surfaced by the HID library.
    #[error("HID error: {0}")]
    Hid(String),
    /// A report arrived that could not be decoded.
    #[error("malformed report: {0}")]
    MalformedReport(String),
}

/// Failure loading [`Settings`](crate::config::Settings).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

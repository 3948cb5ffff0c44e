//! Process-wide settings, read once at construction.
//!
//! Settings are an explicit immutable value handed to
//! [`DeviceManager`](crate::manager::DeviceManager); nothing reads ambient
//! global state. They can be built in code or loaded from TOML:
//!
//! ```toml
//! initial_repeat_delay = 0.25
//! repeat_delay = 0.08
//! emit_pointer_events_from_touch = true
//!
//! [trigger_limits]
//! max_feedback_position = 9
//! max_feedback_strength = 8
//! ```
//!
//! Missing keys fall back to their defaults.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seconds between a press and its first repeat.
    pub initial_repeat_delay: f32,
    /// Seconds between subsequent repeats while a button stays held.
    pub repeat_delay: f32,
    /// Forward touch point 1 deltas as pointer motion.
    pub emit_pointer_events_from_touch: bool,
    /// Platform maxima used to scale trigger-effect parameters to 8 bits.
    pub trigger_limits: TriggerLimits,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_repeat_delay: 0.2,
            repeat_delay: 0.1,
            emit_pointer_events_from_touch: false,
            trigger_limits: TriggerLimits::default(),
        }
    }
}

/// Upper bounds of the platform-level trigger-effect parameters.
///
/// A maximum of `0` makes the corresponding parameter always map to `0`.
/// Trigger vibration is never applied, so it has no limits here; its keys are
/// accepted and ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerLimits {
    pub max_feedback_position: u32,
    pub max_feedback_strength: u32,
}

impl Default for TriggerLimits {
    fn default() -> Self {
        Self {
            max_feedback_position: 9,
            max_feedback_strength: 8,
        }
    }
}

impl Settings {
    /// Parse and validate settings from a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a TOML settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Reject delays that would make the repeat timer misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_delay("initial_repeat_delay", self.initial_repeat_delay)?;
        check_delay("repeat_delay", self.repeat_delay)?;
        Ok(())
    }
}

fn check_delay(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("expected a finite, non-negative number of seconds, got {value}"),
        });
    }
    Ok(())
}

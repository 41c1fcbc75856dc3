//! Engine configuration.
//!
//! Timing parameters for the frame loop, loadable from TOML with sensible
//! defaults. Every field is optional in the file; absent fields fall back
//! to the defaults, so an empty string parses to the default configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The config file is not valid TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A rate parameter is zero, negative, or not finite.
    #[error("invalid rate: {name} = {value} (must be positive and finite)")]
    InvalidRate {
        /// Name of the offending field.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },
}

/// Timing configuration for the frame loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Target frame rate of the variable-rate pass, in frames per second.
    pub target_fps: f32,
    /// Rate of the fixed-step pass, in invocations per second.
    pub fixed_rate_hz: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            fixed_rate_hz: 120.0,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed TOML, [`ConfigError::InvalidRate`]
    /// on non-positive rates.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, plus everything
    /// [`from_toml_str`](EngineConfig::from_toml_str) raises.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check that both rates are positive, finite, and yield a
    /// representable interval.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidRate`] naming the offending field. A rate so
    /// small that its reciprocal overflows a `Duration` is rejected here,
    /// not at interval computation time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("target_fps", self.target_fps),
            ("fixed_rate_hz", self.fixed_rate_hz),
        ] {
            if !(value.is_finite() && value > 0.0) || interval_of(value).is_none() {
                return Err(ConfigError::InvalidRate { name, value });
            }
        }
        Ok(())
    }

    /// The wall-clock budget of one frame at the target rate.
    ///
    /// Saturates to `Duration::MAX` for rates [`validate`](EngineConfig::validate)
    /// would reject.
    pub fn frame_interval(&self) -> Duration {
        interval_of(self.target_fps).unwrap_or(Duration::MAX)
    }

    /// The simulated time consumed by one fixed-step invocation.
    ///
    /// Saturates to `Duration::MAX` for rates [`validate`](EngineConfig::validate)
    /// would reject.
    pub fn fixed_step(&self) -> Duration {
        interval_of(self.fixed_rate_hz).unwrap_or(Duration::MAX)
    }
}

/// The reciprocal of a rate as a `Duration`, or `None` when it is negative,
/// non-finite, or too large to represent.
fn interval_of(rate_hz: f32) -> Option<Duration> {
    Duration::try_from_secs_f64(1.0 / f64::from(rate_hz)).ok()
}

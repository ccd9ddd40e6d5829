//! Host-supplied engine configuration.
//!
//! The host passes a JSON object when it mounts the engine. Every field is
//! optional; absent fields fall back to the defaults below.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_MAX_SCALE;
use crate::geom::Size;

pub const DEFAULT_CANVAS_WIDTH: f64 = 800.0;
pub const DEFAULT_CANVAS_HEIGHT: f64 = 600.0;
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

/// Error returned by [`EngineConfig::from_json`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The input was not valid JSON for the config shape.
    #[error("failed to parse engine config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field parsed but holds an unusable value.
    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Canvas dimensions and background fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Canvas width in pixels.
    pub width: f64,
    /// Canvas height in pixels.
    pub height: f64,
    /// CSS background value (solid color or gradient).
    pub background: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            background: DEFAULT_BACKGROUND.to_string(),
        }
    }
}

impl CanvasConfig {
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub canvas: CanvasConfig,
    /// Upper bound applied to `ImageStyle::scale` (percent).
    pub max_scale: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { canvas: CanvasConfig::default(), max_scale: DEFAULT_MAX_SCALE }
    }
}

impl EngineConfig {
    /// Parse and validate a config from host JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] for non-positive canvas dimensions or a
    /// `maxScale` below 1.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check field ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("canvas.width", self.canvas.width)?;
        check_positive("canvas.height", self.canvas.height)?;
        if !self.max_scale.is_finite() || self.max_scale < 1.0 {
            return Err(ConfigError::Invalid {
                field: "maxScale",
                reason: format!("must be at least 1, got {}", self.max_scale),
            });
        }
        Ok(())
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason: format!("must be a positive number, got {value}") })
    }
}

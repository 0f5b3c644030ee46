//! Engine configuration
//!
//! Defaults reproduce the classic game: a 10x20 well, a 500ms gravity tick and
//! 10ms between rows of a manual drop. Values can be overridden from the
//! environment or from JSON.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{
    DEFAULT_WELL_HEIGHT, DEFAULT_WELL_WIDTH, DROP_STEP_INTERVAL_MS, MAX_WELL_DIMENSION,
    STARTING_MOVEMENT_INTERVAL_MS,
};
use crate::well::WellError;

/// Invalid engine configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("well must be at least 1x1 and at most {max}x{max}, got {width}x{height}", max = MAX_WELL_DIMENSION)]
    BadDimensions { width: usize, height: usize },
    #[error("{name} must be greater than zero")]
    ZeroInterval { name: &'static str },
    #[error("replacement well is {found_width}x{found_height}, engine well is {width}x{height}")]
    WellSizeMismatch {
        width: usize,
        height: usize,
        found_width: usize,
        found_height: usize,
    },
    #[error(transparent)]
    Well(#[from] WellError),
    #[error("invalid engine config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Engine construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub well_width: usize,
    pub well_height: usize,
    /// Gravity tick period
    pub movement_interval_ms: u64,
    /// Pause between rows of a manual drop
    pub drop_step_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            well_width: DEFAULT_WELL_WIDTH,
            well_height: DEFAULT_WELL_HEIGHT,
            movement_interval_ms: STARTING_MOVEMENT_INTERVAL_MS,
            drop_step_interval_ms: DROP_STEP_INTERVAL_MS,
        }
    }
}

impl EngineConfig {
    /// Default timing with a custom well size
    pub fn with_well(width: usize, height: usize) -> Self {
        Self {
            well_width: width,
            well_height: height,
            ..Self::default()
        }
    }

    /// Read overrides from the environment, falling back to defaults.
    ///
    /// - `FALLING_BLOCKS_WELL_WIDTH`
    /// - `FALLING_BLOCKS_WELL_HEIGHT`
    /// - `FALLING_BLOCKS_INTERVAL_MS`
    /// - `FALLING_BLOCKS_DROP_STEP_MS`
    pub fn from_env() -> Self {
        use std::env;

        fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
            env::var(key).ok().and_then(|s| s.trim().parse().ok())
        }

        let defaults = Self::default();
        Self {
            well_width: parsed("FALLING_BLOCKS_WELL_WIDTH").unwrap_or(defaults.well_width),
            well_height: parsed("FALLING_BLOCKS_WELL_HEIGHT").unwrap_or(defaults.well_height),
            movement_interval_ms: parsed("FALLING_BLOCKS_INTERVAL_MS")
                .unwrap_or(defaults.movement_interval_ms),
            drop_step_interval_ms: parsed("FALLING_BLOCKS_DROP_STEP_MS")
                .unwrap_or(defaults.drop_step_interval_ms),
        }
    }

    /// Parse and validate a JSON document; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject empty or oversized wells and zero intervals
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.well_width, self.well_height);
        if width == 0 || height == 0 || width > MAX_WELL_DIMENSION || height > MAX_WELL_DIMENSION {
            return Err(ConfigError::BadDimensions { width, height });
        }
        if self.movement_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                name: "movement_interval_ms",
            });
        }
        if self.drop_step_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                name: "drop_step_interval_ms",
            });
        }
        Ok(())
    }

    /// Gravity tick period
    pub fn movement_interval(&self) -> Duration {
        Duration::from_millis(self.movement_interval_ms)
    }

    /// Pause between rows of a manual drop
    pub fn drop_step_interval(&self) -> Duration {
        Duration::from_millis(self.drop_step_interval_ms)
    }
}

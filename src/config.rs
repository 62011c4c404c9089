//! Engine tuning read from the environment.
//!
//! Every knob has a default in [`crate::consts`]. Values that fail to parse
//! fall back to the default with a warning; values that parse but are
//! negative or non-finite are rejected.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use tracing::warn;

use crate::consts::{
    DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_COMPONENT_HEIGHT, DEFAULT_COMPONENT_WIDTH,
    HANDLE_TOLERANCE_PX, SNAP_THRESHOLD_PX,
};
use crate::geometry::Size;

pub const SNAP_THRESHOLD_KEY: &str = "LAYOUT_SNAP_THRESHOLD_PX";
pub const HANDLE_TOLERANCE_KEY: &str = "LAYOUT_HANDLE_TOLERANCE_PX";
pub const DEFAULT_WIDTH_KEY: &str = "LAYOUT_DEFAULT_WIDTH";
pub const DEFAULT_HEIGHT_KEY: &str = "LAYOUT_DEFAULT_HEIGHT";
pub const CANVAS_WIDTH_KEY: &str = "LAYOUT_CANVAS_WIDTH";
pub const CANVAS_HEIGHT_KEY: &str = "LAYOUT_CANVAS_HEIGHT";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a finite, non-negative number (got {value})")]
    Invalid { key: &'static str, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Maximum distance at which a dragged edge snaps to a sibling edge.
    pub snap_threshold: f64,
    /// Hit slop around each selection handle.
    pub handle_tolerance: f64,
    /// Size given to components created without one.
    pub default_size: Size,
    /// Canvas extent until the host reports its own.
    pub canvas: Size,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap_threshold: SNAP_THRESHOLD_PX,
            handle_tolerance: HANDLE_TOLERANCE_PX,
            default_size: Size::new(DEFAULT_COMPONENT_WIDTH, DEFAULT_COMPONENT_HEIGHT),
            canvas: Size::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &'static str, default: f64| dimension(key, lookup(key), default);
        Ok(Self {
            snap_threshold: read(SNAP_THRESHOLD_KEY, SNAP_THRESHOLD_PX)?,
            handle_tolerance: read(HANDLE_TOLERANCE_KEY, HANDLE_TOLERANCE_PX)?,
            default_size: Size::new(
                read(DEFAULT_WIDTH_KEY, DEFAULT_COMPONENT_WIDTH)?,
                read(DEFAULT_HEIGHT_KEY, DEFAULT_COMPONENT_HEIGHT)?,
            ),
            canvas: Size::new(read(CANVAS_WIDTH_KEY, DEFAULT_CANVAS_WIDTH)?, read(CANVAS_HEIGHT_KEY, DEFAULT_CANVAS_HEIGHT)?),
        })
    }
}

fn dimension(key: &'static str, raw: Option<String>, default: f64) -> Result<f64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value = match raw.trim().parse::<f64>() {
        Ok(v) => v,
        Err(e) => {
            warn!(key, raw = %raw, error = %e, default, "unparsable config value; using default");
            return Ok(default);
        }
    };
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Invalid { key, value });
    }
    Ok(value)
}

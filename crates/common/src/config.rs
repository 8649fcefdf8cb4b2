//! Editor configuration: history depth and merging, cache sizing, snapping.
//!
//! Every section has serde defaults, so a partial JSON document (or `{}`)
//! yields a usable config.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Undo/redo history settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of undoable commands kept. Oldest entries are dropped.
    pub max_entries: usize,
    /// Whether consecutive commands with the same merge key collapse into one
    /// undo step.
    pub merge_enabled: bool,
    /// Two mergeable commands only collapse when the second arrives within
    /// this many milliseconds of the first.
    pub merge_window_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            merge_enabled: true,
            merge_window_ms: 500,
        }
    }
}

/// Smoothing cache sizing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum entries per smoothing cache before oldest-first eviction.
    pub smoothing_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            smoothing_capacity: 300,
        }
    }
}

/// Drag snapping settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    pub enabled: bool,
    /// Snap radius in screen pixels; converted to ms at the current zoom.
    pub threshold_px: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_px: 8.0,
        }
    }
}

/// Top-level editor configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub cache: CacheConfig,
    pub snap: SnapConfig,
}

impl EditorConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the editor cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.history.max_entries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "history.max_entries",
                reason: "must be greater than zero".into(),
            });
        }
        if self.cache.smoothing_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.smoothing_capacity",
                reason: "must be greater than zero".into(),
            });
        }
        if !(self.snap.threshold_px.is_finite() && self.snap.threshold_px > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "snap.threshold_px",
                reason: format!("expected a positive number, got {}", self.snap.threshold_px),
            });
        }
        Ok(())
    }
}

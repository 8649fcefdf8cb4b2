//! `fc-common` — Shared ids, time conversion and configuration for the
//! Framecast editing core.
//!
//! - **Types**: `ClipId`, `TrackId`, `EffectId`, `RecordingId`, `ProjectId`
//!   (string newtypes)
//! - **Time**: pixel ⇄ millisecond ⇄ frame conversion
//! - **Config**: `EditorConfig` with history, cache and snap sections
//! - **Errors**: `ConfigError` (thiserror-based)

pub mod config;
pub mod error;
pub mod time;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{CacheConfig, EditorConfig, HistoryConfig, SnapConfig};
pub use error::{ConfigError, ConfigResult};
pub use types::{ClipId, EffectId, ProjectId, RecordingId, TrackId};

//! `fc-timeline` — Timeline document model and read-only queries for the
//! Framecast editor.
//!
//! This crate answers questions about a project without mutating it:
//!
//! - **Types**: `Project`, `Track`, `Clip`, `Recording`, `Effect` (tagged
//!   payload union), `Settings`
//! - **Geometry**: active clip at a time (half-open, newest wins), snap
//!   positions, nearest snap with a lower-wins tie-break
//! - **Playhead**: current/next clip and recording, with an incremental
//!   update that is exact, not approximate
//! - **Smoothing**: spring-smoothed cursor path evaluation
//!
//! All queries are pure functions of their inputs and safe to call from any
//! number of readers while no write is in flight.
//!
//! # Usage
//!
//! ```rust
//! use fc_timeline::{compute_playhead_state, Clip, Project, TrackType};
//!
//! let mut project = Project::new("p1", "Demo");
//! project
//!     .add_track("v1", "Screen", TrackType::Video)
//!     .add_clip(Clip::new("c1", "v1", "rec1", 0.0, 2_000.0));
//!
//! let state = compute_playhead_state(&project, 500.0);
//! assert_eq!(state.current_clip.unwrap().id.as_str(), "c1");
//! ```

pub mod geometry;
pub mod playhead;
pub mod smoothing;
pub mod types;

// Re-export primary API
pub use geometry::{
    blocks_from_clips, compute_snap_positions, find_active_webcam_clip,
    find_clip_at_timeline_position, find_nearest_snap_position, next_clip_after, snap_time,
    timeline_duration, SnapMatch, TimeBlock, TimeSpan,
};
pub use playhead::{
    compute_playhead_state, update_playhead_state, PlayheadClip, PlayheadService, PlayheadState,
};
pub use smoothing::{cursor_position_at, smooth_cursor_position, SmoothedPoint, SmoothingParams};
pub use types::{
    Annotation, AudioSettings, BackgroundFill, CameraSettings, Clip, CursorEvent, Effect,
    EffectData, EffectTarget, EffectType, Project, Recording, RecordingSettings, Settings,
    Timeline, Track, TrackType,
};

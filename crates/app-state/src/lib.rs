//! `fc-app-state` -- Document ownership, undoable editing and derived-state
//! caches for the Framecast editor.
//!
//! This crate provides:
//!
//! - **`DocumentStore`**: sole owner of the current project; validated,
//!   all-or-nothing mutations that bump a revision counter.
//! - **`EffectStore`**: effect lookup across clip and legacy recording lists.
//! - **`Command`**: the undoable edit trait, plus concrete commands for
//!   tracks, clips, effects, settings and composites.
//! - **`CommandHistory`**: linear undo/redo with merging, batching and a
//!   depth limit.
//! - **`SmoothingCache`**: bounded insertion-ordered memoization of cursor
//!   and camera smoothing.
//! - **`EditorSession`**: composition root that keeps all of the above
//!   consistent across project and recording switches.
//!
//! # Architecture
//!
//! ```text
//! EditorSession
//! ├── store: DocumentStore           (the project, revision)
//! ├── history: CommandHistory        (executed commands + cursor)
//! ├── playhead: PlayheadService      (last state, keyed by revision)
//! └── caches: SmoothingCaches        (cursor, camera)
//!
//! Command::execute / undo
//! └── CommandContext                 (&mut DocumentStore, nothing else)
//! ```

pub mod cache;
pub mod command;
pub mod commands;
pub mod effect_store;
pub mod error;
pub mod history;
pub mod session;
pub mod store;

// Re-export primary types at crate root for convenience.
pub use cache::{SmoothingCache, SmoothingCaches};
pub use command::{Command, CommandCategory, CommandContext, MergeKey};
pub use commands::{
    AddClipCommand, AddEffectCommand, AddTrackCommand, CompositeCommand, MoveClipCommand,
    RemoveClipCommand, RemoveEffectCommand, RemoveTrackCommand, SplitClipCommand,
    TrimClipCommand, UpdateAudioSettingsCommand, UpdateCameraSettingsCommand,
    UpdateEffectCommand, UpdateRecordingSettingsCommand,
};
pub use effect_store::{
    all_effects, effects_for_clip, find_effect, EffectLocation, EffectOwner, EffectStore,
    LocatedEffect,
};
pub use error::{CommandError, CommandResult};
pub use history::{CommandHistory, HistoryEntry, HistoryStep, PushOutcome};
pub use session::{EditorSession, SharedSession};
pub use store::{ClipPlacement, ClipTiming, DocumentStore};

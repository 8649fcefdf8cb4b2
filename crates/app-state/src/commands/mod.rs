//! Concrete editor commands.
//!
//! Each command stores its parameters on construction and its undo snapshot
//! on execution. Snapshots are owned copies of exactly the sub-document the
//! command touched.

mod clip;
mod composite;
mod effect;
mod settings;
mod track;

pub use clip::{AddClipCommand, MoveClipCommand, RemoveClipCommand, SplitClipCommand, TrimClipCommand};
pub use composite::CompositeCommand;
pub use effect::{AddEffectCommand, RemoveEffectCommand, UpdateEffectCommand};
pub use settings::{
    UpdateAudioSettingsCommand, UpdateCameraSettingsCommand, UpdateRecordingSettingsCommand,
};
pub use track::{AddTrackCommand, RemoveTrackCommand};

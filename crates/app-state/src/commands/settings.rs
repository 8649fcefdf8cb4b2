use std::any::Any;

use fc_timeline::{AudioSettings, CameraSettings, RecordingSettings};

use crate::command::{missing_snapshot, Command, CommandCategory, CommandContext, MergeKey};
use crate::error::CommandResult;

/// Replace the project's audio settings. Consecutive edits merge.
#[derive(Debug)]
pub struct UpdateAudioSettingsCommand {
    audio: AudioSettings,
    previous: Option<AudioSettings>,
}

impl UpdateAudioSettingsCommand {
    pub fn new(audio: AudioSettings) -> Self {
        Self {
            audio,
            previous: None,
        }
    }
}

impl Command for UpdateAudioSettingsCommand {
    fn name(&self) -> &str {
        "Update audio settings"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Settings
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        self.previous = Some(ctx.store().set_audio_settings(self.audio.clone())?);
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        let previous = self.previous.clone().ok_or_else(|| missing_snapshot(self))?;
        ctx.store().set_audio_settings(previous)?;
        self.previous = None;
        Ok(())
    }

    fn merge_key(&self) -> Option<MergeKey> {
        Some(MergeKey::new(CommandCategory::Settings, "audio"))
    }

    fn try_merge(&mut self, next: &dyn Command) -> bool {
        match next.as_any().downcast_ref::<UpdateAudioSettingsCommand>() {
            Some(next) => {
                self.audio = next.audio.clone();
                true
            }
            None => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Replace the capture settings. Only 30 and 60 fps are accepted; any other
/// frame rate is refused before execution.
#[derive(Debug)]
pub struct UpdateRecordingSettingsCommand {
    recording: RecordingSettings,
    previous: Option<RecordingSettings>,
}

impl UpdateRecordingSettingsCommand {
    pub fn new(recording: RecordingSettings) -> Self {
        Self {
            recording,
            previous: None,
        }
    }
}

impl Command for UpdateRecordingSettingsCommand {
    fn name(&self) -> &str {
        "Update recording settings"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Settings
    }

    fn can_execute(&self, ctx: &CommandContext<'_>) -> bool {
        ctx.has_project() && RecordingSettings::is_supported_frame_rate(self.recording.frame_rate)
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        self.previous = Some(
            ctx.store()
                .set_recording_settings(self.recording.clone())?,
        );
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        let previous = self.previous.clone().ok_or_else(|| missing_snapshot(self))?;
        ctx.store().set_recording_settings(previous)?;
        self.previous = None;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Replace the camera and cursor smoothing settings. Consecutive edits merge.
#[derive(Debug)]
pub struct UpdateCameraSettingsCommand {
    camera: CameraSettings,
    previous: Option<CameraSettings>,
}

impl UpdateCameraSettingsCommand {
    pub fn new(camera: CameraSettings) -> Self {
        Self {
            camera,
            previous: None,
        }
    }
}

impl Command for UpdateCameraSettingsCommand {
    fn name(&self) -> &str {
        "Update camera settings"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Settings
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        self.previous = Some(ctx.store().set_camera_settings(self.camera.clone())?);
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        let previous = self.previous.clone().ok_or_else(|| missing_snapshot(self))?;
        ctx.store().set_camera_settings(previous)?;
        self.previous = None;
        Ok(())
    }

    fn merge_key(&self) -> Option<MergeKey> {
        Some(MergeKey::new(CommandCategory::Settings, "camera"))
    }

    fn try_merge(&mut self, next: &dyn Command) -> bool {
        match next.as_any().downcast_ref::<UpdateCameraSettingsCommand>() {
            Some(next) => {
                self.camera = next.camera.clone();
                true
            }
            None => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

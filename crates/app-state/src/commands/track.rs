use std::any::Any;

use fc_common::TrackId;
use fc_timeline::Track;

use crate::command::{missing_snapshot, Command, CommandCategory, CommandContext};
use crate::error::CommandResult;

/// Insert a new track.
#[derive(Debug)]
pub struct AddTrackCommand {
    track: Track,
    index: Option<usize>,
}

impl AddTrackCommand {
    /// `index` of `None` appends after the last track.
    pub fn new(track: Track, index: Option<usize>) -> Self {
        Self { track, index }
    }
}

impl Command for AddTrackCommand {
    fn name(&self) -> &str {
        "Add track"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Timeline
    }

    fn can_execute(&self, ctx: &CommandContext<'_>) -> bool {
        ctx.project()
            .is_some_and(|p| p.find_track(&self.track.id).is_none())
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        ctx.store().insert_track(self.index, self.track.clone())?;
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        ctx.store().remove_track(&self.track.id)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Delete a track together with its clips.
#[derive(Debug)]
pub struct RemoveTrackCommand {
    track_id: TrackId,
    removed: Option<(usize, Track)>,
}

impl RemoveTrackCommand {
    pub fn new(track_id: impl Into<TrackId>) -> Self {
        Self {
            track_id: track_id.into(),
            removed: None,
        }
    }
}

impl Command for RemoveTrackCommand {
    fn name(&self) -> &str {
        "Remove track"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Timeline
    }

    fn can_execute(&self, ctx: &CommandContext<'_>) -> bool {
        ctx.project()
            .is_some_and(|p| p.find_track(&self.track_id).is_some())
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        self.removed = Some(ctx.store().remove_track(&self.track_id)?);
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        let (index, track) = self.removed.clone().ok_or_else(|| missing_snapshot(self))?;
        ctx.store().restore_track(index, track)?;
        self.removed = None;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

use std::any::Any;

use fc_common::{ClipId, TrackId};
use fc_timeline::Clip;

use crate::command::{missing_snapshot, Command, CommandCategory, CommandContext, MergeKey};
use crate::error::{CommandError, CommandResult};
use crate::store::{ClipPlacement, ClipTiming};

fn ensure_start(start_time: f64) -> CommandResult<()> {
    if start_time.is_finite() && start_time >= 0.0 {
        Ok(())
    } else {
        Err(CommandError::InvalidTiming {
            reason: format!("start time must be >= 0, got {start_time}"),
        })
    }
}

/// Place a new clip on a track.
#[derive(Debug)]
pub struct AddClipCommand {
    track_id: TrackId,
    clip: Clip,
    index: Option<usize>,
}

impl AddClipCommand {
    pub fn new(track_id: impl Into<TrackId>, clip: Clip) -> Self {
        Self {
            track_id: track_id.into(),
            clip,
            index: None,
        }
    }

    pub fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl Command for AddClipCommand {
    fn name(&self) -> &str {
        "Add clip"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Timeline
    }

    fn can_execute(&self, ctx: &CommandContext<'_>) -> bool {
        ctx.project().is_some_and(|p| {
            p.find_track(&self.track_id).is_some() && p.find_clip(&self.clip.id).is_none()
        })
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        ctx.store()
            .insert_clip(&self.track_id, self.index, self.clip.clone())?;
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        ctx.store().remove_clip(&self.clip.id)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Delete a clip and its effects.
#[derive(Debug)]
pub struct RemoveClipCommand {
    clip_id: ClipId,
    removed: Option<ClipPlacement>,
}

impl RemoveClipCommand {
    pub fn new(clip_id: impl Into<ClipId>) -> Self {
        Self {
            clip_id: clip_id.into(),
            removed: None,
        }
    }
}

impl Command for RemoveClipCommand {
    fn name(&self) -> &str {
        "Remove clip"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Timeline
    }

    fn can_execute(&self, ctx: &CommandContext<'_>) -> bool {
        ctx.project()
            .is_some_and(|p| p.find_clip(&self.clip_id).is_some())
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        self.removed = Some(ctx.store().remove_clip(&self.clip_id)?);
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        let placement = self.removed.clone().ok_or_else(|| missing_snapshot(self))?;
        ctx.store().restore_clip(placement)?;
        self.removed = None;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Clone, Debug)]
struct ClipPosition {
    track_id: TrackId,
    index: usize,
    timing: ClipTiming,
}

/// Drag a clip to a new start time, optionally onto another track.
///
/// A target track, when given, always receives the clip at its end, even if
/// it is the clip's current track. Consecutive moves of the same clip merge.
#[derive(Debug)]
pub struct MoveClipCommand {
    clip_id: ClipId,
    new_start: f64,
    target_track: Option<TrackId>,
    before: Option<ClipPosition>,
}

impl MoveClipCommand {
    pub fn new(clip_id: impl Into<ClipId>, new_start: f64) -> Self {
        Self {
            clip_id: clip_id.into(),
            new_start,
            target_track: None,
            before: None,
        }
    }

    pub fn to_track(mut self, track_id: impl Into<TrackId>) -> Self {
        self.target_track = Some(track_id.into());
        self
    }
}

impl Command for MoveClipCommand {
    fn name(&self) -> &str {
        "Move clip"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Timeline
    }

    fn can_execute(&self, ctx: &CommandContext<'_>) -> bool {
        ctx.project().is_some_and(|p| {
            p.find_clip(&self.clip_id).is_some()
                && self
                    .target_track
                    .as_ref()
                    .map_or(true, |t| p.find_track(t).is_some())
        })
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        ensure_start(self.new_start)?;
        let store = ctx.store();
        let (track_id, index) = store.locate_clip(&self.clip_id)?;
        if let Some(target) = &self.target_track {
            if store.require_project().find_track(target).is_none() {
                return Err(CommandError::TrackNotFound(target.clone()));
            }
        }

        let current = store
            .require_project()
            .find_clip(&self.clip_id)
            .map(|(_, clip)| ClipTiming::from(clip))
            .ok_or_else(|| CommandError::ClipNotFound(self.clip_id.clone()))?;
        let timing = store.set_clip_timing(
            &self.clip_id,
            ClipTiming {
                start_time: self.new_start,
                ..current
            },
        )?;
        if let Some(target) = &self.target_track {
            store.move_clip_to_track(&self.clip_id, target, None)?;
        }

        self.before = Some(ClipPosition {
            track_id,
            index,
            timing,
        });
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        let before = self.before.clone().ok_or_else(|| missing_snapshot(self))?;
        let store = ctx.store();
        if self.target_track.is_some() {
            store.move_clip_to_track(&self.clip_id, &before.track_id, Some(before.index))?;
        }
        store.set_clip_timing(&self.clip_id, before.timing)?;
        self.before = None;
        Ok(())
    }

    fn merge_key(&self) -> Option<MergeKey> {
        Some(MergeKey::new(
            CommandCategory::Timeline,
            format!("move:{}", self.clip_id),
        ))
    }

    fn try_merge(&mut self, next: &dyn Command) -> bool {
        let Some(next) = next.as_any().downcast_ref::<MoveClipCommand>() else {
            return false;
        };
        if next.clip_id != self.clip_id {
            return false;
        }
        self.new_start = next.new_start;
        // a later move without a target stays on whatever track we moved to
        if next.target_track.is_some() {
            self.target_track = next.target_track.clone();
        }
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Change a clip's start and duration, keeping the source frames under the
/// playhead fixed. Trimming the head forward advances the source offset by
/// the same amount. Consecutive trims of the same clip merge.
#[derive(Debug)]
pub struct TrimClipCommand {
    clip_id: ClipId,
    new_start: f64,
    new_duration: f64,
    before: Option<ClipTiming>,
}

impl TrimClipCommand {
    pub fn new(clip_id: impl Into<ClipId>, new_start: f64, new_duration: f64) -> Self {
        Self {
            clip_id: clip_id.into(),
            new_start,
            new_duration,
            before: None,
        }
    }
}

impl Command for TrimClipCommand {
    fn name(&self) -> &str {
        "Trim clip"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Timeline
    }

    fn can_execute(&self, ctx: &CommandContext<'_>) -> bool {
        ctx.project()
            .is_some_and(|p| p.find_clip(&self.clip_id).is_some())
            && self.new_duration > 0.0
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        let store = ctx.store();
        let current = store
            .project()
            .and_then(|p| p.find_clip(&self.clip_id))
            .map(|(_, clip)| ClipTiming::from(clip))
            .ok_or_else(|| CommandError::ClipNotFound(self.clip_id.clone()))?;

        let source_in = current.source_in + (self.new_start - current.start_time);
        let previous = store.set_clip_timing(
            &self.clip_id,
            ClipTiming {
                start_time: self.new_start,
                duration: self.new_duration,
                source_in,
            },
        )?;
        self.before = Some(previous);
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        let before = self.before.ok_or_else(|| missing_snapshot(self))?;
        ctx.store().set_clip_timing(&self.clip_id, before)?;
        self.before = None;
        Ok(())
    }

    fn merge_key(&self) -> Option<MergeKey> {
        Some(MergeKey::new(
            CommandCategory::Timeline,
            format!("trim:{}", self.clip_id),
        ))
    }

    fn try_merge(&mut self, next: &dyn Command) -> bool {
        match next.as_any().downcast_ref::<TrimClipCommand>() {
            Some(next) if next.clip_id == self.clip_id => {
                self.new_start = next.new_start;
                self.new_duration = next.new_duration;
                true
            }
            _ => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Cut a clip in two at a timeline position.
///
/// The left half keeps the original id and all effects. The right half gets
/// `right_id`, no effects, and a source offset that continues where the left
/// half ends.
#[derive(Debug)]
pub struct SplitClipCommand {
    clip_id: ClipId,
    at: f64,
    right_id: ClipId,
    before: Option<ClipTiming>,
}

impl SplitClipCommand {
    pub fn new(clip_id: impl Into<ClipId>, at: f64, right_id: impl Into<ClipId>) -> Self {
        Self {
            clip_id: clip_id.into(),
            at,
            right_id: right_id.into(),
            before: None,
        }
    }

    fn splits_inside(&self, clip: &Clip) -> bool {
        self.at > clip.start_time && self.at < clip.end_time()
    }
}

impl Command for SplitClipCommand {
    fn name(&self) -> &str {
        "Split clip"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Timeline
    }

    fn can_execute(&self, ctx: &CommandContext<'_>) -> bool {
        ctx.project().is_some_and(|p| {
            p.find_clip(&self.right_id).is_none()
                && p.find_clip(&self.clip_id)
                    .is_some_and(|(_, clip)| self.splits_inside(clip))
        })
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        let store = ctx.store();
        let (track_id, index) = store.locate_clip(&self.clip_id)?;
        let left = store
            .require_project()
            .find_clip(&self.clip_id)
            .map(|(_, clip)| clip.clone())
            .ok_or_else(|| CommandError::ClipNotFound(self.clip_id.clone()))?;
        if !self.splits_inside(&left) {
            return Err(CommandError::InvalidTiming {
                reason: format!(
                    "split point {} outside clip {} ({}..{})",
                    self.at,
                    left.id,
                    left.start_time,
                    left.end_time()
                ),
            });
        }

        let offset = self.at - left.start_time;
        let mut right = left.clone();
        right.id = self.right_id.clone();
        right.start_time = self.at;
        right.duration = left.end_time() - self.at;
        right.source_in = left.source_in + offset;
        right.effects.clear();

        store.insert_clip(&track_id, Some(index + 1), right)?;
        let previous = store.set_clip_timing(
            &self.clip_id,
            ClipTiming {
                duration: offset,
                ..ClipTiming::from(&left)
            },
        )?;
        self.before = Some(previous);
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        let before = self.before.ok_or_else(|| missing_snapshot(self))?;
        let store = ctx.store();
        store.remove_clip(&self.right_id)?;
        store.set_clip_timing(&self.clip_id, before)?;
        self.before = None;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

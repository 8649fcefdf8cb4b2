//! The document store: sole owner of the current project.
//!
//! `DocumentStore` holds at most one project and exposes a read accessor plus
//! a set of fine-grained mutations. Each mutation validates everything it
//! needs before touching the document, so it either applies completely or
//! returns an error with the project unchanged. Every successful mutation
//! bumps the store revision, which derived-state caches key on.
//!
//! Mutations that remove or replace data hand the old value back to the
//! caller by value. Commands keep those values as their undo snapshots; they
//! are owned copies, never references into the live document.

use fc_common::{ClipId, EffectId, TrackId};
use fc_timeline::{
    AudioSettings, CameraSettings, Clip, Effect, Project, RecordingSettings, Track,
};

use crate::effect_store::{find_effect, EffectLocation, EffectOwner};
use crate::error::{CommandError, CommandResult};

/// The timing fields of a clip, as captured for undo.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClipTiming {
    pub start_time: f64,
    pub duration: f64,
    pub source_in: f64,
}

impl From<&Clip> for ClipTiming {
    fn from(clip: &Clip) -> Self {
        Self {
            start_time: clip.start_time,
            duration: clip.duration,
            source_in: clip.source_in,
        }
    }
}

impl ClipTiming {
    fn validate(&self) -> CommandResult<()> {
        if !(self.start_time.is_finite() && self.start_time >= 0.0) {
            return Err(CommandError::InvalidTiming {
                reason: format!("start time must be >= 0, got {}", self.start_time),
            });
        }
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(CommandError::InvalidTiming {
                reason: format!("duration must be > 0, got {}", self.duration),
            });
        }
        if !(self.source_in.is_finite() && self.source_in >= 0.0) {
            return Err(CommandError::InvalidTiming {
                reason: format!("source offset must be >= 0, got {}", self.source_in),
            });
        }
        Ok(())
    }
}

/// Where a clip sat before it was removed, with the clip itself.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipPlacement {
    pub track_id: TrackId,
    pub index: usize,
    pub clip: Clip,
}

/// Owner of the current project document.
#[derive(Debug, Default)]
pub struct DocumentStore {
    project: Option<Project>,
    revision: u64,
}

impl DocumentStore {
    /// Create an empty store with no project loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with `project` already loaded.
    pub fn with_project(project: Project) -> Self {
        Self {
            project: Some(project),
            revision: 1,
        }
    }

    /// The current project, if one is loaded.
    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// The current project, for call sites that are only reachable with a
    /// project loaded.
    ///
    /// # Panics
    ///
    /// Panics when no project is loaded. That is a wiring bug in the caller,
    /// not a runtime data condition; use [`project`](Self::project) when
    /// absence is possible.
    pub fn require_project(&self) -> &Project {
        match self.project.as_ref() {
            Some(project) => project,
            None => panic!("DocumentStore::require_project called with no project loaded"),
        }
    }

    pub fn has_project(&self) -> bool {
        self.project.is_some()
    }

    /// Monotonic modification counter. Changes on every successful mutation
    /// and on load/close.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Make `project` current, returning the previous one.
    pub fn load(&mut self, project: Project) -> Option<Project> {
        tracing::debug!(project_id = %project.id, name = %project.name, "Loading project");
        self.touch();
        self.project.replace(project)
    }

    /// Unload the current project.
    pub fn close(&mut self) -> Option<Project> {
        let previous = self.project.take();
        if let Some(p) = &previous {
            tracing::debug!(project_id = %p.id, "Closing project");
            self.touch();
        }
        previous
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn project_mut(&mut self) -> CommandResult<&mut Project> {
        self.project.as_mut().ok_or(CommandError::NoProject)
    }

    fn project_ref(&self) -> CommandResult<&Project> {
        self.project.as_ref().ok_or(CommandError::NoProject)
    }

    // --- Tracks ---

    /// Insert a track at `index` (clamped to the end). Returns the index used.
    pub fn insert_track(&mut self, index: Option<usize>, track: Track) -> CommandResult<usize> {
        self.insert_track_with(index, track, IdPolicy::Unique)
    }

    /// Put back a track taken out by [`remove_track`](Self::remove_track).
    ///
    /// Effect ids the track shares with another location are accepted with a
    /// warning, so a document that already carried them round-trips.
    pub fn restore_track(&mut self, index: usize, track: Track) -> CommandResult<usize> {
        self.insert_track_with(Some(index), track, IdPolicy::Restore)
    }

    fn insert_track_with(
        &mut self,
        index: Option<usize>,
        track: Track,
        policy: IdPolicy,
    ) -> CommandResult<usize> {
        let project = self.project_ref()?;
        if project.find_track(&track.id).is_some() {
            return Err(CommandError::DuplicateId(track.id.to_string()));
        }
        for (i, clip) in track.clips.iter().enumerate() {
            ensure_clip_insertable(project, clip, &track.clips[..i], policy)?;
        }

        let project = self.project_mut()?;
        let len = project.timeline.tracks.len();
        let index = index.map_or(len, |i| i.min(len));
        tracing::debug!(track_id = %track.id, index, "Inserting track");
        project.timeline.tracks.insert(index, track);
        self.touch();
        Ok(index)
    }

    /// Remove a track and all its clips. Returns its former index and value.
    pub fn remove_track(&mut self, track_id: &TrackId) -> CommandResult<(usize, Track)> {
        let project = self.project_mut()?;
        let index = project
            .timeline
            .tracks
            .iter()
            .position(|t| &t.id == track_id)
            .ok_or_else(|| CommandError::TrackNotFound(track_id.clone()))?;
        let track = project.timeline.tracks.remove(index);
        tracing::debug!(track_id = %track_id, clips = track.clips.len(), "Removed track");
        self.touch();
        Ok((index, track))
    }

    // --- Clips ---

    /// Insert `clip` on `track_id` at `index` (clamped; `None` appends).
    /// The clip's `track_id` is rewritten to the owning track.
    pub fn insert_clip(
        &mut self,
        track_id: &TrackId,
        index: Option<usize>,
        clip: Clip,
    ) -> CommandResult<usize> {
        self.insert_clip_with(track_id, index, clip, IdPolicy::Unique)
    }

    /// Put back a clip taken out by [`remove_clip`](Self::remove_clip), with
    /// the same tolerance for shared effect ids as
    /// [`restore_track`](Self::restore_track).
    pub fn restore_clip(&mut self, placement: ClipPlacement) -> CommandResult<usize> {
        let ClipPlacement {
            track_id,
            index,
            clip,
        } = placement;
        self.insert_clip_with(&track_id, Some(index), clip, IdPolicy::Restore)
    }

    fn insert_clip_with(
        &mut self,
        track_id: &TrackId,
        index: Option<usize>,
        mut clip: Clip,
        policy: IdPolicy,
    ) -> CommandResult<usize> {
        let project = self.project_ref()?;
        if project.find_track(track_id).is_none() {
            return Err(CommandError::TrackNotFound(track_id.clone()));
        }
        ensure_clip_insertable(project, &clip, &[], policy)?;

        let track = self.track_mut(track_id)?;
        clip.track_id = track_id.clone();
        let len = track.clips.len();
        let index = index.map_or(len, |i| i.min(len));
        tracing::debug!(clip_id = %clip.id, track_id = %track_id, index, "Inserting clip");
        track.clips.insert(index, clip);
        self.touch();
        Ok(index)
    }

    /// Remove a clip from whichever track holds it.
    pub fn remove_clip(&mut self, clip_id: &ClipId) -> CommandResult<ClipPlacement> {
        let (track_id, index) = self.locate_clip(clip_id)?;
        let track = self.track_mut(&track_id)?;
        let clip = track.clips.remove(index);
        tracing::debug!(clip_id = %clip_id, track_id = %track_id, "Removed clip");
        self.touch();
        Ok(ClipPlacement {
            track_id,
            index,
            clip,
        })
    }

    /// Replace a clip's timing fields. Returns the previous timing.
    pub fn set_clip_timing(
        &mut self,
        clip_id: &ClipId,
        timing: ClipTiming,
    ) -> CommandResult<ClipTiming> {
        timing.validate()?;
        let clip = self.clip_mut(clip_id)?;
        let previous = ClipTiming::from(&*clip);
        clip.start_time = timing.start_time;
        clip.duration = timing.duration;
        clip.source_in = timing.source_in;
        tracing::debug!(
            clip_id = %clip_id,
            start = timing.start_time,
            duration = timing.duration,
            "Clip timing set"
        );
        self.touch();
        Ok(previous)
    }

    /// Move a clip to another track at `index` (clamped; `None` appends).
    /// Returns the clip's previous track and index.
    pub fn move_clip_to_track(
        &mut self,
        clip_id: &ClipId,
        target: &TrackId,
        index: Option<usize>,
    ) -> CommandResult<(TrackId, usize)> {
        let (source_track, source_index) = self.locate_clip(clip_id)?;
        if self.project_ref()?.find_track(target).is_none() {
            return Err(CommandError::TrackNotFound(target.clone()));
        }

        let mut clip = self.track_mut(&source_track)?.clips.remove(source_index);
        clip.track_id = target.clone();
        let track = self.track_mut(target)?;
        let len = track.clips.len();
        let index = index.map_or(len, |i| i.min(len));
        track.clips.insert(index, clip);
        tracing::debug!(
            clip_id = %clip_id,
            from = %source_track,
            to = %target,
            "Clip moved between tracks"
        );
        self.touch();
        Ok((source_track, source_index))
    }

    /// Track id and index of a clip.
    pub fn locate_clip(&self, clip_id: &ClipId) -> CommandResult<(TrackId, usize)> {
        let project = self.project_ref()?;
        project
            .timeline
            .tracks
            .iter()
            .find_map(|track| {
                track
                    .clips
                    .iter()
                    .position(|c| &c.id == clip_id)
                    .map(|index| (track.id.clone(), index))
            })
            .ok_or_else(|| CommandError::ClipNotFound(clip_id.clone()))
    }

    fn track_mut(&mut self, track_id: &TrackId) -> CommandResult<&mut Track> {
        self.project_mut()?
            .timeline
            .tracks
            .iter_mut()
            .find(|t| &t.id == track_id)
            .ok_or_else(|| CommandError::TrackNotFound(track_id.clone()))
    }

    fn clip_mut(&mut self, clip_id: &ClipId) -> CommandResult<&mut Clip> {
        self.project_mut()?
            .timeline
            .tracks
            .iter_mut()
            .flat_map(|t| t.clips.iter_mut())
            .find(|c| &c.id == clip_id)
            .ok_or_else(|| CommandError::ClipNotFound(clip_id.clone()))
    }

    // --- Effects ---

    /// Attach `effect` to `owner` at `index` (clamped; `None` appends).
    pub fn insert_effect(
        &mut self,
        owner: &EffectOwner,
        index: Option<usize>,
        effect: Effect,
    ) -> CommandResult<EffectLocation> {
        self.insert_effect_with(owner, index, effect, IdPolicy::Unique)
    }

    /// Put back an effect taken out by [`remove_effect`](Self::remove_effect)
    /// at its former location. A second effect with the same id elsewhere in
    /// the document is accepted with a warning.
    pub fn restore_effect(
        &mut self,
        location: &EffectLocation,
        effect: Effect,
    ) -> CommandResult<EffectLocation> {
        self.insert_effect_with(
            &location.owner(),
            Some(location.index()),
            effect,
            IdPolicy::Restore,
        )
    }

    fn insert_effect_with(
        &mut self,
        owner: &EffectOwner,
        index: Option<usize>,
        effect: Effect,
        policy: IdPolicy,
    ) -> CommandResult<EffectLocation> {
        let project = self.project_ref()?;
        check_effect_id(
            find_effect(project, &effect.id).is_some(),
            &effect.id,
            policy,
        )?;

        let effect_id = effect.id.clone();
        let location = match owner {
            EffectOwner::Clip(clip_id) => {
                let clip = self.clip_mut(clip_id)?;
                let index = clamp_index(index, clip.effects.len());
                clip.effects.insert(index, effect);
                EffectLocation::Clip {
                    track_id: clip.track_id.clone(),
                    clip_id: clip_id.clone(),
                    index,
                }
            }
            EffectOwner::Recording(recording_id) => {
                let recording = self
                    .project_mut()?
                    .recordings
                    .iter_mut()
                    .find(|r| &r.id == recording_id)
                    .ok_or_else(|| CommandError::RecordingNotFound(recording_id.clone()))?;
                let index = clamp_index(index, recording.effects.len());
                recording.effects.insert(index, effect);
                EffectLocation::Recording {
                    recording_id: recording_id.clone(),
                    index,
                }
            }
        };
        tracing::debug!(effect_id = %effect_id, location = ?location, "Effect inserted");
        self.touch();
        Ok(location)
    }

    /// Detach an effect from wherever it lives.
    pub fn remove_effect(&mut self, effect_id: &EffectId) -> CommandResult<(EffectLocation, Effect)> {
        let location = find_effect(self.project_ref()?, effect_id)
            .map(|found| found.location)
            .ok_or_else(|| CommandError::EffectNotFound(effect_id.clone()))?;

        let effects = self.effects_at_mut(&location)?;
        let effect = effects.remove(location.index());
        tracing::debug!(effect_id = %effect_id, location = ?location, "Effect removed");
        self.touch();
        Ok((location, effect))
    }

    /// Replace the effect with the same id in place. Returns the old value.
    pub fn replace_effect(&mut self, effect: Effect) -> CommandResult<Effect> {
        let location = find_effect(self.project_ref()?, &effect.id)
            .map(|found| found.location)
            .ok_or_else(|| CommandError::EffectNotFound(effect.id.clone()))?;

        let effects = self.effects_at_mut(&location)?;
        let previous = std::mem::replace(&mut effects[location.index()], effect);
        tracing::debug!(effect_id = %previous.id, "Effect replaced");
        self.touch();
        Ok(previous)
    }

    fn effects_at_mut(&mut self, location: &EffectLocation) -> CommandResult<&mut Vec<Effect>> {
        match location {
            EffectLocation::Clip { clip_id, .. } => Ok(&mut self.clip_mut(clip_id)?.effects),
            EffectLocation::Recording { recording_id, .. } => self
                .project_mut()?
                .recordings
                .iter_mut()
                .find(|r| &r.id == recording_id)
                .map(|r| &mut r.effects)
                .ok_or_else(|| CommandError::RecordingNotFound(recording_id.clone())),
        }
    }

    // --- Settings ---

    pub fn set_audio_settings(&mut self, audio: AudioSettings) -> CommandResult<AudioSettings> {
        let project = self.project_mut()?;
        let previous = std::mem::replace(&mut project.settings.audio, audio);
        tracing::debug!(volume = project.settings.audio.volume, "Audio settings set");
        self.touch();
        Ok(previous)
    }

    /// Rejects frame rates other than 30 and 60.
    pub fn set_recording_settings(
        &mut self,
        recording: RecordingSettings,
    ) -> CommandResult<RecordingSettings> {
        if !RecordingSettings::is_supported_frame_rate(recording.frame_rate) {
            return Err(CommandError::UnsupportedFrameRate(recording.frame_rate));
        }
        let project = self.project_mut()?;
        let previous = std::mem::replace(&mut project.settings.recording, recording);
        tracing::debug!(
            frame_rate = project.settings.recording.frame_rate,
            "Recording settings set"
        );
        self.touch();
        Ok(previous)
    }

    pub fn set_camera_settings(&mut self, camera: CameraSettings) -> CommandResult<CameraSettings> {
        let project = self.project_mut()?;
        let previous = std::mem::replace(&mut project.settings.camera, camera);
        tracing::debug!("Camera settings set");
        self.touch();
        Ok(previous)
    }
}

fn clamp_index(index: Option<usize>, len: usize) -> usize {
    index.map_or(len, |i| i.min(len))
}

/// How an insertion treats effect ids that are already taken.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum IdPolicy {
    /// New content: every id must be unused.
    Unique,
    /// Content coming back from a removal: shared effect ids are warned about.
    Restore,
}

fn check_effect_id(taken: bool, effect_id: &EffectId, policy: IdPolicy) -> CommandResult<()> {
    match (taken, policy) {
        (false, _) => Ok(()),
        (true, IdPolicy::Unique) => Err(CommandError::DuplicateId(effect_id.to_string())),
        (true, IdPolicy::Restore) => {
            tracing::warn!(effect_id = %effect_id, "Restoring effect whose id is also used elsewhere");
            Ok(())
        }
    }
}

/// A clip may enter the document if its timing is valid and its id is unused
/// both in the project and among `siblings`, the clips arriving with it.
/// Effect ids are checked the same way, subject to `policy`.
fn ensure_clip_insertable(
    project: &Project,
    clip: &Clip,
    siblings: &[Clip],
    policy: IdPolicy,
) -> CommandResult<()> {
    ClipTiming::from(clip).validate()?;
    if project.find_clip(&clip.id).is_some() || siblings.iter().any(|c| c.id == clip.id) {
        return Err(CommandError::DuplicateId(clip.id.to_string()));
    }
    for (i, effect) in clip.effects.iter().enumerate() {
        let taken = clip.effects[..i].iter().any(|e| e.id == effect.id)
            || siblings
                .iter()
                .flat_map(|c| &c.effects)
                .any(|e| e.id == effect.id)
            || find_effect(project, &effect.id).is_some();
        check_effect_id(taken, &effect.id, policy)?;
    }
    Ok(())
}

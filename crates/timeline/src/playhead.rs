//! Derived playhead state: which clip and recording are playing at a given
//! time, and which come next.
//!
//! The state is never stored in the document. It is a pure function of
//! `(project, time)`. During playback it is re-derived every tick, so
//! [`update_playhead_state`] reuses the previous answer whenever it provably
//! still holds. The reuse rule is a cache only: it always returns exactly what
//! [`compute_playhead_state`] would.
//!
//! "Current" is the newest-wins active clip across all video tracks. "Next" is
//! the video clip with the lowest start strictly after the query time, ties
//! broken by lowest id.

use fc_common::{ClipId, RecordingId, TrackId};

use crate::geometry::{find_clip_at_timeline_position, next_clip_after, TimeSpan};
use crate::types::{Clip, Project, Recording, TrackType};

/// The parts of a clip the playhead needs, detached from the document.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayheadClip {
    pub id: ClipId,
    pub track_id: TrackId,
    pub start_time: f64,
    pub end_time: f64,
    pub source_ref: RecordingId,
    pub source_in: f64,
}

impl PlayheadClip {
    /// Source time within the recording at timeline position `time`.
    pub fn source_time(&self, time: f64) -> f64 {
        self.source_in + (time - self.start_time)
    }
}

impl From<&Clip> for PlayheadClip {
    fn from(clip: &Clip) -> Self {
        Self {
            id: clip.id.clone(),
            track_id: clip.track_id.clone(),
            start_time: clip.start_time,
            end_time: clip.end_time(),
            source_ref: clip.source_ref.clone(),
            source_in: clip.source_in,
        }
    }
}

impl TimeSpan for PlayheadClip {
    fn start_time(&self) -> f64 {
        self.start_time
    }

    fn end_time(&self) -> f64 {
        self.end_time
    }
}

/// What is playing at, and after, a timeline position.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayheadState {
    /// The time this state was derived at. A reused state keeps its original
    /// derivation time.
    pub computed_at: f64,
    pub current_clip: Option<PlayheadClip>,
    /// Set only when the current clip's recording exists in the project.
    pub current_recording: Option<RecordingId>,
    pub next_clip: Option<PlayheadClip>,
    pub next_recording: Option<RecordingId>,
}

impl PlayheadState {
    /// Resolve the current recording against `project`.
    pub fn current_recording<'a>(&self, project: &'a Project) -> Option<&'a Recording> {
        self.current_recording
            .as_ref()
            .and_then(|id| project.find_recording(id))
    }

    /// Resolve the next recording against `project`.
    pub fn next_recording<'a>(&self, project: &'a Project) -> Option<&'a Recording> {
        self.next_recording
            .as_ref()
            .and_then(|id| project.find_recording(id))
    }

    /// Whether this state is still the exact answer for `time`.
    ///
    /// Holds when `time` has not moved backwards, has not reached the next
    /// clip's start, and the current clip (if any) still contains it. No clip
    /// can start in `(computed_at, time]` and every clip containing `time`
    /// already contained `computed_at`, so the newest-wins winner is unchanged.
    pub fn still_valid_at(&self, time: f64) -> bool {
        if !(time >= self.computed_at) {
            return false;
        }
        if let Some(next) = &self.next_clip {
            if time >= next.start_time {
                return false;
            }
        }
        match &self.current_clip {
            Some(current) => current.contains(time),
            // a gap stays a gap until the next clip starts
            None => true,
        }
    }
}

fn resolve_recording(project: &Project, clip: Option<&PlayheadClip>) -> Option<RecordingId> {
    let clip = clip?;
    project
        .find_recording(&clip.source_ref)
        .map(|r| r.id.clone())
}

/// Derive the playhead state from scratch.
pub fn compute_playhead_state(project: &Project, time: f64) -> PlayheadState {
    let current_clip =
        find_clip_at_timeline_position(time, project.clips_of_type(TrackType::Video))
            .map(PlayheadClip::from);
    let next_clip =
        next_clip_after(time, project.clips_of_type(TrackType::Video)).map(PlayheadClip::from);

    let current_recording = resolve_recording(project, current_clip.as_ref());
    let next_recording = resolve_recording(project, next_clip.as_ref());

    tracing::trace!(
        time,
        current = ?current_clip.as_ref().map(|c| c.id.as_str()),
        next = ?next_clip.as_ref().map(|c| c.id.as_str()),
        "Playhead state derived"
    );

    PlayheadState {
        computed_at: time,
        current_clip,
        current_recording,
        next_clip,
        next_recording,
    }
}

/// Derive the playhead state, reusing `previous` when it is still exact.
///
/// `previous` must have been derived from the same document version as
/// `project`; [`PlayheadService`] enforces that with a revision number.
pub fn update_playhead_state(
    project: &Project,
    time: f64,
    previous: Option<&PlayheadState>,
) -> PlayheadState {
    match previous {
        Some(prev) if prev.still_valid_at(time) => prev.clone(),
        _ => compute_playhead_state(project, time),
    }
}

/// Owns the last derived playhead state for one document.
///
/// The previous state is only reused if it was derived at the same document
/// revision; any edit forces a full recompute.
#[derive(Debug, Default)]
pub struct PlayheadService {
    last: Option<(u64, PlayheadState)>,
    reused: u64,
    recomputed: u64,
}

impl PlayheadService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Playhead state for `time` against `project` at `revision`.
    pub fn update(&mut self, project: &Project, revision: u64, time: f64) -> &PlayheadState {
        let previous = match &self.last {
            Some((rev, state)) if *rev == revision => Some(state),
            _ => None,
        };

        let reusable = previous.is_some_and(|p| p.still_valid_at(time));
        let state = update_playhead_state(project, time, previous);
        if reusable {
            self.reused += 1;
        } else {
            self.recomputed += 1;
        }

        &self.last.insert((revision, state)).1
    }

    /// Last derived state, if any.
    pub fn last(&self) -> Option<&PlayheadState> {
        self.last.as_ref().map(|(_, s)| s)
    }

    /// Drop the cached state. Called on project switch.
    pub fn reset(&mut self) {
        self.last = None;
        tracing::debug!("Playhead state reset");
    }

    /// (reused, recomputed) counts since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.reused, self.recomputed)
    }
}

//! Editor session: the composition root for one open editor.
//!
//! The session owns the document store, the command history, the playhead
//! service and the smoothing caches, and keeps them consistent with each
//! other: opening a project clears history and derived state, switching the
//! active recording drops smoothing results computed for the old one.
//!
//! Hosts that read from several threads wrap the session in a
//! [`SharedSession`]. Playback and snapping are reads; edits, undo and redo
//! take the write lock, so readers never observe a half-applied command.

use std::sync::Arc;

use parking_lot::RwLock;

use fc_common::time::snap_threshold_ms;
use fc_common::{ClipId, EditorConfig, EffectId, RecordingId};
use fc_timeline::{
    blocks_from_clips, compute_snap_positions, find_active_webcam_clip, smooth_cursor_position,
    snap_time, timeline_duration, CameraSettings, Clip, Effect, PlayheadService, PlayheadState,
    Project, SmoothedPoint, SmoothingParams, TrackType,
};

use crate::cache::{SmoothingCache, SmoothingCaches};
use crate::command::Command;
use crate::effect_store::{find_effect, EffectLocation};
use crate::error::{CommandError, CommandResult};
use crate::history::{CommandHistory, HistoryStep, PushOutcome};
use crate::store::DocumentStore;

/// A session shared between threads.
pub type SharedSession = Arc<RwLock<EditorSession>>;

/// All editing state for one editor window.
#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    store: DocumentStore,
    history: CommandHistory,
    playhead: PlayheadService,
    caches: SmoothingCaches,
    active_recording: Option<RecordingId>,
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            history: CommandHistory::new(config.history.clone()),
            caches: SmoothingCaches::new(config.cache.smoothing_capacity),
            store: DocumentStore::new(),
            playhead: PlayheadService::new(),
            active_recording: None,
            config,
        }
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(RwLock::new(self))
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn project(&self) -> Option<&Project> {
        self.store.project()
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn caches(&self) -> &SmoothingCaches {
        &self.caches
    }

    // --- Project lifecycle ---

    /// Make `project` current. History, playhead state and smoothing caches
    /// belong to the previous document and are dropped.
    pub fn open_project(&mut self, project: Project) -> Option<Project> {
        tracing::info!(project_id = %project.id, name = %project.name, "Opening project");
        let previous = self.store.load(project);
        self.reset_derived_state();
        previous
    }

    pub fn close_project(&mut self) -> Option<Project> {
        let previous = self.store.close();
        if previous.is_some() {
            tracing::info!("Project closed");
            self.reset_derived_state();
        }
        previous
    }

    fn reset_derived_state(&mut self) {
        self.history.clear();
        self.playhead.reset();
        self.caches.invalidate_all();
        self.active_recording = None;
    }

    // --- Editing ---

    /// Execute and record a command.
    pub fn execute(&mut self, command: Box<dyn Command>) -> CommandResult<PushOutcome> {
        self.history.push(&mut self.store, command)
    }

    pub fn undo(&mut self) -> CommandResult<HistoryStep> {
        self.history.undo(&mut self.store)
    }

    pub fn redo(&mut self) -> CommandResult<HistoryStep> {
        self.history.redo(&mut self.store)
    }

    pub fn start_batch(&mut self, label: &str) {
        self.history.start_batch(label);
    }

    pub fn end_batch(&mut self) -> bool {
        self.history.end_batch()
    }

    // --- Playback queries ---

    /// Current and next clip at `time`. `None` without a project.
    pub fn playhead_at(&mut self, time: f64) -> Option<PlayheadState> {
        let project = self.store.project()?;
        let state = self.playhead.update(project, self.store.revision(), time);
        Some(state.clone())
    }

    /// (reused, recomputed) playhead derivations since the session started.
    pub fn playhead_stats(&self) -> (u64, u64) {
        self.playhead.stats()
    }

    /// Webcam clip to show at `time`.
    pub fn active_webcam_clip(&self, time: f64) -> Option<&Clip> {
        let project = self.store.project()?;
        find_active_webcam_clip(time, project.clips_of_type(TrackType::Webcam))
    }

    /// End of the last clip, or 0 for an empty or missing project.
    pub fn duration(&self) -> f64 {
        self.store.project().map_or(0.0, timeline_duration)
    }

    // --- Snapping ---

    /// Snap targets for a drag, excluding the clip being dragged.
    pub fn snap_positions(&self, exclude: Option<&ClipId>) -> Vec<f64> {
        let blocks = self
            .store
            .project()
            .map(|p| blocks_from_clips(p.all_clips()))
            .unwrap_or_default();
        compute_snap_positions(&blocks, exclude)
    }

    /// Snap `time` to the nearest clip edge within the configured pixel
    /// radius at the current zoom. Returns `time` unchanged when snapping is
    /// off or nothing is close enough.
    pub fn snap(&self, time: f64, exclude: Option<&ClipId>, pixels_per_ms: f64) -> f64 {
        if !self.config.snap.enabled || !(pixels_per_ms > 0.0) {
            return time;
        }
        let threshold = snap_threshold_ms(self.config.snap.threshold_px, pixels_per_ms);
        snap_time(time, &self.snap_positions(exclude), threshold).map_or(time, |m| m.position)
    }

    // --- Effects ---

    pub fn find_effect(&self, effect_id: &EffectId) -> Option<(&Effect, EffectLocation)> {
        let found = find_effect(self.store.project()?, effect_id)?;
        Some((found.effect, found.location))
    }

    // --- Smoothing ---

    pub fn active_recording(&self) -> Option<&RecordingId> {
        self.active_recording.as_ref()
    }

    /// Make `recording_id` the recording smoothing results are computed for.
    /// Cached results are dropped when it changes.
    pub fn switch_recording(&mut self, recording_id: &RecordingId) {
        if self.active_recording.as_ref() == Some(recording_id) {
            return;
        }
        tracing::debug!(
            from = ?self.active_recording.as_ref().map(|r| r.as_str()),
            to = %recording_id,
            "Switching active recording"
        );
        self.caches.invalidate_all();
        self.active_recording = Some(recording_id.clone());
    }

    /// Spring-smoothed cursor position in `recording_id` at `time`.
    pub fn smoothed_cursor(
        &mut self,
        recording_id: &RecordingId,
        time: f64,
    ) -> CommandResult<Option<SmoothedPoint>> {
        let params = self.camera_settings()?.cursor_smoothing;
        self.smoothed(recording_id, time, params, |caches| &mut caches.cursor)
    }

    /// Camera focus point in `recording_id` at `time`: the cursor path
    /// filtered through the softer camera spring.
    pub fn camera_focus(
        &mut self,
        recording_id: &RecordingId,
        time: f64,
    ) -> CommandResult<Option<SmoothedPoint>> {
        let params = self.camera_settings()?.smoothing;
        self.smoothed(recording_id, time, params, |caches| &mut caches.camera)
    }

    fn camera_settings(&self) -> CommandResult<&CameraSettings> {
        self.store
            .project()
            .map(|p| &p.settings.camera)
            .ok_or(CommandError::NoProject)
    }

    fn smoothed(
        &mut self,
        recording_id: &RecordingId,
        time: f64,
        params: SmoothingParams,
        cache: impl FnOnce(&mut SmoothingCaches) -> &mut SmoothingCache,
    ) -> CommandResult<Option<SmoothedPoint>> {
        let project = self.store.project().ok_or(CommandError::NoProject)?;
        if project.find_recording(recording_id).is_none() {
            return Err(CommandError::RecordingNotFound(recording_id.clone()));
        }
        self.switch_recording(recording_id);

        let recording = self
            .store
            .project()
            .and_then(|p| p.find_recording(recording_id))
            .ok_or_else(|| CommandError::RecordingNotFound(recording_id.clone()))?;

        let key = params.cache_key(time);
        Ok(cache(&mut self.caches).get_or_insert_with(key, || {
            smooth_cursor_position(&recording.cursor_events, time, &params)
        }))
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

//! Project document model: Project, Timeline, Track, Clip, Recording, Effect, Settings.
//!
//! All times are milliseconds. Clip end times are derived, never stored.
//! Clips on a track are kept in insertion order and may overlap; the
//! geometry queries never assume sorted or disjoint clips.

use fc_common::{ClipId, EffectId, ProjectId, RecordingId, TrackId};
use serde::{Deserialize, Serialize};

use crate::smoothing::SmoothingParams;

/// Root document. Exactly one project is current at a time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub timeline: Timeline,
    pub settings: Settings,
    /// Source recordings referenced by clips.
    #[serde(default)]
    pub recordings: Vec<Recording>,
}

impl Project {
    /// Create an empty project with default settings.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ProjectId::new(id),
            name: name.into(),
            timeline: Timeline::default(),
            settings: Settings::default(),
            recordings: Vec::new(),
        }
    }

    /// Append a track and return a mutable reference to it.
    pub fn add_track(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        track_type: TrackType,
    ) -> &mut Track {
        let index = self.timeline.tracks.len();
        self.timeline
            .tracks
            .push(Track::new(id, name, track_type));
        &mut self.timeline.tracks[index]
    }

    pub fn find_track(&self, track_id: &TrackId) -> Option<&Track> {
        self.timeline.tracks.iter().find(|t| &t.id == track_id)
    }

    /// Find a clip across all tracks.
    pub fn find_clip(&self, clip_id: &ClipId) -> Option<(&Track, &Clip)> {
        self.timeline.tracks.iter().find_map(|track| {
            track
                .clips
                .iter()
                .find(|c| &c.id == clip_id)
                .map(|clip| (track, clip))
        })
    }

    pub fn find_recording(&self, recording_id: &RecordingId) -> Option<&Recording> {
        self.recordings.iter().find(|r| &r.id == recording_id)
    }

    /// All clips on tracks of the given type, in track then insertion order.
    pub fn clips_of_type(&self, track_type: TrackType) -> impl Iterator<Item = &Clip> {
        self.timeline
            .tracks
            .iter()
            .filter(move |t| t.track_type == track_type)
            .flat_map(|t| t.clips.iter())
    }

    /// All clips on all tracks.
    pub fn all_clips(&self) -> impl Iterator<Item = &Clip> {
        self.timeline.tracks.iter().flat_map(|t| t.clips.iter())
    }

    pub fn total_clips(&self) -> usize {
        self.timeline.tracks.iter().map(|t| t.clips.len()).sum()
    }
}

/// Ordered collection of tracks. Index 0 is the bottom of the z-stack.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub tracks: Vec<Track>,
}

/// Semantic kind of a track.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    /// Screen recording clips; drives the playhead.
    Video,
    /// Webcam overlay clips. Frequently overlapping.
    Webcam,
    /// Free-form overlays (annotations, images).
    Overlay,
    Audio,
}

/// A lane holding clips of one kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub track_type: TrackType,
    /// Clips in insertion order. Not sorted, may overlap.
    pub clips: Vec<Clip>,
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    pub locked: bool,
}

impl Track {
    pub fn new(id: impl Into<String>, name: impl Into<String>, track_type: TrackType) -> Self {
        Self {
            id: TrackId::new(id),
            name: name.into(),
            track_type,
            clips: Vec::new(),
            muted: false,
            locked: false,
        }
    }

    /// Add a clip to this track. Does NOT sort.
    pub fn add_clip(&mut self, clip: Clip) {
        self.clips.push(clip);
    }
}

/// A time-bounded reference to a recording placed on a track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: ClipId,
    pub track_id: TrackId,
    /// Timeline position of the first frame (ms).
    pub start_time: f64,
    /// Length on the timeline (ms).
    pub duration: f64,
    /// Recording this clip plays.
    pub source_ref: RecordingId,
    /// Offset into the recording where playback starts (ms).
    #[serde(default)]
    pub source_in: f64,
    /// Timeline-attached effects.
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl Clip {
    pub fn new(
        id: impl Into<String>,
        track_id: impl Into<String>,
        source_ref: impl Into<String>,
        start_time: f64,
        duration: f64,
    ) -> Self {
        Self {
            id: ClipId::new(id),
            track_id: TrackId::new(track_id),
            start_time,
            duration,
            source_ref: RecordingId::new(source_ref),
            source_in: 0.0,
            effects: Vec::new(),
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// `start_time + duration`.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Source time played at timeline position `time`.
    pub fn timeline_to_source_time(&self, time: f64) -> f64 {
        self.source_in + (time - self.start_time)
    }
}

/// A captured source recording.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub id: RecordingId,
    pub name: String,
    /// Length of the capture (ms).
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub has_audio: bool,
    /// Legacy per-recording effects, from before effects were attached to
    /// timeline clips. Still read and edited.
    #[serde(default)]
    pub effects: Vec<Effect>,
    /// Raw cursor positions captured alongside the recording.
    #[serde(default)]
    pub cursor_events: Vec<CursorEvent>,
}

impl Recording {
    pub fn new(id: impl Into<String>, name: impl Into<String>, duration: f64) -> Self {
        Self {
            id: RecordingId::new(id),
            name: name.into(),
            duration,
            width: 1920,
            height: 1080,
            has_audio: false,
            effects: Vec::new(),
            cursor_events: Vec::new(),
        }
    }
}

/// A cursor sample in normalized `[0, 1]` screen coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CursorEvent {
    /// Recording-relative time (ms).
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
}

/// What part of the composition an effect acts on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTarget {
    Screen,
    Webcam,
    Cursor,
    Canvas,
}

/// An effect instance. The payload is a closed set of variants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub id: EffectId,
    pub target: EffectTarget,
    /// Active range (ms), relative to the owner.
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub data: EffectData,
}

fn default_enabled() -> bool {
    true
}

impl Effect {
    pub fn new(id: impl Into<String>, target: EffectTarget, data: EffectData) -> Self {
        Self {
            id: EffectId::new(id),
            target,
            start_time: 0.0,
            end_time: f64::MAX,
            enabled: true,
            data,
        }
    }

    pub fn with_range(mut self, start_time: f64, end_time: f64) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    pub fn effect_type(&self) -> EffectType {
        self.data.effect_type()
    }
}

/// Discriminant of [`EffectData`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    Zoom,
    Cursor,
    Background,
    Annotation,
    Keystroke,
    Webcam,
    Screen,
}

/// Effect payload, tagged by `type` in serialized form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectData {
    Zoom {
        scale: f32,
        /// Normalized focus point.
        focus: [f32; 2],
        #[serde(default)]
        follow_cursor: bool,
    },
    Cursor {
        size: f32,
        #[serde(default)]
        hide_when_idle: bool,
        #[serde(default)]
        highlight_clicks: bool,
    },
    Background {
        fill: BackgroundFill,
        padding: f32,
        corner_radius: f32,
    },
    Annotation {
        annotation: Annotation,
        color: [f32; 4],
    },
    Keystroke {
        font_size: f32,
    },
    Webcam {
        /// Normalized top-left position.
        position: [f32; 2],
        size: f32,
        #[serde(default)]
        mirrored: bool,
    },
    Screen {
        corner_radius: f32,
        shadow: f32,
    },
}

impl EffectData {
    pub fn effect_type(&self) -> EffectType {
        match self {
            Self::Zoom { .. } => EffectType::Zoom,
            Self::Cursor { .. } => EffectType::Cursor,
            Self::Background { .. } => EffectType::Background,
            Self::Annotation { .. } => EffectType::Annotation,
            Self::Keystroke { .. } => EffectType::Keystroke,
            Self::Webcam { .. } => EffectType::Webcam,
            Self::Screen { .. } => EffectType::Screen,
        }
    }
}

/// Background fill behind the captured screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackgroundFill {
    Solid { color: [f32; 4] },
    Gradient { from: [f32; 4], to: [f32; 4], angle: f32 },
    Wallpaper { name: String },
}

/// Annotation shapes drawn over the recording.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
    Text { text: String, position: [f32; 2], font_size: f32 },
    Arrow { from: [f32; 2], to: [f32; 2], thickness: f32 },
    Highlight { rect: [f32; 4] },
    Blur { rect: [f32; 4], radius: f32 },
}

/// Project-level settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub recording: RecordingSettings,
    #[serde(default)]
    pub camera: CameraSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Linear gain, 0.0–2.0.
    pub volume: f32,
    pub muted: bool,
    pub normalize: bool,
    pub fade_in_ms: f64,
    pub fade_out_ms: f64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            muted: false,
            normalize: false,
            fade_in_ms: 0.0,
            fade_out_ms: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordingSettings {
    pub frame_rate: u32,
    pub capture_cursor: bool,
    pub capture_audio: bool,
}

impl RecordingSettings {
    /// Frame rates the capture pipeline accepts.
    pub const SUPPORTED_FRAME_RATES: [u32; 2] = [30, 60];

    pub fn is_supported_frame_rate(frame_rate: u32) -> bool {
        Self::SUPPORTED_FRAME_RATES.contains(&frame_rate)
    }
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            capture_cursor: true,
            capture_audio: true,
        }
    }
}

/// Camera follow behavior for zoom effects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Spring driving the zoom camera.
    pub smoothing: SmoothingParams,
    /// Spring driving the rendered cursor. Stiffer than the camera so the
    /// pointer stays close to the captured path.
    #[serde(default = "default_cursor_smoothing")]
    pub cursor_smoothing: SmoothingParams,
    pub follow_cursor: bool,
}

fn default_cursor_smoothing() -> SmoothingParams {
    SmoothingParams {
        stiffness: 470.0,
        damping: 45.0,
        mass: 1.0,
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            smoothing: SmoothingParams::default(),
            cursor_smoothing: default_cursor_smoothing(),
            follow_cursor: true,
        }
    }
}

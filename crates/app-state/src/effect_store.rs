//! Effect lookup and mutation across both places effects live.
//!
//! Effects belong to timeline clips. Older projects also carry effects on the
//! recording itself; those are still honored for lookup, update and removal.
//! When the same id exists in both places the timeline copy wins and the
//! duplicate is reported with a warning.

use fc_common::{ClipId, EffectId, RecordingId, TrackId};
use fc_timeline::{Effect, Project};

use crate::error::CommandResult;
use crate::store::DocumentStore;

/// What an effect is attached to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EffectOwner {
    Clip(ClipId),
    Recording(RecordingId),
}

/// Exact position of an effect within the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EffectLocation {
    Clip {
        track_id: TrackId,
        clip_id: ClipId,
        index: usize,
    },
    /// Legacy per-recording effect list.
    Recording {
        recording_id: RecordingId,
        index: usize,
    },
}

impl EffectLocation {
    pub fn owner(&self) -> EffectOwner {
        match self {
            Self::Clip { clip_id, .. } => EffectOwner::Clip(clip_id.clone()),
            Self::Recording { recording_id, .. } => EffectOwner::Recording(recording_id.clone()),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Clip { index, .. } | Self::Recording { index, .. } => *index,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Recording { .. })
    }
}

/// An effect together with where it was found.
#[derive(Clone, Debug, PartialEq)]
pub struct LocatedEffect<'a> {
    pub effect: &'a Effect,
    pub location: EffectLocation,
}

/// Every effect in the project, timeline effects first.
pub fn all_effects(project: &Project) -> Vec<LocatedEffect<'_>> {
    let mut found = Vec::new();
    for track in &project.timeline.tracks {
        for clip in &track.clips {
            for (index, effect) in clip.effects.iter().enumerate() {
                found.push(LocatedEffect {
                    effect,
                    location: EffectLocation::Clip {
                        track_id: track.id.clone(),
                        clip_id: clip.id.clone(),
                        index,
                    },
                });
            }
        }
    }
    for recording in &project.recordings {
        for (index, effect) in recording.effects.iter().enumerate() {
            found.push(LocatedEffect {
                effect,
                location: EffectLocation::Recording {
                    recording_id: recording.id.clone(),
                    index,
                },
            });
        }
    }
    found
}

/// Find an effect by id. Timeline effects take precedence over legacy
/// recording effects.
pub fn find_effect<'a>(project: &'a Project, effect_id: &EffectId) -> Option<LocatedEffect<'a>> {
    let mut matches = all_effects(project)
        .into_iter()
        .filter(|found| &found.effect.id == effect_id);
    let first = matches.next()?;
    let duplicates = matches.count();
    if duplicates > 0 {
        tracing::warn!(
            effect_id = %effect_id,
            duplicates,
            chosen = ?first.location,
            "Effect id appears more than once; using the first match"
        );
    }
    Some(first)
}

/// Effects attached to one clip, in order.
pub fn effects_for_clip<'a>(project: &'a Project, clip_id: &ClipId) -> &'a [Effect] {
    project
        .find_clip(clip_id)
        .map(|(_, clip)| clip.effects.as_slice())
        .unwrap_or(&[])
}

/// Effect operations over a document store.
///
/// Reads go straight to the project; writes delegate to the store so they
/// are validated and bump the revision like any other mutation.
pub struct EffectStore<'a> {
    store: &'a mut DocumentStore,
}

impl<'a> EffectStore<'a> {
    pub fn new(store: &'a mut DocumentStore) -> Self {
        Self { store }
    }

    pub fn find(&self, effect_id: &EffectId) -> Option<LocatedEffect<'_>> {
        find_effect(self.store.project()?, effect_id)
    }

    pub fn all(&self) -> Vec<LocatedEffect<'_>> {
        self.store.project().map(all_effects).unwrap_or_default()
    }

    pub fn add(
        &mut self,
        owner: &EffectOwner,
        index: Option<usize>,
        effect: Effect,
    ) -> CommandResult<EffectLocation> {
        self.store.insert_effect(owner, index, effect)
    }

    pub fn remove(&mut self, effect_id: &EffectId) -> CommandResult<(EffectLocation, Effect)> {
        self.store.remove_effect(effect_id)
    }

    /// Return a removed effect to the location it was removed from.
    pub fn restore(
        &mut self,
        location: &EffectLocation,
        effect: Effect,
    ) -> CommandResult<EffectLocation> {
        self.store.restore_effect(location, effect)
    }

    /// Replace the stored effect with the same id. Returns the old value.
    pub fn replace(&mut self, effect: Effect) -> CommandResult<Effect> {
        self.store.replace_effect(effect)
    }
}

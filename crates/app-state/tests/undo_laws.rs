//! History-level laws checked through the public API: every command undoes to
//! the exact prior document, redo tails are discarded on push, and the
//! history never moves past its ends.

use std::time::{Duration, Instant};

use fc_app_state::{
    AddClipCommand, AddEffectCommand, AddTrackCommand, Command, CommandHistory, CompositeCommand,
    DocumentStore, EffectOwner, HistoryStep, MoveClipCommand, PushOutcome, RemoveClipCommand,
    RemoveEffectCommand, RemoveTrackCommand, SplitClipCommand, TrimClipCommand,
    UpdateAudioSettingsCommand, UpdateCameraSettingsCommand, UpdateEffectCommand,
    UpdateRecordingSettingsCommand,
};
use fc_common::{ClipId, HistoryConfig, RecordingId, TrackId};
use fc_timeline::{
    AudioSettings, CameraSettings, Clip, Effect, EffectData, EffectTarget, Project, Recording,
    RecordingSettings, Track, TrackType,
};

fn keystroke(id: &str, font_size: f32) -> Effect {
    Effect::new(id, EffectTarget::Canvas, EffectData::Keystroke { font_size })
}

fn make_store() -> DocumentStore {
    let mut project = Project::new("p1", "Laws");
    let mut recording = Recording::new("rec1", "Screen", 30_000.0);
    recording.effects.push(keystroke("legacy-keys", 14.0));
    project.recordings.push(recording);

    let video = project.add_track("v1", "Screen", TrackType::Video);
    video.add_clip(Clip::new("c1", "v1", "rec1", 0.0, 5_000.0).with_effect(keystroke("k1", 18.0)));
    video.add_clip(Clip::new("c2", "v1", "rec1", 5_000.0, 5_000.0));
    project
        .add_track("a1", "Audio", TrackType::Audio)
        .add_clip(Clip::new("music", "a1", "rec1", 0.0, 10_000.0));
    DocumentStore::with_project(project)
}

fn every_command() -> Vec<Box<dyn Command>> {
    vec![
        Box::new(AddTrackCommand::new(
            Track::new("o1", "Overlay", TrackType::Overlay),
            Some(0),
        )),
        Box::new(RemoveTrackCommand::new("a1")),
        Box::new(AddClipCommand::new(
            "v1",
            Clip::new("c3", "v1", "rec1", 10_000.0, 1_000.0),
        )),
        Box::new(RemoveClipCommand::new("c1")),
        Box::new(MoveClipCommand::new("c2", 6_000.0)),
        Box::new(MoveClipCommand::new("c2", 1_000.0).to_track("a1")),
        Box::new(TrimClipCommand::new("c2", 5_500.0, 3_000.0)),
        Box::new(SplitClipCommand::new("c1", 2_000.0, "c1-tail")),
        Box::new(AddEffectCommand::new(
            EffectOwner::Clip(ClipId::new("c2")),
            keystroke("k2", 20.0),
        )),
        Box::new(AddEffectCommand::new(
            EffectOwner::Recording(RecordingId::new("rec1")),
            keystroke("k3", 20.0),
        )),
        Box::new(RemoveEffectCommand::new("k1")),
        Box::new(RemoveEffectCommand::new("legacy-keys")),
        Box::new(UpdateEffectCommand::new(keystroke("k1", 32.0))),
        Box::new(UpdateAudioSettingsCommand::new(AudioSettings {
            muted: true,
            ..AudioSettings::default()
        })),
        Box::new(UpdateRecordingSettingsCommand::new(RecordingSettings {
            frame_rate: 30,
            ..RecordingSettings::default()
        })),
        Box::new(UpdateCameraSettingsCommand::new(CameraSettings {
            follow_cursor: false,
            ..CameraSettings::default()
        })),
        Box::new(
            CompositeCommand::new("Replace clip")
                .with(RemoveClipCommand::new("c2"))
                .with(AddClipCommand::new(
                    "v1",
                    Clip::new("c2b", "v1", "rec1", 5_000.0, 2_000.0),
                )),
        ),
    ]
}

#[test]
fn every_command_undoes_to_the_prior_document() {
    for command in every_command() {
        let name = command.name().to_string();
        let mut store = make_store();
        let before = store.require_project().clone();
        let mut history = CommandHistory::new(HistoryConfig::default());

        history.push(&mut store, command).unwrap();
        let after = store.require_project().clone();
        assert_ne!(after, before, "{name} changed nothing");

        assert_eq!(
            history.undo(&mut store).unwrap(),
            HistoryStep::Applied { label: name.clone() }
        );
        assert_eq!(store.require_project(), &before, "{name} undo");

        history.redo(&mut store).unwrap();
        assert_eq!(store.require_project(), &after, "{name} redo");
    }
}

#[test]
fn undoing_a_whole_session_restores_the_original() {
    let mut store = make_store();
    let original = store.require_project().clone();
    let mut history = CommandHistory::new(HistoryConfig {
        merge_enabled: false,
        ..HistoryConfig::default()
    });

    let mut applied = 0;
    for command in every_command() {
        // later commands may target things earlier ones removed
        if history.push(&mut store, command).is_ok() {
            applied += 1;
        }
    }
    assert!(applied > 5, "only {applied} commands applied");
    let edited = store.require_project().clone();

    while history.can_undo() {
        history.undo(&mut store).unwrap();
    }
    assert_eq!(store.require_project(), &original);

    while history.can_redo() {
        history.redo(&mut store).unwrap();
    }
    assert_eq!(store.require_project(), &edited);
}

#[test]
fn push_after_undo_discards_redo_tail() {
    let mut store = make_store();
    let mut history = CommandHistory::new(HistoryConfig::default());

    history
        .push(&mut store, Box::new(RemoveClipCommand::new("c1")))
        .unwrap();
    history
        .push(&mut store, Box::new(RemoveClipCommand::new("c2")))
        .unwrap();
    history.undo(&mut store).unwrap();
    assert_eq!(history.redo_count(), 1);

    history
        .push(&mut store, Box::new(RemoveClipCommand::new("music")))
        .unwrap();
    assert_eq!(history.redo_count(), 0);
    assert_eq!(history.redo(&mut store).unwrap(), HistoryStep::NothingToRedo);
    // c2 survived: the undone removal is gone for good
    assert!(store.require_project().find_clip(&ClipId::new("c2")).is_some());
}

#[test]
fn bounds_are_noops() {
    let mut store = make_store();
    let before = store.require_project().clone();
    let revision = store.revision();
    let mut history = CommandHistory::new(HistoryConfig::default());

    for _ in 0..3 {
        assert_eq!(history.undo(&mut store).unwrap(), HistoryStep::NothingToUndo);
        assert_eq!(history.redo(&mut store).unwrap(), HistoryStep::NothingToRedo);
    }
    assert_eq!(store.require_project(), &before);
    assert_eq!(store.revision(), revision);
}

#[test]
fn merged_slider_drag_undoes_in_one_step() {
    let mut store = make_store();
    let before = store.require_project().clone();
    let mut history = CommandHistory::new(HistoryConfig::default());
    let start = Instant::now();

    for (i, size) in [20.0, 22.0, 24.0, 26.0, 28.0].into_iter().enumerate() {
        let outcome = history
            .push_at(
                &mut store,
                Box::new(UpdateEffectCommand::new(keystroke("k1", size))),
                start + Duration::from_millis(i as u64 * 100),
            )
            .unwrap();
        let expected = if i == 0 {
            PushOutcome::Executed
        } else {
            PushOutcome::Merged
        };
        assert_eq!(outcome, expected);
    }
    assert_eq!(history.len(), 1);

    history.undo(&mut store).unwrap();
    assert_eq!(store.require_project(), &before);
    assert!(!history.can_undo());
}

#[test]
fn history_depth_is_bounded() {
    let mut store = make_store();
    let mut history = CommandHistory::new(HistoryConfig {
        max_entries: 4,
        merge_enabled: false,
        ..HistoryConfig::default()
    });
    for i in 0..10 {
        let track = Track::new(format!("t{i}"), format!("Track {i}"), TrackType::Overlay);
        history
            .push(&mut store, Box::new(AddTrackCommand::new(track, None)))
            .unwrap();
    }
    assert_eq!(history.len(), 4);

    while history.can_undo() {
        history.undo(&mut store).unwrap();
    }
    // the six oldest additions can no longer be undone
    assert_eq!(store.require_project().timeline.tracks.len(), 2 + 6);
}

/// `make_store` plus an older project's leftover: the recording carries a
/// second effect with the clip effect's id.
fn make_shared_id_store() -> DocumentStore {
    let mut project = make_store().require_project().clone();
    project.recordings[0].effects.push(keystroke("k1", 40.0));
    DocumentStore::with_project(project)
}

#[test]
fn shared_effect_id_edits_undo_exactly() {
    let commands: Vec<Box<dyn Command>> = vec![
        Box::new(RemoveEffectCommand::new("k1")),
        Box::new(UpdateEffectCommand::new(keystroke("k1", 12.0))),
        Box::new(RemoveClipCommand::new("c1")),
        Box::new(RemoveTrackCommand::new("v1")),
    ];
    for command in commands {
        let name = command.name().to_string();
        let mut store = make_shared_id_store();
        let before = store.require_project().clone();
        let mut history = CommandHistory::new(HistoryConfig::default());

        history.push(&mut store, command).unwrap();
        let after = store.require_project().clone();
        // the recording copy is never the one edited
        assert_eq!(after.recordings[0].effects[1], keystroke("k1", 40.0), "{name}");

        history.undo(&mut store).unwrap();
        assert_eq!(store.require_project(), &before, "{name} undo");
        history.redo(&mut store).unwrap();
        assert_eq!(store.require_project(), &after, "{name} redo");
    }
}

#[test]
fn failed_undo_keeps_the_entry_for_a_retry() {
    let mut store = make_store();
    let before = store.require_project().clone();
    let mut history = CommandHistory::new(HistoryConfig::default());
    history
        .push(&mut store, Box::new(RemoveClipCommand::new("music")))
        .unwrap();
    let after = store.require_project().clone();

    // the track is taken out behind the history's back
    let (index, track) = store.remove_track(&TrackId::new("a1")).unwrap();
    assert!(history.undo(&mut store).is_err());
    assert_eq!(history.undo_count(), 1);
    assert_eq!(history.undo_label(), Some("Remove clip"));

    store.insert_track(Some(index), track).unwrap();
    assert_eq!(store.require_project(), &after);
    history.undo(&mut store).unwrap();
    assert_eq!(store.require_project(), &before);
    history.redo(&mut store).unwrap();
    assert_eq!(store.require_project(), &after);
}

#[test]
fn lowering_the_limit_keeps_the_redo_tail_usable() {
    let mut store = make_store();
    let original = store.require_project().clone();
    let mut history = CommandHistory::new(HistoryConfig {
        merge_enabled: false,
        ..HistoryConfig::default()
    });

    history
        .push(
            &mut store,
            Box::new(AddClipCommand::new(
                "v1",
                Clip::new("c", "v1", "rec1", 10_000.0, 500.0),
            )),
        )
        .unwrap();
    history
        .push(&mut store, Box::new(MoveClipCommand::new("c", 11_000.0)))
        .unwrap();
    let moved_once = store.require_project().clone();
    history
        .push(&mut store, Box::new(MoveClipCommand::new("c", 12_000.0)))
        .unwrap();
    history
        .push(
            &mut store,
            Box::new(AddTrackCommand::new(
                Track::new("o1", "Overlay", TrackType::Overlay),
                None,
            )),
        )
        .unwrap();
    while history.can_undo() {
        history.undo(&mut store).unwrap();
    }
    assert_eq!(store.require_project(), &original);

    history.set_max_entries(2);
    assert_eq!(history.len(), 2);
    while history.can_redo() {
        history.redo(&mut store).unwrap();
    }
    assert_eq!(store.require_project(), &moved_once);
}

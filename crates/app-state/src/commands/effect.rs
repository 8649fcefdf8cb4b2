use std::any::Any;

use fc_common::EffectId;
use fc_timeline::Effect;

use crate::command::{missing_snapshot, Command, CommandCategory, CommandContext, MergeKey};
use crate::effect_store::{find_effect, EffectLocation, EffectOwner};
use crate::error::CommandResult;

/// Attach an effect to a clip or, for older projects, a recording.
#[derive(Debug)]
pub struct AddEffectCommand {
    owner: EffectOwner,
    index: Option<usize>,
    effect: Effect,
}

impl AddEffectCommand {
    pub fn new(owner: EffectOwner, effect: Effect) -> Self {
        Self {
            owner,
            index: None,
            effect,
        }
    }

    pub fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl Command for AddEffectCommand {
    fn name(&self) -> &str {
        "Add effect"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Effects
    }

    fn can_execute(&self, ctx: &CommandContext<'_>) -> bool {
        ctx.project().is_some_and(|p| {
            let owner_exists = match &self.owner {
                EffectOwner::Clip(id) => p.find_clip(id).is_some(),
                EffectOwner::Recording(id) => p.find_recording(id).is_some(),
            };
            owner_exists && find_effect(p, &self.effect.id).is_none()
        })
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        ctx.effects()
            .add(&self.owner, self.index, self.effect.clone())?;
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        ctx.effects().remove(&self.effect.id)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Detach an effect from wherever it lives.
#[derive(Debug)]
pub struct RemoveEffectCommand {
    effect_id: EffectId,
    removed: Option<(EffectLocation, Effect)>,
}

impl RemoveEffectCommand {
    pub fn new(effect_id: impl Into<EffectId>) -> Self {
        Self {
            effect_id: effect_id.into(),
            removed: None,
        }
    }
}

impl Command for RemoveEffectCommand {
    fn name(&self) -> &str {
        "Remove effect"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Effects
    }

    fn can_execute(&self, ctx: &CommandContext<'_>) -> bool {
        ctx.project()
            .is_some_and(|p| find_effect(p, &self.effect_id).is_some())
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        self.removed = Some(ctx.effects().remove(&self.effect_id)?);
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        let (location, effect) = self.removed.clone().ok_or_else(|| missing_snapshot(self))?;
        ctx.effects().restore(&location, effect)?;
        self.removed = None;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Replace an effect's fields, keyed by its id. Consecutive updates of the
/// same effect merge, so a slider drag becomes one undo step.
#[derive(Debug)]
pub struct UpdateEffectCommand {
    effect: Effect,
    previous: Option<Effect>,
}

impl UpdateEffectCommand {
    pub fn new(effect: Effect) -> Self {
        Self {
            effect,
            previous: None,
        }
    }
}

impl Command for UpdateEffectCommand {
    fn name(&self) -> &str {
        "Update effect"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Effects
    }

    fn can_execute(&self, ctx: &CommandContext<'_>) -> bool {
        ctx.project()
            .is_some_and(|p| find_effect(p, &self.effect.id).is_some())
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        self.previous = Some(ctx.effects().replace(self.effect.clone())?);
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        let previous = self.previous.clone().ok_or_else(|| missing_snapshot(self))?;
        ctx.effects().replace(previous)?;
        self.previous = None;
        Ok(())
    }

    fn merge_key(&self) -> Option<MergeKey> {
        Some(MergeKey::new(
            CommandCategory::Effects,
            format!("effect:{}", self.effect.id),
        ))
    }

    fn try_merge(&mut self, next: &dyn Command) -> bool {
        match next.as_any().downcast_ref::<UpdateEffectCommand>() {
            Some(next) if next.effect.id == self.effect.id => {
                self.effect = next.effect.clone();
                true
            }
            _ => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{assert_undo_round_trip, make_store, zoom};
    use crate::effect_store::effects_for_clip;
    use crate::error::CommandError;
    use crate::store::DocumentStore;
    use fc_common::{ClipId, RecordingId};

    #[test]
    fn add_effect_to_clip_and_recording() {
        let mut store = make_store();
        let mut cmd = AddEffectCommand::new(EffectOwner::Clip(ClipId::new("c2")), zoom("z2", 1.5));
        let after = assert_undo_round_trip(&mut store, &mut cmd);
        assert!(find_effect(&after, &EffectId::new("z2")).is_some());

        let mut cmd = AddEffectCommand::new(
            EffectOwner::Recording(RecordingId::new("rec1")),
            zoom("old", 1.1),
        )
        .at_index(0);
        let after = assert_undo_round_trip(&mut store, &mut cmd);
        assert_eq!(after.recordings[0].effects[0].id, EffectId::new("old"));
    }

    #[test]
    fn add_effect_refuses_duplicate_or_missing_owner() {
        let mut store = make_store();
        let dup = AddEffectCommand::new(EffectOwner::Clip(ClipId::new("c2")), zoom("z1", 1.0));
        assert!(!dup.can_execute(&CommandContext::new(&mut store)));
        let orphan = AddEffectCommand::new(EffectOwner::Clip(ClipId::new("nope")), zoom("z9", 1.0));
        assert!(!orphan.can_execute(&CommandContext::new(&mut store)));
    }

    #[test]
    fn remove_effect_restores_position() {
        let mut store = make_store();
        assert_undo_round_trip(&mut store, &mut RemoveEffectCommand::new("z1"));
        // legacy effect on the recording
        assert_undo_round_trip(&mut store, &mut RemoveEffectCommand::new("legacy"));
    }

    #[test]
    fn update_effect_round_trip() {
        let mut store = make_store();
        let after = assert_undo_round_trip(&mut store, &mut UpdateEffectCommand::new(zoom("z1", 3.0)));
        let found = find_effect(&after, &EffectId::new("z1")).unwrap();
        assert_eq!(found.effect, &zoom("z1", 3.0));
    }

    /// `make_store` with a second "z1" on the recording, as older projects
    /// can carry.
    fn make_shared_id_store() -> DocumentStore {
        let mut project = make_store().require_project().clone();
        project.recordings[0].effects.push(zoom("z1", 9.0));
        DocumentStore::with_project(project)
    }

    #[test]
    fn shared_effect_id_survives_remove_and_update_undo() {
        let mut store = make_shared_id_store();
        let after = assert_undo_round_trip(&mut store, &mut RemoveEffectCommand::new("z1"));
        // the clip copy goes first; the recording copy stays
        assert!(effects_for_clip(&after, &ClipId::new("c1")).is_empty());
        assert_eq!(after.recordings[0].effects.len(), 2);

        let after = assert_undo_round_trip(&mut store, &mut UpdateEffectCommand::new(zoom("z1", 4.0)));
        assert_eq!(effects_for_clip(&after, &ClipId::new("c1"))[0], zoom("z1", 4.0));
        assert_eq!(after.recordings[0].effects[1], zoom("z1", 9.0));
    }

    #[test]
    fn failed_undo_can_be_retried() {
        let mut store = make_store();
        let before = store.require_project().clone();
        let mut cmd = RemoveEffectCommand::new("z1");
        cmd.execute(&mut CommandContext::new(&mut store)).unwrap();

        let project = store.close().unwrap();
        assert_eq!(
            cmd.undo(&mut CommandContext::new(&mut store)),
            Err(CommandError::NoProject)
        );

        store.load(project);
        cmd.undo(&mut CommandContext::new(&mut store)).unwrap();
        assert_eq!(store.require_project(), &before);
        // the snapshot is spent once the undo lands
        assert!(matches!(
            cmd.undo(&mut CommandContext::new(&mut store)),
            Err(CommandError::MissingSnapshot { .. })
        ));
    }

    #[test]
    fn merged_updates_keep_first_snapshot() {
        let mut store = make_store();
        let before = store.require_project().clone();

        let mut first = UpdateEffectCommand::new(zoom("z1", 2.5));
        first.execute(&mut CommandContext::new(&mut store)).unwrap();
        for scale in [2.6, 2.7, 2.8] {
            let mut next = UpdateEffectCommand::new(zoom("z1", scale));
            next.execute(&mut CommandContext::new(&mut store)).unwrap();
            assert_eq!(first.merge_key(), next.merge_key());
            assert!(first.try_merge(&next));
        }
        assert!(!first.try_merge(&UpdateEffectCommand::new(zoom("legacy", 1.0))));

        first.undo(&mut CommandContext::new(&mut store)).unwrap();
        assert_eq!(store.require_project(), &before);
    }
}

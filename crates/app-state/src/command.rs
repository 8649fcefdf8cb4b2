//! The undoable command abstraction.
//!
//! Every user edit is a [`Command`]: an object that knows how to apply itself
//! to the document and how to reverse that application exactly. Commands
//! capture the before-state of whatever they touch when they execute, so undo
//! restores it bit for bit rather than computing an inverse.
//!
//! Commands reach the document only through a [`CommandContext`]. The context
//! exposes the document store and nothing else, so a command cannot push to
//! or pop from the history that is running it.

use std::any::Any;
use std::fmt;

use serde::Serialize;

use fc_timeline::Project;

use crate::effect_store::EffectStore;
use crate::error::{CommandError, CommandResult};
use crate::store::DocumentStore;

/// Broad grouping of commands, used for merge keys and logging.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandCategory {
    Timeline,
    Effects,
    Settings,
    Composite,
}

/// Identifies edits that may coalesce into a single history entry.
///
/// Two consecutive commands merge only when their keys are equal, so the key
/// names both the kind of edit and the thing being edited.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MergeKey {
    pub category: CommandCategory,
    pub target: String,
}

impl MergeKey {
    pub fn new(category: CommandCategory, target: impl Into<String>) -> Self {
        Self {
            category,
            target: target.into(),
        }
    }
}

impl fmt::Display for MergeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{}", self.category, self.target)
    }
}

/// Execution context handed to commands.
pub struct CommandContext<'a> {
    store: &'a mut DocumentStore,
}

impl<'a> CommandContext<'a> {
    pub fn new(store: &'a mut DocumentStore) -> Self {
        Self { store }
    }

    pub fn project(&self) -> Option<&Project> {
        self.store.project()
    }

    pub fn has_project(&self) -> bool {
        self.store.has_project()
    }

    pub fn store(&mut self) -> &mut DocumentStore {
        self.store
    }

    pub fn effects(&mut self) -> EffectStore<'_> {
        EffectStore::new(self.store)
    }
}

/// An undoable edit.
///
/// Contract:
/// - `execute` either applies the whole edit or returns an error with the
///   document unchanged.
/// - After a successful `execute`, `undo` restores the document to exactly
///   the state it had before `execute`.
/// - After `undo`, a further `execute` reapplies the same edit (redo).
pub trait Command: fmt::Debug + Send + Sync {
    /// Human-readable label shown in undo/redo menus.
    fn name(&self) -> &str;

    fn category(&self) -> CommandCategory;

    /// Cheap precondition check. The history refuses commands that fail it.
    fn can_execute(&self, ctx: &CommandContext<'_>) -> bool {
        ctx.has_project()
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()>;

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()>;

    /// Key under which consecutive edits may coalesce. `None` never merges.
    fn merge_key(&self) -> Option<MergeKey> {
        None
    }

    /// Fold an already-executed `next` command into `self`.
    ///
    /// On success `self` must redo to the state after `next` and undo to the
    /// state before `self`. Returns `false` when the commands are not
    /// compatible, in which case `self` is unchanged.
    fn try_merge(&mut self, _next: &dyn Command) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;
}

/// The error a command reports when `undo` runs without a prior `execute`.
pub(crate) fn missing_snapshot(command: &dyn Command) -> CommandError {
    CommandError::MissingSnapshot {
        command: command.name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_key_equality() {
        let a = MergeKey::new(CommandCategory::Effects, "effect:z1");
        let b = MergeKey::new(CommandCategory::Effects, "effect:z1");
        let c = MergeKey::new(CommandCategory::Settings, "effect:z1");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "Effects:effect:z1");
    }

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_string(&CommandCategory::Composite).unwrap();
        assert_eq!(json, "\"composite\"");
    }

    #[test]
    fn context_reflects_store() {
        let mut store = DocumentStore::new();
        let ctx = CommandContext::new(&mut store);
        assert!(!ctx.has_project());
        assert!(ctx.project().is_none());

        store.load(Project::new("p", "P"));
        let ctx = CommandContext::new(&mut store);
        assert_eq!(ctx.project().unwrap().name, "P");
    }
}

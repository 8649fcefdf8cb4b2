//! Command-based undo/redo history.
//!
//! One linear list of executed commands with a cursor:
//! - Entries before the cursor can be undone, entries at or after it redone
//! - Pushing a new command discards the redo tail (new timeline branch)
//! - Consecutive commands with the same merge key coalesce into one entry
//!   when they arrive within the merge window and nothing has been undone
//! - Batch mode groups several pushes into a single composite entry
//! - Maximum depth evicts the oldest entries
//!
//! # Usage
//!
//! ```ignore
//! let mut history = CommandHistory::new(HistoryConfig::default());
//!
//! history.push(&mut store, Box::new(MoveClipCommand::new("c1", 1_200.0)))?;
//! history.undo(&mut store)?;
//! history.redo(&mut store)?;
//!
//! // Batch grouping (for multi-clip operations, etc.)
//! history.start_batch("Ripple delete");
//! history.push(&mut store, Box::new(RemoveClipCommand::new("c1")))?;
//! history.push(&mut store, Box::new(MoveClipCommand::new("c2", 0.0)))?;
//! history.end_batch();
//! ```
//!
//! Commands only ever see a [`CommandContext`], which has no path back to the
//! history, so a command cannot push or undo while it is being applied.

use std::time::{Duration, Instant};

use fc_common::HistoryConfig;

use crate::command::{Command, CommandContext};
use crate::commands::CompositeCommand;
use crate::error::{CommandError, CommandResult};
use crate::store::DocumentStore;

/// A single entry in the undo/redo history.
#[derive(Debug)]
pub struct HistoryEntry {
    /// Human-readable label describing the action (e.g., "Move clip", "Remove track").
    pub label: String,
    /// The executed command, holding its own undo snapshot.
    pub command: Box<dyn Command>,
    /// When this entry was created or last merged into.
    pub timestamp: Instant,
}

/// How a successful push was recorded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    /// A new entry was appended.
    Executed,
    /// The command was folded into the entry on top of the stack.
    Merged,
    /// The command joined the open batch.
    Batched,
}

/// Result of an undo or redo request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistoryStep {
    Applied { label: String },
    NothingToUndo,
    NothingToRedo,
}

/// Linear undo/redo history of executed commands.
#[derive(Debug)]
pub struct CommandHistory {
    entries: Vec<HistoryEntry>,
    /// Number of entries currently applied. `entries[..cursor]` are undoable.
    cursor: usize,
    config: HistoryConfig,
    /// Open batch collecting pushes until `end_batch`.
    batch: Option<CompositeCommand>,
}

impl CommandHistory {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            config,
            batch: None,
        }
    }

    /// Execute `command` and record it.
    ///
    /// A command whose `can_execute` is false is refused and not recorded. A
    /// command whose `execute` fails is not recorded either; the error is
    /// returned and the history is unchanged.
    pub fn push(
        &mut self,
        store: &mut DocumentStore,
        command: Box<dyn Command>,
    ) -> CommandResult<PushOutcome> {
        self.push_at(store, command, Instant::now())
    }

    /// [`push`](Self::push) with an explicit clock reading, for deterministic
    /// merge-window behavior.
    pub fn push_at(
        &mut self,
        store: &mut DocumentStore,
        mut command: Box<dyn Command>,
        now: Instant,
    ) -> CommandResult<PushOutcome> {
        let mut ctx = CommandContext::new(store);

        if !command.can_execute(&ctx) {
            let reason = if ctx.has_project() {
                "preconditions not met"
            } else {
                "no project loaded"
            };
            tracing::debug!(command = command.name(), reason, "Push refused");
            return Err(CommandError::PreconditionFailed {
                command: command.name().to_string(),
                reason: reason.to_string(),
            });
        }

        if let Err(err) = command.execute(&mut ctx) {
            tracing::warn!(command = command.name(), error = %err, "Command failed");
            return Err(err);
        }

        if let Some(batch) = self.batch.as_mut() {
            tracing::debug!(command = command.name(), batch = batch.name(), "Command batched");
            batch.push(command);
            return Ok(PushOutcome::Batched);
        }

        if self.try_merge_top(command.as_ref(), now) {
            return Ok(PushOutcome::Merged);
        }

        self.append(command, now);
        Ok(PushOutcome::Executed)
    }

    fn try_merge_top(&mut self, command: &dyn Command, now: Instant) -> bool {
        if !self.config.merge_enabled || self.cursor != self.entries.len() {
            return false;
        }
        let Some(key) = command.merge_key() else {
            return false;
        };
        let window = Duration::from_millis(self.config.merge_window_ms);
        let Some(top) = self.entries.last_mut() else {
            return false;
        };
        if top.command.merge_key().as_ref() != Some(&key)
            || now.saturating_duration_since(top.timestamp) > window
        {
            return false;
        }
        if !top.command.try_merge(command) {
            return false;
        }

        top.timestamp = now;
        tracing::debug!(label = %top.label, key = %key, "Command merged into top entry");
        true
    }

    fn append(&mut self, command: Box<dyn Command>, now: Instant) {
        self.entries.truncate(self.cursor);

        let label = command.name().to_string();
        tracing::debug!(label = %label, undo_depth = self.cursor + 1, "History entry pushed");
        self.entries.push(HistoryEntry {
            label,
            command,
            timestamp: now,
        });
        self.cursor = self.entries.len();

        self.evict_overflow();
    }

    /// Enforce `max_entries`. Applied entries are evicted oldest first; only
    /// when none are left does the redo tail shrink, from its far end.
    fn evict_overflow(&mut self) {
        let max = self.config.max_entries;
        let overflow = self.entries.len().saturating_sub(max);
        if overflow == 0 {
            return;
        }

        let front = overflow.min(self.cursor);
        if front > 0 {
            self.entries.drain(..front);
            self.cursor -= front;
            tracing::debug!(evicted = front, "Oldest history entries evicted");
        }
        if self.entries.len() > max {
            let dropped = self.entries.len() - max;
            self.entries.truncate(max);
            self.cursor = self.cursor.min(self.entries.len());
            tracing::debug!(dropped, "Redo entries dropped to fit history limit");
        }
    }

    fn end_stuck_batch(&mut self, action: &str) {
        if self.batch.is_some() {
            tracing::warn!(action, "Ending stuck batch");
            self.end_batch();
        }
    }

    /// Undo the most recent applied entry.
    ///
    /// If the command's undo fails, the error is returned and the cursor does
    /// not move.
    pub fn undo(&mut self, store: &mut DocumentStore) -> CommandResult<HistoryStep> {
        self.end_stuck_batch("undo");

        if self.cursor == 0 {
            return Ok(HistoryStep::NothingToUndo);
        }

        let entry = &mut self.entries[self.cursor - 1];
        entry.command.undo(&mut CommandContext::new(store))?;
        let label = entry.label.clone();
        self.cursor -= 1;

        tracing::debug!(label = %label, undo_remaining = self.cursor, "Undo");
        Ok(HistoryStep::Applied { label })
    }

    /// Re-apply the most recently undone entry.
    pub fn redo(&mut self, store: &mut DocumentStore) -> CommandResult<HistoryStep> {
        self.end_stuck_batch("redo");

        if self.cursor == self.entries.len() {
            return Ok(HistoryStep::NothingToRedo);
        }

        let entry = &mut self.entries[self.cursor];
        entry.command.execute(&mut CommandContext::new(store))?;
        let label = entry.label.clone();
        self.cursor += 1;

        tracing::debug!(
            label = %label,
            redo_remaining = self.entries.len() - self.cursor,
            "Redo"
        );
        Ok(HistoryStep::Applied { label })
    }

    /// Start a batch. Until [`end_batch`](Self::end_batch), pushed commands
    /// execute immediately but are recorded together as one entry.
    pub fn start_batch(&mut self, label: &str) {
        if self.batch.is_some() {
            tracing::warn!(label, "start_batch called while already batching, ignoring");
            return;
        }
        self.batch = Some(CompositeCommand::new(label));
        tracing::debug!(label, "Batch started");
    }

    /// Close the open batch. Returns `true` if it produced a history entry;
    /// an empty batch records nothing.
    pub fn end_batch(&mut self) -> bool {
        let Some(batch) = self.batch.take() else {
            return false;
        };
        if batch.is_empty() {
            tracing::debug!("Empty batch ended, nothing recorded");
            return false;
        }
        self.append(Box::new(batch), Instant::now());
        true
    }

    /// Whether a batch operation is currently in progress.
    pub fn is_batching(&self) -> bool {
        self.batch.is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Label of the action that would be undone next.
    pub fn undo_label(&self) -> Option<&str> {
        self.cursor
            .checked_sub(1)
            .map(|i| self.entries[i].label.as_str())
    }

    /// Label of the action that would be redone next.
    pub fn redo_label(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(|e| e.label.as_str())
    }

    pub fn undo_count(&self) -> usize {
        self.cursor
    }

    pub fn redo_count(&self) -> usize {
        self.entries.len() - self.cursor
    }

    /// Total entries, applied and undone.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Drop all entries and any open batch. The document is not touched.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
        self.batch = None;
        tracing::debug!("History cleared");
    }

    pub fn max_entries(&self) -> usize {
        self.config.max_entries
    }

    /// Set the maximum number of entries. Evicts the oldest if needed.
    pub fn set_max_entries(&mut self, max: usize) {
        self.config.max_entries = max;
        self.evict_overflow();
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }
}

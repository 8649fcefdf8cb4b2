use std::any::Any;

use crate::command::{Command, CommandCategory, CommandContext};
use crate::error::CommandResult;

/// Several commands applied as one undo step.
///
/// Children execute in order and undo in reverse. If any child fails, the
/// children already applied are reversed before the error is returned, so
/// the composite is all-or-nothing in both directions.
#[derive(Debug)]
pub struct CompositeCommand {
    name: String,
    children: Vec<Box<dyn Command>>,
}

impl CompositeCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with(mut self, command: impl Command + 'static) -> Self {
        self.children.push(Box::new(command));
        self
    }

    pub fn push(&mut self, command: Box<dyn Command>) {
        self.children.push(command);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Command for CompositeCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Composite
    }

    /// Only the first child can be checked up front; later children may
    /// depend on what earlier ones create.
    fn can_execute(&self, ctx: &CommandContext<'_>) -> bool {
        match self.children.first() {
            Some(first) => first.can_execute(ctx),
            None => ctx.has_project(),
        }
    }

    fn execute(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        for i in 0..self.children.len() {
            if let Err(err) = self.children[i].execute(ctx) {
                tracing::warn!(
                    composite = %self.name,
                    failed = self.children[i].name(),
                    applied = i,
                    error = %err,
                    "Composite execute failed, rolling back"
                );
                for child in self.children[..i].iter_mut().rev() {
                    if let Err(rollback) = child.undo(ctx) {
                        tracing::error!(
                            child = child.name(),
                            error = %rollback,
                            "Rollback step failed"
                        );
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn undo(&mut self, ctx: &mut CommandContext<'_>) -> CommandResult<()> {
        let count = self.children.len();
        for i in (0..count).rev() {
            if let Err(err) = self.children[i].undo(ctx) {
                tracing::warn!(
                    composite = %self.name,
                    failed = self.children[i].name(),
                    error = %err,
                    "Composite undo failed, re-applying"
                );
                for child in self.children[i + 1..].iter_mut() {
                    if let Err(reapply) = child.execute(ctx) {
                        tracing::error!(
                            child = child.name(),
                            error = %reapply,
                            "Re-apply step failed"
                        );
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

//! # Macro Commands
//!
//! A macro groups child commands so they undo and redo as one history entry.
//! Children run in insertion order and are undone in reverse order. Only the
//! macro's own name is shown in undo/redo labels.

use crate::{Command, CommandResult};

/// Composite command built by `CommandStack::begin_macro`/`end_macro`
pub struct MacroCommand {
    name: String,
    children: Vec<Box<dyn Command>>,
}

impl MacroCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Append a child that has already been executed
    pub(crate) fn push_executed(&mut self, command: Box<dyn Command>) {
        self.children.push(command);
    }

    /// Offer `command` to the last child for merging
    pub(crate) fn merge_into_last(&mut self, command: &dyn Command) -> bool {
        match self.children.last_mut() {
            Some(last) if !last.is_unnamed() => last.merge(command),
            _ => false,
        }
    }

    /// Add a child to a macro that has not been executed yet
    pub fn with_child(mut self, command: impl Command) -> Self {
        self.children.push(Box::new(command));
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Names of the grouped commands, in execution order
    pub fn child_names(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|child| child.name())
    }
}

impl Command for MacroCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self) -> CommandResult {
        for child in &mut self.children {
            child.execute()?;
        }
        Ok(())
    }

    fn undo(&mut self) -> CommandResult {
        for child in self.children.iter_mut().rev() {
            child.undo()?;
        }
        Ok(())
    }

    fn redo(&mut self) -> CommandResult {
        for child in &mut self.children {
            child.redo()?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for MacroCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MacroCommand")
            .field("name", &self.name)
            .field("children", &self.children)
            .finish()
    }
}

//! # Command Stack
//!
//! Linear undo/redo history for one document.
//!
//! ## Design
//!
//! - Pushing a command executes it and records it after the cursor
//! - Anything after the cursor (the redo tail) is discarded by a push
//! - Undo reverses the entry under the cursor and moves the cursor back
//! - Redo re-applies the entry after the cursor and moves the cursor forward
//! - An unnamed entry is a barrier: undo never reverses it
//! - `begin_macro`/`end_macro` collapse the pushes between them into one entry
//! - Clean/dirty is a comparison between the cursor and the saved position
//!
//! A command that fails is reported to the caller unchanged and the cursor
//! stays where it was. Nothing is rolled back.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = CommandStack::new();
//!
//! stack.push(InsertText::new(&buffer, "hello"))?;
//! stack.set_clean(true); // saved
//!
//! stack.push(InsertText::new(&buffer, " world"))?;
//! assert!(!stack.is_clean());
//!
//! stack.undo()?;
//! assert!(stack.is_clean());
//! ```

use std::rc::{Rc, Weak};

use tracing::{debug, instrument, trace, warn};

use crate::undo_manager::{ManagerShared, StackEvent};
use crate::{Command, CommandError, CommandResult, MacroCommand, StackConfig, UndoManager};

/// One slot in the history
struct StackEntry {
    command: Box<dyn Command>,
    sequence_nr: u64,
}

/// Macro recording state
enum Recording {
    Idle,
    Macro {
        group: MacroCommand,
        /// Cursor position when recording started
        insertion: usize,
        /// Number of unmatched `begin_macro` calls
        depth: usize,
    },
}

/// Undo/redo history with a cursor and a saved-position marker
pub struct CommandStack {
    history: Vec<StackEntry>,

    /// Number of entries currently applied; `history[applied - 1]` is the
    /// last command whose execute/redo took effect
    applied: usize,

    /// Value of `applied` at the last save, `None` when that state is gone
    clean_point: Option<usize>,

    recording: Recording,

    config: StackConfig,

    /// Sequence counter used while no manager is attached
    local_sequence_nr: u64,

    undo_manager: Option<Weak<ManagerShared>>,
}

impl CommandStack {
    /// Create an empty, clean stack with the default config
    pub fn new() -> Self {
        Self::with_config(StackConfig::default())
    }

    pub fn with_config(config: StackConfig) -> Self {
        Self {
            history: Vec::new(),
            applied: 0,
            clean_point: Some(0),
            recording: Recording::Idle,
            config,
            local_sequence_nr: 0,
            undo_manager: None,
        }
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Report changes to `manager` and draw sequence numbers from it
    pub fn set_undo_manager(&mut self, manager: &UndoManager) {
        manager.shared().advance_to(self.local_sequence_nr);
        self.undo_manager = Some(Rc::downgrade(manager.shared()));
    }

    pub fn clear_undo_manager(&mut self) {
        self.undo_manager = None;
    }

    pub fn has_undo_manager(&self) -> bool {
        self.manager().is_some()
    }

    fn manager(&self) -> Option<Rc<ManagerShared>> {
        self.undo_manager.as_ref().and_then(Weak::upgrade)
    }

    /// Execute `command` and record it
    pub fn push(&mut self, command: impl Command) -> CommandResult {
        self.push_boxed(Box::new(command))
    }

    /// Execute an already boxed command and record it
    ///
    /// While a macro is recording the command becomes the macro's next child
    /// and history is left alone until `end_macro`.
    pub fn push_boxed(&mut self, mut command: Box<dyn Command>) -> CommandResult {
        command
            .execute()
            .map_err(|err| report_failure("execute", command.as_ref(), err))?;

        let merge = self.config.merge_commands;

        if let Recording::Macro { group, .. } = &mut self.recording {
            if merge && group.merge_into_last(command.as_ref()) {
                trace!(command = command.name(), "merged into previous macro child");
            } else {
                trace!(command = command.name(), macro_name = group.name(), "recorded into macro");
                group.push_executed(command);
            }
            self.notify();
            return Ok(());
        }

        if merge && self.merge_into_tip(command.as_ref()) {
            debug!(command = command.name(), index = ?self.index(), "merged into previous command");
        } else {
            let sequence_nr = self.next_sequence_nr();
            let insertion = self.applied;
            self.commit(command, insertion, sequence_nr);
        }

        self.notify();
        Ok(())
    }

    /// Offer `command` to the entry under the cursor.
    ///
    /// Only at the tip of history, never across the saved position and never
    /// into an unnamed entry.
    fn merge_into_tip(&mut self, command: &dyn Command) -> bool {
        if self.applied == 0 || self.applied != self.history.len() || self.is_clean() {
            return false;
        }

        let tip = &mut self.history[self.applied - 1].command;
        !tip.is_unnamed() && tip.merge(command)
    }

    /// Truncate after `insertion`, append `command` and move the cursor onto it
    fn commit(&mut self, command: Box<dyn Command>, insertion: usize, sequence_nr: u64) {
        if insertion < self.history.len() {
            debug!(discarded = self.history.len() - insertion, "discarding redo tail");
            self.history.truncate(insertion);

            // The saved state lived in the discarded tail and can't be reached again
            if matches!(self.clean_point, Some(point) if point > insertion) {
                self.clean_point = None;
            }
        }

        debug!(command = command.name(), sequence_nr, index = insertion, "pushed command");
        self.history.push(StackEntry {
            command,
            sequence_nr,
        });
        self.applied = self.history.len();

        if self.config.exceeds_limit(self.history.len()) {
            self.evict_oldest();
        }
    }

    fn evict_oldest(&mut self) {
        let evicted = self.history.remove(0);
        debug!(
            command = evicted.command.name(),
            max_levels = self.config.max_levels,
            "evicted oldest command"
        );

        self.applied -= 1;
        self.clean_point = match self.clean_point {
            Some(0) | None => None,
            Some(point) => Some(point - 1),
        };
    }

    fn next_sequence_nr(&mut self) -> u64 {
        match self.manager() {
            Some(manager) => {
                // Keep the local counter in step so a later detach or re-attach
                // never hands out a lower number
                self.local_sequence_nr = manager.next_sequence_nr();
                self.local_sequence_nr
            }
            None => {
                self.local_sequence_nr += 1;
                self.local_sequence_nr
            }
        }
    }

    /// Last sequence number handed out to this stack's pushes
    pub fn sequence_nr(&self) -> u64 {
        self.manager()
            .map_or(self.local_sequence_nr, |manager| manager.sequence_nr())
    }

    /// Undo the entry under the cursor
    ///
    /// Returns `Ok(false)` without doing anything when the history is fully
    /// undone, the entry is unnamed, or a macro is recording.
    pub fn undo(&mut self) -> CommandResult<bool> {
        if !self.can_undo() {
            trace!(index = ?self.index(), "nothing to undo");
            return Ok(false);
        }

        self.undo_step()?;
        self.notify();
        Ok(true)
    }

    /// Redo the entry after the cursor
    ///
    /// Returns `Ok(false)` without doing anything at the tip of history or
    /// while a macro is recording.
    pub fn redo(&mut self) -> CommandResult<bool> {
        if !self.can_redo() {
            trace!(index = ?self.index(), "nothing to redo");
            return Ok(false);
        }

        self.redo_step()?;
        self.notify();
        Ok(true)
    }

    /// Undo every applied entry whose sequence number is at least `sequence_nr`
    ///
    /// Stops early at an unnamed entry. Returns the number of entries undone.
    #[instrument(skip(self), fields(index = ?self.index()))]
    pub fn undo_to(&mut self, sequence_nr: u64) -> CommandResult<usize> {
        let mut steps = 0;
        let mut outcome = Ok(());

        while self.can_undo() && self.history[self.applied - 1].sequence_nr >= sequence_nr {
            if let Err(err) = self.undo_step() {
                outcome = Err(err);
                break;
            }
            steps += 1;
        }

        if steps > 0 {
            self.notify();
        }
        outcome.map(|()| steps)
    }

    /// Redo every entry ahead of the cursor whose sequence number is at most
    /// `sequence_nr`. Returns the number of entries redone.
    #[instrument(skip(self), fields(index = ?self.index()))]
    pub fn redo_to(&mut self, sequence_nr: u64) -> CommandResult<usize> {
        let mut steps = 0;
        let mut outcome = Ok(());

        while self.can_redo() && self.history[self.applied].sequence_nr <= sequence_nr {
            if let Err(err) = self.redo_step() {
                outcome = Err(err);
                break;
            }
            steps += 1;
        }

        if steps > 0 {
            self.notify();
        }
        outcome.map(|()| steps)
    }

    fn undo_step(&mut self) -> CommandResult {
        let entry = &mut self.history[self.applied - 1];
        entry
            .command
            .undo()
            .map_err(|err| report_failure("undo", entry.command.as_ref(), err))?;

        debug!(command = entry.command.name(), index = self.applied - 1, "undid command");
        self.applied -= 1;
        Ok(())
    }

    fn redo_step(&mut self) -> CommandResult {
        let entry = &mut self.history[self.applied];
        entry
            .command
            .redo()
            .map_err(|err| report_failure("redo", entry.command.as_ref(), err))?;

        debug!(command = entry.command.name(), index = self.applied, "redid command");
        self.applied += 1;
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.undo_entry().is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.redo_entry().is_some()
    }

    fn undo_entry(&self) -> Option<&StackEntry> {
        if self.is_recording() || self.applied == 0 {
            return None;
        }
        let entry = &self.history[self.applied - 1];
        (!entry.command.is_unnamed()).then_some(entry)
    }

    fn redo_entry(&self) -> Option<&StackEntry> {
        if self.is_recording() {
            return None;
        }
        self.history.get(self.applied)
    }

    /// Name of the command the next `undo` would reverse, or `""`
    pub fn undo_name(&self) -> &str {
        self.undo_entry().map_or("", |entry| entry.command.name())
    }

    /// Name of the command the next `redo` would re-apply, or `""`
    pub fn redo_name(&self) -> &str {
        self.redo_entry().map_or("", |entry| entry.command.name())
    }

    /// Start grouping pushes into one entry named `name`
    ///
    /// Calling this while a macro is already recording keeps extending that
    /// macro; `name` is ignored and one more `end_macro` is needed.
    pub fn begin_macro(&mut self, name: impl Into<String>) {
        if let Recording::Macro { depth, .. } = &mut self.recording {
            *depth += 1;
            trace!(depth = *depth, "nested begin_macro joins the current macro");
            return;
        }

        let group = MacroCommand::new(name);
        debug!(macro_name = group.name(), index = ?self.index(), "recording macro");
        self.recording = Recording::Macro {
            group,
            insertion: self.applied,
            depth: 1,
        };
    }

    /// Finish the macro started by the matching `begin_macro`
    ///
    /// A macro with children is committed like a push; an empty one is
    /// dropped. Without a recording macro this does nothing.
    #[instrument(skip(self), fields(index = ?self.index()))]
    pub fn end_macro(&mut self) {
        let (group, insertion) = match std::mem::replace(&mut self.recording, Recording::Idle) {
            Recording::Idle => {
                trace!("end_macro without begin_macro");
                return;
            }
            Recording::Macro {
                group,
                insertion,
                depth,
            } if depth > 1 => {
                self.recording = Recording::Macro {
                    group,
                    insertion,
                    depth: depth - 1,
                };
                return;
            }
            Recording::Macro {
                group, insertion, ..
            } => (group, insertion),
        };

        if group.is_empty() {
            debug!(macro_name = group.name(), "discarding empty macro");
            return;
        }

        let sequence_nr = self.next_sequence_nr();
        self.commit(Box::new(group), insertion, sequence_nr);
        self.notify();
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.recording, Recording::Macro { .. })
    }

    /// Whether the cursor sits at the last saved position
    pub fn is_clean(&self) -> bool {
        self.clean_point == Some(self.applied)
    }

    /// `true` marks the current position as saved; `false` forces the stack
    /// dirty until it is marked clean again
    pub fn set_clean(&mut self, clean: bool) {
        self.clean_point = clean.then_some(self.applied);
        debug!(clean, index = ?self.index(), "clean state set");
        self.notify();
    }

    /// Drop all history. Clean status is kept. Does nothing while a macro is
    /// recording.
    #[instrument(skip(self), fields(len = self.history.len()))]
    pub fn clear(&mut self) {
        if self.is_recording() {
            trace!("clear ignored while recording a macro");
            return;
        }

        let was_clean = self.is_clean();
        self.history.clear();
        self.applied = 0;
        self.clean_point = was_clean.then_some(0);

        debug!("cleared history");
        self.notify();
    }

    /// Cursor position: index of the last applied entry, `None` when nothing
    /// is applied
    pub fn index(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Display names of all entries, oldest first
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(|entry| entry.command.name())
    }

    /// Snapshot of undo/redo availability, as sent to manager listeners
    pub fn status(&self) -> StackEvent {
        StackEvent {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            undo_name: self.undo_name().to_string(),
            redo_name: self.redo_name().to_string(),
            clean: self.is_clean(),
            sequence_nr: self.sequence_nr(),
        }
    }

    fn notify(&self) {
        if let Some(manager) = self.manager() {
            manager.notify(&self.status());
        }
    }
}

fn report_failure(action: &str, command: &dyn Command, err: CommandError) -> CommandError {
    warn!(command = command.name(), action, error = %err, "command failed");
    err
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandStack")
            .field("history", &self.names().collect::<Vec<_>>())
            .field("index", &self.index())
            .field("clean", &self.is_clean())
            .field("recording", &self.is_recording())
            .finish()
    }
}

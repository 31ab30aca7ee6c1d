//! # Undo Manager
//!
//! Routes undo/redo requests to whichever `CommandStack` is active. A host with
//! several open documents keeps one stack per document and switches the active
//! stack when focus moves, so global undo/redo shortcuts reach the right one.
//!
//! The manager also owns the state its stacks share:
//! - A global sequence counter, so pushes on different stacks stay ordered
//! - Listeners notified whenever an attached stack changes
//!
//! Stacks hold only a weak handle to that shared state. Dropping the manager
//! detaches every stack silently.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut manager = UndoManager::new();
//! let stack = manager.new_stack();
//! manager.set_active_stack(Some(stack.clone()));
//!
//! stack.borrow_mut().push(command)?;
//! assert_eq!(manager.undo_name(), "Insert text");
//! manager.undo()?;
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::{CommandResult, CommandStack};

/// A stack shared between its document and an `UndoManager`
pub type SharedStack = Rc<RefCell<CommandStack>>;

/// Callback invoked after an attached stack changes
pub type StackListener = Box<dyn Fn(&StackEvent)>;

/// Snapshot of a stack's undo/redo availability
///
/// Listeners receive a snapshot instead of the stack itself; the stack is
/// still mutably borrowed while they run and must not be touched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StackEvent {
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_name: String,
    pub redo_name: String,
    pub clean: bool,
    pub sequence_nr: u64,
}

/// State shared between a manager and the stacks attached to it
#[derive(Default)]
pub(crate) struct ManagerShared {
    sequence_nr: Cell<u64>,
    listeners: RefCell<Vec<StackListener>>,
}

impl ManagerShared {
    pub(crate) fn sequence_nr(&self) -> u64 {
        self.sequence_nr.get()
    }

    pub(crate) fn next_sequence_nr(&self) -> u64 {
        let next = self.sequence_nr.get() + 1;
        self.sequence_nr.set(next);
        next
    }

    /// Make sure numbers handed out later sort after `sequence_nr`
    pub(crate) fn advance_to(&self, sequence_nr: u64) {
        if sequence_nr > self.sequence_nr.get() {
            self.sequence_nr.set(sequence_nr);
        }
    }

    pub(crate) fn notify(&self, event: &StackEvent) {
        for listener in self.listeners.borrow().iter() {
            listener(event);
        }
    }
}

/// Coordinator forwarding undo/redo to the active stack
#[derive(Default)]
pub struct UndoManager {
    shared: Rc<ManagerShared>,
    active_stack: Option<SharedStack>,
}

impl UndoManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stack already attached to this manager
    pub fn new_stack(&self) -> SharedStack {
        let mut stack = CommandStack::new();
        stack.set_undo_manager(self);
        Rc::new(RefCell::new(stack))
    }

    pub(crate) fn shared(&self) -> &Rc<ManagerShared> {
        &self.shared
    }

    /// Make `stack` the target of undo/redo requests
    ///
    /// Neither the previous nor the new stack is modified. Listeners receive
    /// the new stack's status so labels can be refreshed.
    pub fn set_active_stack(&mut self, stack: Option<SharedStack>) {
        debug!(active = stack.is_some(), "switching active stack");
        self.active_stack = stack;

        let event = match &self.active_stack {
            Some(stack) => match stack.try_borrow() {
                Ok(stack) => stack.status(),
                Err(_) => {
                    trace!("active stack is borrowed, skipping notification");
                    return;
                }
            },
            None => StackEvent {
                clean: true,
                sequence_nr: self.shared.sequence_nr(),
                ..Default::default()
            },
        };
        self.shared.notify(&event);
    }

    pub fn active_stack(&self) -> Option<&SharedStack> {
        self.active_stack.as_ref()
    }

    /// Undo on the active stack. Returns `false` when nothing was undone.
    pub fn undo(&self) -> CommandResult<bool> {
        match &self.active_stack {
            Some(stack) => stack.borrow_mut().undo(),
            None => Ok(false),
        }
    }

    /// Redo on the active stack. Returns `false` when nothing was redone.
    pub fn redo(&self) -> CommandResult<bool> {
        match &self.active_stack {
            Some(stack) => stack.borrow_mut().redo(),
            None => Ok(false),
        }
    }

    pub fn undo_name(&self) -> String {
        self.active_stack
            .as_ref()
            .map(|stack| stack.borrow().undo_name().to_string())
            .unwrap_or_default()
    }

    pub fn redo_name(&self) -> String {
        self.active_stack
            .as_ref()
            .map(|stack| stack.borrow().redo_name().to_string())
            .unwrap_or_default()
    }

    /// Whether the active stack is at its saved point (true with no active stack)
    pub fn active_stack_clean(&self) -> bool {
        self.active_stack
            .as_ref()
            .map_or(true, |stack| stack.borrow().is_clean())
    }

    /// Last sequence number handed out to any attached stack
    pub fn sequence_nr(&self) -> u64 {
        self.shared.sequence_nr()
    }

    /// Register a callback run after every change to an attached stack
    ///
    /// Must not be called from inside a listener.
    pub fn subscribe(&self, listener: impl Fn(&StackEvent) + 'static) {
        self.shared.listeners.borrow_mut().push(Box::new(listener));
    }
}

impl std::fmt::Debug for UndoManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoManager")
            .field("sequence_nr", &self.shared.sequence_nr())
            .field("active_stack", &self.active_stack.is_some())
            .field("listeners", &self.shared.listeners.borrow().len())
            .finish()
    }
}

//! # Undo Core
//!
//! Linear undo/redo engine for document editors.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ UndoManager: routes undo/redo to the active │
//! │ stack, numbers pushes, notifies listeners   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ CommandStack (one per document)             │
//! │  - History with a movable cursor            │
//! │  - Macro recording                          │
//! │  - Clean/dirty tracking                     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ Command / MacroCommand: reversible work     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Commands are opaque**: the stack only calls execute/undo/redo and reads names
//! 2. **Unnamed commands are barriers**: they occupy history but can't be undone
//! 3. **Cleanliness is positional**: clean means the cursor is at the saved position
//! 4. **Failures propagate**: a failing command leaves the cursor untouched
//!
//! ## Usage
//!
//! ```rust,ignore
//! use undo_core::{CommandStack, UndoManager};
//!
//! let mut manager = UndoManager::new();
//! let stack = manager.new_stack();
//! manager.set_active_stack(Some(stack.clone()));
//!
//! // Group several edits into one undo step
//! {
//!     let mut stack = stack.borrow_mut();
//!     stack.begin_macro("Indent block");
//!     stack.push(indent_line(3))?;
//!     stack.push(indent_line(4))?;
//!     stack.end_macro();
//! }
//!
//! assert_eq!(manager.undo_name(), "Indent block");
//! manager.undo()?;
//! ```

mod command;
mod command_stack;
mod config;
mod errors;
mod macro_command;
mod undo_manager;

pub use command::{AsAny, Command};
pub use command_stack::CommandStack;
pub use config::StackConfig;
pub use errors::{CommandError, CommandResult};
pub use macro_command::MacroCommand;
pub use undo_manager::{SharedStack, StackEvent, StackListener, UndoManager};

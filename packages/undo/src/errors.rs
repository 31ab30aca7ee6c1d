//! Error types for commands and the stacks that run them

use thiserror::Error;

pub type CommandResult<T = ()> = Result<T, CommandError>;

/// Failure raised by a command's `execute`, `undo` or `redo`.
///
/// The stack never produces these itself; it only passes them through to
/// whoever triggered the operation.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command '{command}' failed: {reason}")]
    Failed { command: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command error: {0}")]
    Other(String),
}

impl CommandError {
    pub fn failed(command: impl Into<String>, reason: impl Into<String>) -> Self {
        CommandError::Failed {
            command: command.into(),
            reason: reason.into(),
        }
    }
}

impl From<String> for CommandError {
    fn from(s: String) -> Self {
        CommandError::Other(s)
    }
}

impl From<&str> for CommandError {
    fn from(s: &str) -> Self {
        CommandError::Other(s.to_string())
    }
}

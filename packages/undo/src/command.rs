use std::any::Any;

use crate::CommandResult;

/// Type-erased access to a command's concrete type.
///
/// Implemented for every `'static` type, so commands never write it by hand.
/// `Command::merge` uses it to check whether the offered command is of the
/// same kind.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Trait for reversible units of work
///
/// Each command type implements this trait to provide:
/// - A display name (empty means the command cannot be undone)
/// - First-time execution
/// - Undo of the most recent application
/// - Redo after an undo
///
/// `undo` followed by `redo` (or `execute`) must leave every piece of state the
/// command owns as it was. The stack relies on this but never checks it.
pub trait Command: AsAny + 'static {
    /// Name shown in undo/redo labels
    fn name(&self) -> &str;

    /// Apply the command for the first time
    fn execute(&mut self) -> CommandResult;

    /// Reverse the most recent application
    fn undo(&mut self) -> CommandResult;

    /// Re-apply after an undo
    fn redo(&mut self) -> CommandResult {
        self.execute()
    }

    /// Offer the next pushed command to this one.
    ///
    /// Return `true` after absorbing `other`'s effect; the stack then drops
    /// `other` and a later undo of `self` must reverse both.
    fn merge(&mut self, _other: &dyn Command) -> bool {
        false
    }
}

impl dyn Command {
    /// Downcast to a concrete command type
    pub fn downcast_ref<T: Command>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Whether undo must stop at this command
    pub fn is_unnamed(&self) -> bool {
        self.name().is_empty()
    }
}

impl std::fmt::Debug for dyn Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command").field("name", &self.name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rename {
        from: String,
        to: String,
    }

    impl Command for Rename {
        fn name(&self) -> &str {
            "Rename"
        }

        fn execute(&mut self) -> CommandResult {
            Ok(())
        }

        fn undo(&mut self) -> CommandResult {
            std::mem::swap(&mut self.from, &mut self.to);
            Ok(())
        }

        fn merge(&mut self, other: &dyn Command) -> bool {
            match other.downcast_ref::<Rename>() {
                Some(next) => {
                    self.to = next.to.clone();
                    true
                }
                None => false,
            }
        }
    }

    struct Noop;

    impl Command for Noop {
        fn name(&self) -> &str {
            ""
        }

        fn execute(&mut self) -> CommandResult {
            Ok(())
        }

        fn undo(&mut self) -> CommandResult {
            Ok(())
        }
    }

    #[test]
    fn test_downcast_through_trait_object() {
        let boxed: Box<dyn Command> = Box::new(Rename {
            from: "a".into(),
            to: "b".into(),
        });
        assert!(boxed.as_ref().downcast_ref::<Rename>().is_some());
        assert!(boxed.as_ref().downcast_ref::<Noop>().is_none());
    }

    #[test]
    fn test_merge_same_kind_only() {
        let mut first = Rename {
            from: "a".into(),
            to: "b".into(),
        };
        let second = Rename {
            from: "b".into(),
            to: "c".into(),
        };
        assert!(first.merge(&second));
        assert_eq!(first.to, "c");
        assert!(!first.merge(&Noop));
    }

    #[test]
    fn test_unnamed_and_default_redo() {
        let mut noop: Box<dyn Command> = Box::new(Noop);
        assert!(noop.is_unnamed());
        assert!(noop.redo().is_ok());
        let named: Box<dyn Command> = Box::new(Rename {
            from: String::new(),
            to: String::new(),
        });
        assert!(!named.is_unnamed());
    }
}

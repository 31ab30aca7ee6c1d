//! Commands shared by the integration tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use undo_core::{Command, CommandError, CommandResult};

/// Counter the test commands operate on
pub type Counter = Rc<Cell<i64>>;

pub fn counter() -> Counter {
    Rc::new(Cell::new(0))
}

/// Simplest command possible: increments a shared counter by one
pub struct SimpleCommand {
    pub data: Counter,
}

impl SimpleCommand {
    pub fn new(data: &Counter) -> Self {
        Self { data: data.clone() }
    }
}

impl Command for SimpleCommand {
    fn name(&self) -> &str {
        "Increment by 1"
    }

    fn execute(&mut self) -> CommandResult {
        self.redo()
    }

    fn redo(&mut self) -> CommandResult {
        self.data.set(self.data.get() + 1);
        Ok(())
    }

    fn undo(&mut self) -> CommandResult {
        self.data.set(self.data.get() - 1);
        Ok(())
    }
}

/// Same as `SimpleCommand` but without a name, so it can't be undone
pub struct UnnamedCommand {
    inner: SimpleCommand,
}

impl UnnamedCommand {
    pub fn new(data: &Counter) -> Self {
        Self {
            inner: SimpleCommand::new(data),
        }
    }
}

impl Command for UnnamedCommand {
    fn name(&self) -> &str {
        ""
    }

    fn execute(&mut self) -> CommandResult {
        self.inner.execute()
    }

    fn undo(&mut self) -> CommandResult {
        self.inner.undo()
    }
}

/// Which call a `FailingCommand` fails on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Execute,
    Undo,
    Redo,
}

pub struct FailingCommand {
    pub fail_on: FailOn,
    pub data: Counter,
}

impl FailingCommand {
    pub fn new(fail_on: FailOn, data: &Counter) -> Self {
        Self {
            fail_on,
            data: data.clone(),
        }
    }

    fn check(&self, call: FailOn) -> CommandResult {
        if self.fail_on == call {
            Err(CommandError::failed("Fragile", format!("{:?} refused", call)))
        } else {
            Ok(())
        }
    }
}

impl Command for FailingCommand {
    fn name(&self) -> &str {
        "Fragile"
    }

    fn execute(&mut self) -> CommandResult {
        self.check(FailOn::Execute)?;
        self.data.set(self.data.get() + 1);
        Ok(())
    }

    fn undo(&mut self) -> CommandResult {
        self.check(FailOn::Undo)?;
        self.data.set(self.data.get() - 1);
        Ok(())
    }

    fn redo(&mut self) -> CommandResult {
        self.check(FailOn::Redo)?;
        self.data.set(self.data.get() + 1);
        Ok(())
    }
}

/// Shared text buffer plus a log of every call made on it
#[derive(Default)]
pub struct Journal {
    pub text: String,
    pub calls: Vec<String>,
}

pub type SharedJournal = Rc<RefCell<Journal>>;

pub fn journal() -> SharedJournal {
    Rc::new(RefCell::new(Journal::default()))
}

/// Appends text to a journal; consecutive appends merge into one entry
pub struct AppendCommand {
    pub text: String,
    pub journal: SharedJournal,
}

impl AppendCommand {
    pub fn new(journal: &SharedJournal, text: &str) -> Self {
        Self {
            text: text.to_string(),
            journal: journal.clone(),
        }
    }
}

impl Command for AppendCommand {
    fn name(&self) -> &str {
        "Type"
    }

    fn execute(&mut self) -> CommandResult {
        let mut journal = self.journal.borrow_mut();
        journal.text.push_str(&self.text);
        journal.calls.push(format!("do {}", self.text));
        Ok(())
    }

    fn undo(&mut self) -> CommandResult {
        let mut journal = self.journal.borrow_mut();
        let len = journal.text.len() - self.text.len();
        journal.text.truncate(len);
        journal.calls.push(format!("undo {}", self.text));
        Ok(())
    }

    fn redo(&mut self) -> CommandResult {
        let mut journal = self.journal.borrow_mut();
        journal.text.push_str(&self.text);
        journal.calls.push(format!("redo {}", self.text));
        Ok(())
    }

    fn merge(&mut self, other: &dyn Command) -> bool {
        match other.downcast_ref::<AppendCommand>() {
            Some(next) => {
                self.text.push_str(&next.text);
                true
            }
            None => false,
        }
    }
}

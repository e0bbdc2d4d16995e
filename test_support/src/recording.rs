//! Collaborators that record what the executor asked of them.

use camino::Utf8PathBuf;
use mymake::error::MakeError;
use mymake::exec::CommandRunner;
use mymake::status::BuildReporter;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;

/// Command runner that logs commands instead of spawning a shell.
///
/// Commands succeed unless registered with [`RecordingRunner::fail`]. A
/// command registered with [`RecordingRunner::produces`] creates its output
/// file, standing in for a compiler.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    log: RefCell<Vec<String>>,
    codes: HashMap<String, i32>,
    outputs: HashMap<String, Utf8PathBuf>,
}

impl RecordingRunner {
    /// Runner where every command succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `command` exit with `code`.
    #[must_use]
    pub fn fail(mut self, command: &str, code: i32) -> Self {
        self.codes.insert(command.to_owned(), code);
        self
    }

    /// Make `command` write an empty file at `output`.
    #[must_use]
    pub fn produces(mut self, command: &str, output: impl Into<Utf8PathBuf>) -> Self {
        self.outputs.insert(command.to_owned(), output.into());
        self
    }

    /// Commands run so far, in order.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &str) -> io::Result<i32> {
        self.log.borrow_mut().push(command.to_owned());
        if let Some(output) = self.outputs.get(command) {
            fs::write(output, "")?;
        }
        Ok(self.codes.get(command).copied().unwrap_or(0))
    }
}

/// Reporter that keeps the commands and circular targets it is told about.
///
/// Notices come only from the binary's top level and are not recorded.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    commands: RefCell<Vec<String>>,
    circular: RefCell<Vec<String>>,
}

impl RecordingReporter {
    /// Empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands echoed so far.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    /// Targets reported as circular.
    #[must_use]
    pub fn circular(&self) -> Vec<String> {
        self.circular.borrow().clone()
    }
}

impl BuildReporter for RecordingReporter {
    fn command(&self, command: &str) {
        self.commands.borrow_mut().push(command.to_owned());
    }

    fn circular(&self, target: &str) {
        self.circular.borrow_mut().push(target.to_owned());
    }

    fn notice(&self, _outcome: &MakeError) {}
}

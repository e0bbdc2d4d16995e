//! User-facing build output.
//!
//! Commands are echoed to stdout before they run, as `make` does. Circular
//! dependency warnings go to stderr. Non-fatal outcomes of a requested target
//! ("up to date", "nothing to be done") are reported as notices on stdout.

use std::io::{self, Write};

use crate::error::MakeError;

/// Prefix for messages emitted by the tool itself.
pub const TOOL_NAME: &str = "mymake";

/// Report build progress to the user.
pub trait BuildReporter {
    /// A command is about to run.
    fn command(&self, command: &str);

    /// `target` was reached again along its own dependency chain and skipped.
    fn circular(&self, target: &str);

    /// A requested target needed no work.
    fn notice(&self, outcome: &MakeError);
}

/// Writes to the process's stdout and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl BuildReporter for ConsoleReporter {
    fn command(&self, command: &str) {
        // Output failures must not abort the build.
        drop(writeln!(io::stdout(), "{command}"));
    }

    fn circular(&self, target: &str) {
        drop(writeln!(
            io::stderr(),
            "{TOOL_NAME}: Circular {target} dependency dropped."
        ));
    }

    fn notice(&self, outcome: &MakeError) {
        drop(writeln!(io::stdout(), "{TOOL_NAME}: {outcome}"));
    }
}

/// Emits nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl BuildReporter for SilentReporter {
    fn command(&self, _command: &str) {}
    fn circular(&self, _target: &str) {}
    fn notice(&self, _outcome: &MakeError) {}
}

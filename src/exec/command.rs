//! Command runners used by the executor.
//!
//! [`ShellRunner`] hands each command line to a shell as `<shell> -c <line>`
//! in the project directory, with inherited stdio, and blocks until it exits.

use camino::Utf8PathBuf;
use std::io;
use std::process::{Command, ExitStatus};
use tracing::debug;

/// Runs one rule command and reports its exit code.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Run `command` to completion and return its exit code.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] when the command cannot be started.
    fn run(&self, command: &str) -> io::Result<i32>;
}

/// Runs commands through a system shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellRunner {
    shell: String,
    cwd: Utf8PathBuf,
}

impl ShellRunner {
    /// Run commands with `shell` from inside `cwd`.
    #[must_use]
    pub fn new(shell: impl Into<String>, cwd: impl Into<Utf8PathBuf>) -> Self {
        Self {
            shell: shell.into(),
            cwd: cwd.into(),
        }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> io::Result<i32> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c").arg(command);
        if !self.cwd.as_str().is_empty() {
            cmd.current_dir(&self.cwd);
        }
        debug!(shell = %self.shell, cwd = %self.cwd, command, "spawning command");
        let status = cmd.status()?;
        Ok(exit_code(status))
    }
}

/// Accepts every command without running it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunner;

impl CommandRunner for DryRunner {
    fn run(&self, _command: &str) -> io::Result<i32> {
        Ok(0)
    }
}

/// Exit code of `status`; a signal-terminated process maps to `128 + signal`.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

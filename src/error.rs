//! Error taxonomy for parsing, synthesis and execution.
//!
//! Errors fall into two tiers. Non-fatal errors mean "no work was needed" and
//! are swallowed when a dependency build reports them; fatal errors abort the
//! whole invocation. Callers branch on [`MakeError::kind`] or
//! [`MakeError::is_fatal`], never on message text.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::Utf8PathBuf;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::io;
use thiserror::Error;

/// Classification of a [`MakeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The rule file contains a line that cannot be parsed.
    Parse,
    /// The rule file does not exist.
    NoRuleFile,
    /// The rule file declares no buildable target.
    NoTargets,
    /// A requested target has no rule and no matching file.
    NoRule,
    /// A command exited with a non-zero status.
    CommandFailed,
    /// A command could not be started.
    CommandSpawn,
    /// The target exists but has nothing to build.
    NothingToDo,
    /// The target is newer than all of its dependencies.
    UpToDate,
}

impl ErrorKind {
    /// Whether errors of this kind abort the run.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::NothingToDo | Self::UpToDate)
    }
}

/// A rule file line that could not be parsed.
#[derive(Debug, Error, Diagnostic)]
#[error("Parse error on line {line}: {reason}")]
#[diagnostic(code(mymake::parse))]
pub struct ParseError {
    /// One-based line number of the offending line.
    pub line: usize,
    /// Short description of what was wrong.
    pub reason: &'static str,
    #[source_code]
    src: NamedSource<String>,
    #[label("{reason}")]
    span: SourceSpan,
}

impl ParseError {
    /// Build a parse error pointing at `line` within `source`.
    #[must_use]
    pub fn new(name: &str, source: &str, line: usize, reason: &'static str) -> Self {
        Self {
            line,
            reason,
            src: NamedSource::new(name, source.to_owned()),
            span: line_span(source, line),
        }
    }
}

/// Byte span covering the one-based `line` of `source`, without its newline.
fn line_span(source: &str, line: usize) -> SourceSpan {
    let mut offset = 0usize;
    for (idx, segment) in source.split_inclusive('\n').enumerate() {
        if idx + 1 == line {
            let text = segment.trim_end_matches(['\n', '\r']);
            return SourceSpan::from((offset, text.len()));
        }
        offset += segment.len();
    }
    SourceSpan::from((source.len(), 0))
}

/// Errors raised while loading rules or building targets.
#[derive(Debug, Error, Diagnostic)]
pub enum MakeError {
    /// The rule file could not be parsed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    /// The rule file was not found.
    #[error("No {name} found")]
    #[diagnostic(
        code(mymake::no_rule_file),
        help("create the file or pass --file to point at another one")
    )]
    NoRuleFile {
        /// File name shown to the user.
        name: String,
        /// Resolved path that was looked up.
        path: Utf8PathBuf,
    },

    /// The rule file was parsed but declares no target.
    #[error("No targets specified in {name}")]
    #[diagnostic(code(mymake::no_targets))]
    NoTargets {
        /// File name shown to the user.
        name: String,
    },

    /// The target has no rule and no file of that name exists.
    #[error("No rule to make target '{target}'")]
    #[diagnostic(code(mymake::no_rule))]
    NoRule {
        /// Requested target.
        target: String,
    },

    /// A rule command exited unsuccessfully.
    #[error("Command for target '{target}' failed with exit status {code}")]
    #[diagnostic(code(mymake::command_failed))]
    CommandFailed {
        /// Target whose command failed.
        target: String,
        /// Exit status reported by the shell.
        code: i32,
    },

    /// A rule command could not be started.
    #[error("Could not run command for target '{target}': {command}")]
    #[diagnostic(code(mymake::command_spawn))]
    CommandSpawn {
        /// Target whose command could not be started.
        target: String,
        /// Command text that was being run.
        command: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// Nothing needs doing for the target.
    #[error("Nothing to be done for target '{target}'")]
    NothingToDo {
        /// Target that needed no work.
        target: String,
    },

    /// The target is already newer than its dependencies.
    #[error("Target '{target}' is up to date")]
    UpToDate {
        /// Target that is up to date.
        target: String,
    },
}

impl MakeError {
    /// Classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_) => ErrorKind::Parse,
            Self::NoRuleFile { .. } => ErrorKind::NoRuleFile,
            Self::NoTargets { .. } => ErrorKind::NoTargets,
            Self::NoRule { .. } => ErrorKind::NoRule,
            Self::CommandFailed { .. } => ErrorKind::CommandFailed,
            Self::CommandSpawn { .. } => ErrorKind::CommandSpawn,
            Self::NothingToDo { .. } => ErrorKind::NothingToDo,
            Self::UpToDate { .. } => ErrorKind::UpToDate,
        }
    }

    /// Whether this error aborts the run.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        self.kind().is_fatal()
    }
}

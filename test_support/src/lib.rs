//! Test utilities for mymake.
//!
//! Provides temporary project directories with control over file
//! modification times, collaborators that record what the executor asked
//! for, and a fake shell for end-to-end runs of the binary.

pub mod fake_shell;
pub mod project;
pub mod recording;

pub use fake_shell::FakeShell;
pub use project::Project;
pub use recording::{RecordingReporter, RecordingRunner};

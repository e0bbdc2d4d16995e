//! Fixtures shared by the unit tests.
//!
//! `test_support` depends on this crate, so unit tests cannot use it: they
//! would link a second copy of `mymake` whose types differ from these.

use crate::error::MakeError;
use crate::status::BuildReporter;
use crate::workspace::Workspace;
use camino::Utf8PathBuf;
use rstest::fixture;
use std::cell::RefCell;
use std::fs::{self, File};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Scratch project directory with a workspace rooted in it.
pub(crate) struct Project {
    dir: TempDir,
    pub(crate) workspace: Workspace,
}

impl Project {
    pub(crate) fn write(&self, name: &str, contents: &str) {
        fs::write(self.dir.path().join(name), contents).expect("write file");
    }

    /// Create `name` empty with a modification time `age_secs` in the past.
    pub(crate) fn touch(&self, name: &str, age_secs: u64) {
        let file = File::create(self.dir.path().join(name)).expect("create file");
        let when = SystemTime::now() - Duration::from_secs(age_secs);
        file.set_modified(when).expect("set mtime");
    }
}

#[fixture]
pub(crate) fn project() -> Project {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
    Project {
        workspace: Workspace::new(root),
        dir,
    }
}

/// Reporter that keeps what it is told.
#[derive(Default)]
pub(crate) struct RecordingReporter {
    pub(crate) commands: RefCell<Vec<String>>,
    pub(crate) circular: RefCell<Vec<String>>,
    pub(crate) notices: RefCell<Vec<String>>,
}

impl BuildReporter for RecordingReporter {
    fn command(&self, command: &str) {
        self.commands.borrow_mut().push(command.to_owned());
    }

    fn circular(&self, target: &str) {
        self.circular.borrow_mut().push(target.to_owned());
    }

    fn notice(&self, outcome: &MakeError) {
        self.notices.borrow_mut().push(outcome.to_string());
    }
}

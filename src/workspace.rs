//! Filesystem access rooted at the project directory.
//!
//! Target and dependency names are resolved against the project root unless
//! they are absolute. Each lookup opens the entry's parent directory through
//! `cap-std` and queries the entry by name.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use std::io::{self, Write};
use std::time::SystemTime;
use tempfile::NamedTempFile;

/// Project directory against which names are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: Utf8PathBuf,
}

struct ParentDir {
    handle: Dir,
    entry: String,
}

impl Workspace {
    /// Root the workspace at `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Project directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Path of `name` relative to the project directory.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    fn parent_dir(&self, name: &str) -> io::Result<ParentDir> {
        let path = self.resolve(name);
        let entry = path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?
            .to_owned();
        let dir_path = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let handle = Dir::open_ambient_dir(dir_path, ambient_authority())?;
        Ok(ParentDir { handle, entry })
    }

    /// Whether `name` exists. Lookup failures count as absent.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.parent_dir(name)
            .and_then(|parent| parent.handle.metadata(&parent.entry))
            .is_ok()
    }

    /// Modification time of `name`, or `None` when it cannot be read.
    #[must_use]
    pub fn modified(&self, name: &str) -> Option<SystemTime> {
        self.parent_dir(name)
            .and_then(|parent| parent.handle.metadata(&parent.entry))
            .and_then(|meta| meta.modified())
            .map(cap_std::time::SystemTime::into_std)
            .ok()
    }

    /// Read `name` as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] when the file cannot be opened or read.
    pub fn read_to_string(&self, name: &str) -> io::Result<String> {
        let parent = self.parent_dir(name)?;
        parent.handle.read_to_string(&parent.entry)
    }

    /// Replace `name` with `contents` through a temporary file and rename.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] when the temporary file cannot be written or
    /// moved into place.
    pub fn write_atomic(&self, name: &str, contents: &str) -> io::Result<()> {
        let path = self.resolve(name);
        let dir = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&path).map_err(|err| err.error)?;
        Ok(())
    }
}

//! Temporary project directories.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use mymake::workspace::Workspace;
use std::fs::{self, File};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// A scratch project directory removed on drop.
#[derive(Debug)]
pub struct Project {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Project {
    /// Create an empty project directory.
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be created or its path is not UTF-8.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("create project directory")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow::anyhow!("non UTF-8 temp dir {}", path.display()))?;
        Ok(Self { _dir: dir, root })
    }

    /// Project directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Workspace rooted at the project directory.
    #[must_use]
    pub fn workspace(&self) -> Workspace {
        Workspace::new(self.root.clone())
    }

    /// Absolute path of `name`.
    #[must_use]
    pub fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    /// Write `contents` to `name`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be written.
    pub fn write(&self, name: &str, contents: &str) -> Result<()> {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {path}"))
    }

    /// Write the rule file under its default name.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be written.
    pub fn rule_file(&self, contents: &str) -> Result<()> {
        self.write(mymake_env::DEFAULT_RULE_FILE, contents)
    }

    /// Create `name` if needed and set its modification time `secs_ago`
    /// seconds in the past.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be created or its time set.
    pub fn touch_aged(&self, name: &str, secs_ago: u64) -> Result<()> {
        let path = self.path(name);
        if !path.exists() {
            self.write(name, "")?;
        }
        let when = SystemTime::now()
            .checked_sub(Duration::from_secs(secs_ago))
            .context("time underflow")?;
        File::options()
            .write(true)
            .open(&path)
            .and_then(|file| file.set_modified(when))
            .with_context(|| format!("set mtime of {path}"))
    }

    /// Remove `name`.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be removed.
    pub fn remove(&self, name: &str) -> Result<()> {
        let path = self.path(name);
        fs::remove_file(&path).with_context(|| format!("remove {path}"))
    }

    /// Read `name` as text.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read.
    pub fn read(&self, name: &str) -> Result<String> {
        let path = self.path(name);
        fs::read_to_string(&path).with_context(|| format!("read {path}"))
    }

    /// Whether `name` exists.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }
}

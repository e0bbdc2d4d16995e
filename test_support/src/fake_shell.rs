//! A stand-in shell for end-to-end tests of the binary.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// Executable script accepting `<shell> -c <command>`.
///
/// Each command is appended to a log file. Commands starting with `exit N`
/// exit with status `N`; everything else succeeds.
#[derive(Debug)]
pub struct FakeShell {
    _dir: TempDir,
    path: Utf8PathBuf,
    log: Utf8PathBuf,
}

impl FakeShell {
    /// Write the script into a fresh temporary directory.
    ///
    /// # Errors
    ///
    /// Fails when the script cannot be written or made executable.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("create shell directory")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow::anyhow!("non UTF-8 temp dir {}", path.display()))?;
        let path = root.join("sh");
        let log = root.join("commands.log");
        let script = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$2\" >> '{log}'\ncase \"$2\" in\n  exit\\ *) exit ${{2#exit }} ;;\nesac\nexit 0\n"
        );
        fs::write(&path, script).with_context(|| format!("write {path}"))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .with_context(|| format!("chmod {path}"))?;
        }
        Ok(Self {
            _dir: dir,
            path,
            log,
        })
    }

    /// Path to pass as `--shell`.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Commands the shell was asked to run, in order.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .map(|log| log.lines().map(str::to_owned).collect())
            .unwrap_or_default()
    }
}

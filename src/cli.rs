//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands. It only
//! depends on `clap` and `mymake_env` so the build script can include it to
//! render the manual page.

use clap::{Args, Parser, Subcommand, ValueEnum};
use mymake_env::{
    CACHE_FILE_ENV, DEFAULT_CACHE_FILE, DEFAULT_RULE_FILE, DEFAULT_SHELL, RULE_FILE_ENV, SHELL_ENV,
};
use std::path::PathBuf;

/// Encoding used for the rule cache file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum CacheFormat {
    /// Line-oriented records.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// A small make: builds targets from a rule file, inferring C and C++ rules.
#[derive(Debug, Parser)]
#[command(name = "mymake", author, version, about, long_about = None)]
pub struct Cli {
    /// Rule file to read, relative to the project directory.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = RULE_FILE_ENV,
        default_value = DEFAULT_RULE_FILE
    )]
    pub file: String,

    /// Change to this directory before doing anything.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Rule cache file, relative to the project directory.
    #[arg(
        long,
        value_name = "FILE",
        env = CACHE_FILE_ENV,
        default_value = DEFAULT_CACHE_FILE
    )]
    pub cache_file: String,

    /// Neither read nor write the rule cache.
    #[arg(long)]
    pub no_cache: bool,

    /// Encoding of the rule cache file.
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t)]
    pub cache_format: CacheFormat,

    /// Shell used to run commands as `<shell> -c <command>`.
    #[arg(long, value_name = "PATH", env = SHELL_ENV, default_value = DEFAULT_SHELL)]
    pub shell: String,

    /// Print commands without running them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Optional subcommand to execute; defaults to `build` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Apply the default command if none was specified.
    #[must_use]
    pub fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Build(BuildArgs::default()));
        }
        self
    }
}

/// Arguments accepted by the `build` command.
#[derive(Debug, Args, Default, PartialEq, Eq, Clone)]
pub struct BuildArgs {
    /// Targets to build in order; the default target when empty.
    pub targets: Vec<String>,
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Build the given targets, or the default target (the default command).
    Build(BuildArgs),

    /// Print the rule graph after implicit rules have been filled in.
    Rules,
}

//! Application entry point.
//!
//! Parses command-line arguments and delegates execution to [`runner::run`].

use clap::Parser;
use mymake::{cli::Cli, error::MakeError, runner};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt;

fn main() -> ExitCode {
    let cli = Cli::parse().with_default_command();
    let max_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::ERROR
    };
    fmt()
        .with_max_level(max_level)
        .with_writer(io::stderr)
        .init();
    match runner::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast::<MakeError>() {
                Ok(make_err) => {
                    let report = miette::Report::new(make_err);
                    drop(writeln!(io::stderr(), "{report:?}"));
                }
                Err(other) => {
                    let message = format!("{other:#}");
                    tracing::error!(error = %message, "run failed");
                }
            }
            ExitCode::FAILURE
        }
    }
}

//! mymake core library.
//!
//! Reads a make-style rule file, fills in implicit rules for C and C++
//! sources, caches the resulting rule graph between runs and builds targets
//! by running their shell commands in dependency order.

pub mod cache;
pub mod cli;
pub mod error;
pub mod exec;
pub mod graph;
pub mod parser;
pub mod runner;
pub mod status;
pub mod synth;
#[cfg(test)]
mod test_helpers;
pub mod vars;
pub mod workspace;

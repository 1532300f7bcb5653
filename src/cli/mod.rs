//! Terminal shell over the transaction controller.

mod commands;
pub mod output;
pub mod render;
pub mod shell;

use rustyline::error::ReadlineError;
use thiserror::Error;

use crate::errors::TrackerError;

pub use commands::{CliMode, ShellContext};
pub use shell::run_cli;

/// Failures that end the shell.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Readline error: {0}")]
    Readline(#[from] ReadlineError),
}

/// Failures of a single command; reported and the shell keeps going.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

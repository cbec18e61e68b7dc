//! Error types for dispatch and execution.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("resolution failed for command '{0}': target not found")]
    NotFound(String),

    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to wait for '{program}': {source}")]
    Wait {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to print the command listing: {0}")]
    Listing(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot determine the executable path: {0}")]
    ExecutablePath(#[source] std::io::Error),

    #[error("cannot resolve '{path}': {source}")]
    Canonicalize {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invoked through the system linker '{linker}' without a program argument")]
    MissingProgram { linker: PathBuf },

    #[error("command not found: {cmd}")]
    CommandNotFound { cmd: String },

    #[error("command failed: {cmd}, source: {source}")]
    CommandFailed { cmd: String, source: std::io::Error },

    #[error("command '{cmd}' exited unsuccessfully: {status}")]
    CommandStatus {
        cmd: String,
        status: std::process::ExitStatus,
    },

    #[error("invalid API level {0:?}")]
    InvalidApiLevel(String),

    #[error("cannot build {var}: a path contains the separator character")]
    JoinPaths { var: &'static str },
}

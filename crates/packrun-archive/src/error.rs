use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported archive format")]
    UnsupportedFormat,

    #[error("archive is corrupted: {0}")]
    Corrupted(#[source] io::Error),

    #[error("path traversal detected: entry '{entry}' escapes the extraction root")]
    PathEscape { entry: PathBuf },

    #[error("symlink target escapes the extraction root: '{target}' in '{symlink}'")]
    SymlinkEscape { target: PathBuf, symlink: PathBuf },

    #[error("entry '{entry}' would be written through symlink '{symlink}'")]
    SymlinkTraversal { entry: PathBuf, symlink: PathBuf },

    #[error("symlink target is absolute path: '{target}' in '{symlink}'")]
    AbsoluteSymlinkTarget { target: PathBuf, symlink: PathBuf },

    #[error("entry path is empty or unreadable: '{entry}'")]
    InvalidPath { entry: PathBuf },

    #[error("failed to extract '{path}': {source}")]
    ExtractionFailed { path: PathBuf, source: io::Error },

    #[error("failed to create directory: {path}: {source}")]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    #[error("failed to create symlink '{link}' -> '{target}': {source}")]
    SymlinkCreationFailed {
        target: PathBuf,
        link: PathBuf,
        source: io::Error,
    },

    #[error(transparent)]
    Permissions(#[from] packrun_fs::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

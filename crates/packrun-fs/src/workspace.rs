use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Directory name prefix of every workspace; the process id follows it.
pub const WORKSPACE_PREFIX: &str = ".tmp_run_dir_";

/// Name of the workspace directory for process `pid`.
pub fn workspace_name(pid: u32) -> String {
    format!("{WORKSPACE_PREFIX}{pid}")
}

/// A process-private scratch directory, removed when dropped.
///
/// The guard owns the directory for its whole lifetime. Every exit path of
/// the owner (normal return, early `?`, panic unwinding) drops it, so the
/// directory is removed exactly once.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    removed: bool,
}

impl Workspace {
    /// Create the workspace at `path`, replacing any stale directory of the
    /// same name left behind by a previous process with a recycled pid.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let root = path.into();

        if root.exists() {
            std::fs::remove_dir_all(&root).map_err(|e| Error::Remove {
                path: root.clone(),
                source: e,
            })?;
        }

        std::fs::create_dir_all(&root).map_err(|e| Error::Create {
            path: root.clone(),
            source: e,
        })?;

        Ok(Self {
            root,
            removed: false,
        })
    }

    /// Create the workspace for `pid` under the first usable root.
    ///
    /// Roots are tried in order; failures are logged and the next root is
    /// tried. Returns [`Error::Unavailable`] when no root works.
    pub fn establish<I>(roots: I, pid: u32) -> Result<Self>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let name = workspace_name(pid);
        let mut tried = Vec::new();

        for root in roots {
            let candidate = root.join(&name);
            match Self::create(&candidate) {
                Ok(workspace) => {
                    if !tried.is_empty() {
                        tracing::warn!(
                            workspace = %candidate.display(),
                            "using fallback workspace location"
                        );
                    }
                    return Ok(workspace);
                }
                Err(e) => {
                    tracing::debug!(error = %e, "workspace candidate rejected");
                    tried.push(candidate);
                }
            }
        }

        Err(Error::Unavailable { tried })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Directory holding the extracted commands.
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    /// Directory holding the shared libraries of the extracted commands.
    pub fn lib_dir(&self) -> PathBuf {
        self.root.join("bin").join("lib")
    }

    /// Remove the workspace now and report failures, instead of the silent
    /// best-effort removal of `Drop`.
    pub fn close(mut self) -> Result<()> {
        self.removed = true;
        remove(&self.root)
    }
}

fn remove(root: &Path) -> Result<()> {
    match std::fs::remove_dir_all(root) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Remove {
            path: root.to_path_buf(),
            source: e,
        }),
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = remove(&self.root) {
            tracing::warn!(error = %e, "workspace cleanup failed");
        }
    }
}

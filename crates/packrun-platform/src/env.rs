use crate::error::{Error, Result};
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Variable naming the temporary directory for the child and the OS temp-file
/// machinery.
pub const TEMP_DIR_VAR: &str = "TMPDIR";

/// Variable the dynamic loader searches for shared libraries.
#[cfg(target_os = "macos")]
pub const LIBRARY_PATH_VAR: &str = "DYLD_LIBRARY_PATH";
#[cfg(windows)]
pub const LIBRARY_PATH_VAR: &str = "PATH";
#[cfg(not(any(target_os = "macos", windows)))]
pub const LIBRARY_PATH_VAR: &str = "LD_LIBRARY_PATH";

/// The system temporary root (`TMPDIR`, or the platform default if unset).
pub fn system_temp_dir() -> PathBuf {
    env::temp_dir()
}

fn paths_equal(p1: &Path, p2: &Path) -> bool {
    fn normalize(p: &Path) -> String {
        let s = p.to_string_lossy();
        let s = s.trim_end_matches(['/', '\\']);
        if cfg!(windows) {
            s.to_lowercase()
        } else {
            s.to_string()
        }
    }
    normalize(p1) == normalize(p2)
}

/// Builder for a search-path style variable.
#[derive(Debug, Clone, Default)]
pub struct PathModifier {
    var: &'static str,
    paths: Vec<PathBuf>,
}

impl PathModifier {
    /// Start from the current value of `var`.
    pub fn from_env(var: &'static str) -> Self {
        Self {
            var,
            paths: split_var(var).unwrap_or_default(),
        }
    }

    /// Start from an empty value, discarding whatever `var` holds.
    pub fn empty(var: &'static str) -> Self {
        Self {
            var,
            paths: Vec::new(),
        }
    }

    pub fn prepend(mut self, path: PathBuf) -> Self {
        if !self.paths.iter().any(|p| paths_equal(p, &path)) {
            self.paths.insert(0, path);
        }
        self
    }

    pub fn build(self) -> Result<OsString> {
        env::join_paths(self.paths).map_err(|_| Error::JoinPaths { var: self.var })
    }
}

fn split_var(var: &str) -> Option<Vec<PathBuf>> {
    env::var_os(var).map(|val| env::split_paths(&val).collect())
}

/// Environment the extracted commands run with.
///
/// The temp directory points into the workspace and the library search path
/// at the workspace's library directory. On Windows the library directory is
/// prepended to `PATH` instead of replacing it.
pub fn workspace_exports(workspace: &Path, lib_dir: &Path) -> Result<Vec<(OsString, OsString)>> {
    let library_path = if cfg!(windows) {
        PathModifier::from_env(LIBRARY_PATH_VAR).prepend(lib_dir.to_path_buf())
    } else {
        PathModifier::empty(LIBRARY_PATH_VAR).prepend(lib_dir.to_path_buf())
    };

    Ok(vec![
        (OsString::from(TEMP_DIR_VAR), workspace.as_os_str().to_owned()),
        (OsString::from(LIBRARY_PATH_VAR), library_path.build()?),
    ])
}

//! Target resolver abstraction.
//!
//! The resolver is the only policy in the shim: it maps a command name to
//! the binary that implements it.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

pub trait TargetResolver {
    fn resolve(&self, command: &OsStr) -> Option<PathBuf>;
}

/// Resolve a command to an entry of one directory.
///
/// Only a single plain name resolves; absolute paths, separators and `.` or
/// `..` would leave the directory. Existence is not checked; a missing
/// binary shows up as a launch failure.
#[derive(Clone, Debug)]
pub struct BinDirResolver {
    bin_dir: PathBuf,
}

impl BinDirResolver {
    pub fn new(bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
        }
    }
}

impl TargetResolver for BinDirResolver {
    fn resolve(&self, command: &OsStr) -> Option<PathBuf> {
        let mut components = Path::new(command).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Some(self.bin_dir.join(name)),
            _ => {
                tracing::debug!(command = %command.to_string_lossy(), "not a plain command name");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_bin_dir_resolver_joins_command() {
        let resolver = BinDirResolver::new("/tmp/.tmp_run_dir_1/bin");
        assert_eq!(
            resolver.resolve(OsStr::new("foo")),
            Some(PathBuf::from("/tmp/.tmp_run_dir_1/bin/foo"))
        );
    }

    #[test]
    fn test_bin_dir_resolver_stays_inside_bin_dir() {
        let resolver = BinDirResolver::new("/ws/bin");
        for command in ["/bin/sh", "../x", "..", ".", "./foo", "lib/libz.so", ""] {
            assert_eq!(resolver.resolve(OsStr::new(command)), None, "{command}");
        }
    }

    #[test]
    fn test_bin_dir_resolver_does_not_check_existence() {
        let resolver = BinDirResolver::new("/nonexistent/bin");
        let resolved = resolver.resolve(OsStr::new("missing")).unwrap();
        assert_eq!(resolved, Path::new("/nonexistent/bin/missing"));
        assert!(!resolved.exists());
    }
}

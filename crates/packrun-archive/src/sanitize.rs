use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Result of sanitizing an archive entry path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SanitizedPath {
    /// Path relative to the extraction root, free of `.` and `..`.
    pub relative: PathBuf,
    /// `base` joined with `relative`.
    pub resolved: PathBuf,
}

/// Resolve an entry path against `base`, rejecting anything that would land
/// outside of it.
///
/// Absolute paths and `..` components that climb above `base` are rejected
/// with [`Error::PathEscape`]. The check is lexical; nothing is read from
/// disk.
pub fn sanitize_path<P: AsRef<Path>, B: AsRef<Path>>(entry_path: P, base: B) -> Result<SanitizedPath> {
    let entry_path = entry_path.as_ref();
    let relative = normalize_relative(entry_path).ok_or_else(|| Error::PathEscape {
        entry: entry_path.to_path_buf(),
    })?;
    let resolved = base.as_ref().join(&relative);

    Ok(SanitizedPath { relative, resolved })
}

/// Validate a symlink target for a link stored at `link_relative` (already
/// sanitized, relative to the extraction root).
///
/// Absolute targets are rejected outright; relative ones must stay inside the
/// root once resolved from the link's directory.
pub fn sanitize_symlink_target<T: AsRef<Path>, L: AsRef<Path>>(target: T, link_relative: L) -> Result<()> {
    let target = target.as_ref();
    let link_relative = link_relative.as_ref();

    if target.has_root() || matches!(target.components().next(), Some(Component::Prefix(_))) {
        return Err(Error::AbsoluteSymlinkTarget {
            target: target.to_path_buf(),
            symlink: link_relative.to_path_buf(),
        });
    }

    let joined = link_relative
        .parent()
        .map(|parent| parent.join(target))
        .unwrap_or_else(|| target.to_path_buf());

    match normalize_relative(&joined) {
        Some(_) => Ok(()),
        None => Err(Error::SymlinkEscape {
            target: target.to_path_buf(),
            symlink: link_relative.to_path_buf(),
        }),
    }
}

/// Drop `.` components and fold `..` into their parent.
///
/// Returns `None` for absolute paths and for paths whose `..` components
/// climb above the starting point.
fn normalize_relative(path: &Path) -> Option<PathBuf> {
    let mut result = PathBuf::new();
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Normal(part) => {
                result.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                result.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_base_path() -> &'static Path {
        if cfg!(windows) {
            Path::new("C:/tmp/.tmp_run_dir_1")
        } else {
            Path::new("/tmp/.tmp_run_dir_1")
        }
    }

    #[test]
    fn basic_path_sanitization() {
        let result = sanitize_path("bin/tool", test_base_path()).unwrap();
        assert_eq!(result.relative, Path::new("bin/tool"));
        assert_eq!(result.resolved, test_base_path().join("bin/tool"));
    }

    #[test]
    fn current_dir_components_are_dropped() {
        let result = sanitize_path("./bin/./lib/libz.so", test_base_path()).unwrap();
        assert_eq!(result.relative, Path::new("bin/lib/libz.so"));
    }

    #[test]
    fn root_entry_resolves_to_base() {
        let result = sanitize_path("./", test_base_path()).unwrap();
        assert_eq!(result.relative, PathBuf::new());
        assert_eq!(result.resolved, test_base_path());
    }

    #[test]
    fn inner_parent_dir_stays_inside() {
        let result = sanitize_path("bin/lib/../tool", test_base_path()).unwrap();
        assert_eq!(result.relative, Path::new("bin/tool"));
    }

    #[test]
    fn leading_parent_dir_rejected() {
        let result = sanitize_path("../etc/passwd", test_base_path());
        assert!(matches!(result, Err(Error::PathEscape { .. })));
    }

    #[test]
    fn climbing_parent_dir_rejected() {
        let result = sanitize_path("bin/../../outside", test_base_path());
        assert!(matches!(result, Err(Error::PathEscape { .. })));
    }

    #[test]
    fn absolute_path_rejected() {
        let malicious = if cfg!(windows) { "C:\\etc\\passwd" } else { "/etc/passwd" };
        let result = sanitize_path(malicious, test_base_path());
        assert!(matches!(result, Err(Error::PathEscape { .. })));
    }

    #[test]
    fn symlink_target_sibling() {
        assert!(sanitize_symlink_target("libz.so.1", "bin/lib/libz.so").is_ok());
    }

    #[test]
    fn symlink_target_parent_inside() {
        assert!(sanitize_symlink_target("../tool", "bin/lib/tool-link").is_ok());
        assert!(sanitize_symlink_target("../..", "bin/lib/root-link").is_ok());
    }

    #[test]
    fn symlink_target_escape_rejected() {
        let result = sanitize_symlink_target("../../../etc", "bin/lib/link");
        assert!(matches!(result, Err(Error::SymlinkEscape { .. })));
    }

    #[test]
    fn symlink_absolute_target_rejected() {
        let absolute = if cfg!(windows) { "C:\\etc\\passwd" } else { "/etc/passwd" };
        let result = sanitize_symlink_target(absolute, "bin/link");
        assert!(matches!(result, Err(Error::AbsoluteSymlinkTarget { .. })));
    }

    #[test]
    fn normalize_folds_parents() {
        let result = normalize_relative(Path::new("foo//bar/baz/../qux")).unwrap();
        assert_eq!(result, Path::new("foo/bar/qux"));
    }

    #[test]
    fn normalize_rejects_escape() {
        assert_eq!(normalize_relative(Path::new("a/../..")), None);
    }
}

use std::path::Path;

use crate::{Error, Result};

/// Bits of an archive mode that are applied to extracted files.
///
/// Setuid, setgid and sticky bits are dropped.
pub const PERMISSION_MASK: u32 = 0o777;

/// Apply Unix permission bits to `path`, ignoring anything outside
/// [`PERMISSION_MASK`].
///
/// # Platform Behavior
/// - **Unix**: sets mode bits via `PermissionsExt::from_mode()`, bypassing the
///   process umask.
/// - **Windows**: only the `readonly` attribute is touched; a mode without any
///   write bit marks the file read-only.
pub fn apply_mode(path: &Path, mode: u32) -> Result<()> {
    let mode = mode & PERMISSION_MASK;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(|e| {
            Error::Permissions {
                path: path.to_path_buf(),
                source: e,
            }
        })?;
    }

    #[cfg(not(unix))]
    {
        let mut perms = std::fs::metadata(path)
            .map_err(|e| Error::Permissions {
                path: path.to_path_buf(),
                source: e,
            })?
            .permissions();
        perms.set_readonly(mode & 0o222 == 0);
        std::fs::set_permissions(path, perms).map_err(|e| Error::Permissions {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[cfg(unix)]
    #[test]
    fn apply_mode_sets_exact_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("tool");
        std::fs::write(&path, b"#!/bin/sh\n").unwrap();

        apply_mode(&path, 0o750).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[cfg(unix)]
    #[test]
    fn apply_mode_drops_special_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("tool");
        std::fs::write(&path, b"").unwrap();

        apply_mode(&path, 0o4755).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o7777, 0o755);
    }

    #[test]
    fn apply_mode_missing_path() {
        let dir = tempdir().unwrap();
        let result = apply_mode(&dir.path().join("missing"), 0o644);
        assert!(matches!(result, Err(Error::Permissions { .. })));
    }
}

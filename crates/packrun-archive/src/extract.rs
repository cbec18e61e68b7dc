//! Materialize archive entries under a destination root.
//!
//! # Platform Behavior
//!
//! **Unix**: file mode bits from the archive are applied exactly (masked to
//! `0o777`), independent of the process umask. Symlinks are created as-is
//! once their targets pass sanitization.
//!
//! **Windows (non-Unix)**: only the read-only attribute follows the archive
//! mode, and symlink entries are skipped.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, Read, Write};
use std::path::{Component, Path};

use crate::entry::{ArchiveReport, EntryKind};
use crate::error::{Error, Result};
use crate::reader::{ArchiveEntry, ArchiveReader};
use crate::sanitize::{sanitize_path, sanitize_symlink_target};

/// Mode used for files whose header carries no parsable mode.
const DEFAULT_FILE_MODE: u32 = 0o644;

const COPY_BUFFER_SIZE: usize = 8 * 1024;

/// Main extraction pipeline.
///
/// Entries are processed in archive order. The first failure aborts the run;
/// entries already written stay on disk.
pub fn extract<R: Read>(reader: &mut ArchiveReader<R>, destination: &Path) -> Result<ArchiveReport> {
    let mut report = ArchiveReport::new(reader.compression());

    ensure_directory(destination)?;

    for entry in reader.entries()? {
        let mut entry = entry?;
        let sanitized = sanitize_path(entry.path(), destination)?;
        let kind = entry.kind().clone();
        ensure_no_symlink_ancestors(destination, &sanitized.relative, entry.path())?;

        match &kind {
            EntryKind::Directory => ensure_directory(&sanitized.resolved)?,
            EntryKind::File => {
                if sanitized.relative.as_os_str().is_empty() {
                    return Err(Error::InvalidPath {
                        entry: entry.path().to_path_buf(),
                    });
                }
                write_file(&mut entry, &sanitized.resolved)?;
            }
            EntryKind::Symlink { target } => {
                sanitize_symlink_target(target, &sanitized.relative)?;
                ensure_target_avoids_symlinks(destination, &sanitized.relative, target)?;
                if !write_symlink(target, &sanitized.resolved)? {
                    report.record(&EntryKind::Other, 0);
                    continue;
                }
            }
            EntryKind::Other => {
                tracing::warn!(entry = %entry.path().display(), "skipping unsupported entry type");
            }
        }

        tracing::debug!(
            entry = %sanitized.relative.display(),
            size = entry.size(),
            mode = ?entry.mode(),
            "extracted"
        );
        report.record(&kind, entry.size());
    }

    Ok(report)
}

/// Extract an archive with automatic compression detection.
pub fn extract_from_reader<R: BufRead>(reader: R, destination: &Path) -> Result<ArchiveReport> {
    let mut reader = ArchiveReader::detect(reader)?;
    extract(&mut reader, destination)
}

/// Extract an in-memory archive, such as one embedded in the executable.
pub fn extract_from_bytes(data: &[u8], destination: &Path) -> Result<ArchiveReport> {
    extract_from_reader(data, destination)
}

fn ensure_directory(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| Error::DirectoryCreationFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Refuse to write through a symlink that an earlier entry created.
///
/// Every component of `relative` above the last one has to be missing or a
/// real directory under `root`.
fn ensure_no_symlink_ancestors(root: &Path, relative: &Path, entry: &Path) -> Result<()> {
    let mut current = root.to_path_buf();
    let mut components = relative.components().peekable();

    while let Some(component) = components.next() {
        if components.peek().is_none() {
            break;
        }
        current.push(component);
        if is_symlink(&current) {
            return Err(Error::SymlinkTraversal {
                entry: entry.to_path_buf(),
                symlink: current,
            });
        }
    }

    Ok(())
}

/// Reject a symlink target whose walk passes through an existing symlink.
///
/// The lexical check assumes every intermediate component is a directory;
/// a link in the middle of the walk would make `..` land somewhere else.
fn ensure_target_avoids_symlinks(root: &Path, link_relative: &Path, target: &Path) -> Result<()> {
    let mut walked = link_relative
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let mut components = target.components().peekable();

    while let Some(component) = components.next() {
        match component {
            Component::Normal(part) => {
                walked.push(part);
                if components.peek().is_some() && is_symlink(&root.join(&walked)) {
                    return Err(Error::SymlinkEscape {
                        target: target.to_path_buf(),
                        symlink: link_relative.to_path_buf(),
                    });
                }
            }
            Component::ParentDir => {
                walked.pop();
            }
            _ => {}
        }
    }

    Ok(())
}

fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata()
        .is_ok_and(|meta| meta.file_type().is_symlink())
}

fn write_file<R: Read>(entry: &mut ArchiveEntry<'_, R>, target_path: &Path) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        if !parent.exists() {
            ensure_directory(parent)?;
        }
    }

    // A link left at this name would redirect the write.
    if is_symlink(target_path) {
        std::fs::remove_file(target_path).map_err(|e| Error::ExtractionFailed {
            path: target_path.to_path_buf(),
            source: e,
        })?;
    }

    let mode = entry.mode().unwrap_or(DEFAULT_FILE_MODE) & packrun_fs::PERMISSION_MASK;
    let mut file = create_file(target_path, mode).map_err(|e| Error::ExtractionFailed {
        path: target_path.to_path_buf(),
        source: e,
    })?;
    copy_content(entry, &mut file, target_path)?;
    drop(file);

    packrun_fs::apply_mode(target_path, mode)?;
    Ok(())
}

/// Copy an entry's content, telling stream failures apart from write failures.
fn copy_content<R: Read>(entry: &mut ArchiveEntry<'_, R>, file: &mut File, path: &Path) -> Result<u64> {
    let mut buf = [0u8; COPY_BUFFER_SIZE];
    let mut written = 0u64;
    loop {
        let n = match entry.read(&mut buf) {
            Ok(0) => return Ok(written),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Corrupted(e)),
        };
        file.write_all(&buf[..n]).map_err(|e| Error::ExtractionFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        written += n as u64;
    }
}

fn create_file(path: &Path, mode: u32) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    options.open(path)
}

/// Returns `false` when the platform cannot hold the link and it was skipped.
#[cfg(unix)]
fn write_symlink(target: &Path, link: &Path) -> Result<bool> {
    if let Some(parent) = link.parent() {
        if !parent.exists() {
            ensure_directory(parent)?;
        }
    }

    if link.symlink_metadata().is_ok() {
        std::fs::remove_file(link).map_err(|e| Error::SymlinkCreationFailed {
            target: target.to_path_buf(),
            link: link.to_path_buf(),
            source: e,
        })?;
    }

    std::os::unix::fs::symlink(target, link).map_err(|e| Error::SymlinkCreationFailed {
        target: target.to_path_buf(),
        link: link.to_path_buf(),
        source: e,
    })?;
    Ok(true)
}

#[cfg(not(unix))]
fn write_symlink(target: &Path, link: &Path) -> Result<bool> {
    tracing::warn!(
        link = %link.display(),
        target = %target.display(),
        "symlinks are not extracted on this platform"
    );
    Ok(false)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn extract_from_bytes_invalid_format() {
        let data = [0xDE, 0xAD, 0xBE, 0xEF];
        let dir = tempfile::tempdir().unwrap();
        let result = extract_from_bytes(&data, dir.path());
        assert!(matches!(result, Err(Error::UnsupportedFormat)));
    }

    #[test]
    fn extract_from_bytes_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract_from_bytes(&[], &dir.path().join("never"));
        assert!(matches!(result, Err(Error::UnsupportedFormat)));
        assert!(!dir.path().join("never").exists());
    }

    #[test]
    fn create_file_truncates_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool");
        std::fs::write(&path, b"much longer old content").unwrap();

        {
            let mut file = create_file(&path, 0o644).unwrap();
            file.write_all(b"new").unwrap();
        }
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_ancestor_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::os::unix::fs::symlink("..", dir.path().join("a/b")).unwrap();

        let result = ensure_no_symlink_ancestors(dir.path(), Path::new("a/b/c"), Path::new("a/b/c"));
        assert!(matches!(
            result,
            Err(Error::SymlinkTraversal { symlink, .. }) if symlink == dir.path().join("a/b")
        ));
        assert!(ensure_no_symlink_ancestors(dir.path(), Path::new("a/b"), Path::new("a/b")).is_ok());
        assert!(ensure_no_symlink_ancestors(dir.path(), Path::new("a/new/c"), Path::new("a/new/c")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn target_through_existing_link_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::os::unix::fs::symlink("..", dir.path().join("a/b")).unwrap();

        let through = ensure_target_avoids_symlinks(dir.path(), Path::new("x"), Path::new("a/b/.."));
        assert!(matches!(through, Err(Error::SymlinkEscape { .. })));
        // Pointing at the link itself resolves inside the root.
        assert!(ensure_target_avoids_symlinks(dir.path(), Path::new("x"), Path::new("a/b")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn write_symlink_replaces_existing_link() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("lib/libz.so");
        assert!(write_symlink(Path::new("libz.so.1"), &link).unwrap());
        assert!(write_symlink(Path::new("libz.so.2"), &link).unwrap());
        assert_eq!(std::fs::read_link(&link).unwrap(), Path::new("libz.so.2"));
    }
}

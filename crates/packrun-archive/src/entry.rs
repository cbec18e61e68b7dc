use std::path::PathBuf;

use crate::format::Compression;

/// What an archive entry materializes as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    Symlink { target: PathBuf },
    /// Hard links, devices, fifos and other types that are not extracted.
    Other,
}

/// Summary of one extraction run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveReport {
    pub compression: Compression,
    pub directories: usize,
    pub files: usize,
    pub symlinks: usize,
    pub skipped: usize,
    pub total_bytes: u64,
}

impl ArchiveReport {
    pub fn new(compression: Compression) -> Self {
        Self {
            compression,
            directories: 0,
            files: 0,
            symlinks: 0,
            skipped: 0,
            total_bytes: 0,
        }
    }

    /// Number of entries that were written to disk.
    pub fn entry_count(&self) -> usize {
        self.directories + self.files + self.symlinks
    }

    pub(crate) fn record(&mut self, kind: &EntryKind, size: u64) {
        match kind {
            EntryKind::Directory => self.directories += 1,
            EntryKind::File => {
                self.files += 1;
                self.total_bytes += size;
            }
            EntryKind::Symlink { .. } => self.symlinks += 1,
            EntryKind::Other => self.skipped += 1,
        }
    }
}

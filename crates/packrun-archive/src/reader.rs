use std::io::{self, BufRead, Read};
use std::path::{Path, PathBuf};

use crate::entry::EntryKind;
use crate::format::{Compression, Decoder, detect_compression};
use crate::{Error, Result};

/// Forward-only reader over a compressed tar stream.
///
/// The reader is single pass: [`ArchiveReader::entries`] may be iterated
/// once, and each entry's content has to be read before the next entry is
/// requested or it is skipped.
pub struct ArchiveReader<R: Read> {
    archive: tar::Archive<Decoder<R>>,
    compression: Compression,
}

impl<R: Read> ArchiveReader<R> {
    pub fn new(reader: R, compression: Compression) -> Result<Self> {
        let decoder = compression.decoder(reader)?;
        Ok(Self {
            archive: tar::Archive::new(decoder),
            compression,
        })
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    pub fn entries(&mut self) -> Result<Entries<'_, R>> {
        let inner = self.archive.entries().map_err(Error::Corrupted)?;
        Ok(Entries { inner })
    }
}

impl<R: BufRead> ArchiveReader<R> {
    /// Create a reader, detecting the compression from the buffered leading
    /// bytes without consuming them.
    pub fn detect(mut reader: R) -> Result<Self> {
        let compression = detect_compression(reader.fill_buf()?).ok_or(Error::UnsupportedFormat)?;
        Self::new(reader, compression)
    }
}

/// Lazy sequence of entries; stops at the first corrupt header.
pub struct Entries<'a, R: Read> {
    inner: tar::Entries<'a, Decoder<R>>,
}

impl<'a, R: Read> Iterator for Entries<'a, R> {
    type Item = Result<ArchiveEntry<'a, R>>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(Error::Corrupted(e))),
        };
        Some(ArchiveEntry::from_tar(entry))
    }
}

/// A single archive entry: metadata plus a reader over its content.
pub struct ArchiveEntry<'a, R: Read> {
    path: PathBuf,
    kind: EntryKind,
    mode: Option<u32>,
    size: u64,
    content: tar::Entry<'a, Decoder<R>>,
}

impl<'a, R: Read> ArchiveEntry<'a, R> {
    fn from_tar(entry: tar::Entry<'a, Decoder<R>>) -> Result<Self> {
        let path = entry
            .path()
            .map_err(|_| Error::InvalidPath {
                entry: PathBuf::from(String::from_utf8_lossy(&entry.path_bytes()).into_owned()),
            })?
            .into_owned();

        let header = entry.header();
        let size = header.size().unwrap_or(0);
        let mode = header.mode().ok();
        let entry_type = header.entry_type();

        let kind = if entry_type.is_dir() {
            EntryKind::Directory
        } else if entry_type.is_file() {
            EntryKind::File
        } else if entry_type.is_symlink() {
            match entry.link_name() {
                Ok(Some(target)) => EntryKind::Symlink {
                    target: target.into_owned(),
                },
                _ => return Err(Error::InvalidPath { entry: path }),
            }
        } else {
            EntryKind::Other
        };

        Ok(Self {
            path,
            kind,
            mode,
            size,
            content: entry,
        })
    }

    /// Path of the entry as stored in the archive, not yet sanitized.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    /// Mode bits from the header, if they parse.
    pub fn mode(&self) -> Option<u32> {
        self.mode
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

impl<R: Read> Read for ArchiveEntry<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.content.read(buf)
    }
}

//! Streaming extraction of the launcher's embedded tar payload, with path
//! sanitization.
//!
//! # Architecture
//!
//! - `format.rs` - Compression detection and decoders
//! - `reader.rs` - Lazy, single-pass entry sequence
//! - `sanitize.rs` - Path sanitization (traversal prevention)
//! - `extract.rs` - Materializing entries on disk
//! - `entry.rs` - Shared types

pub use entry::{ArchiveReport, EntryKind};
pub use error::{Error, Result};
pub use extract::{extract, extract_from_bytes, extract_from_reader};
pub use format::{Compression, detect_compression};
pub use reader::{ArchiveEntry, ArchiveReader, Entries};
pub use sanitize::{SanitizedPath, sanitize_path, sanitize_symlink_target};

mod entry;
mod error;
mod extract;
pub mod format;
mod reader;
mod sanitize;

//! Android dynamic linker detection.
//!
//! From API level 29 on, Android refuses to execute files from writable
//! app storage directly. Such binaries are started as
//! `/system/bin/linker64 <binary> [args...]`, and a process started that way
//! sees the linker as its own executable.

use std::path::Path;

use crate::command::Command;
use crate::error::{Error, Result};

/// Locations under which the system linker appears as the running executable.
pub const LINKER_PATHS: [&str; 4] = [
    "/apex/com.android.runtime/bin/linker64",
    "/system/bin/linker64",
    "/apex/com.android.runtime/bin/linker",
    "/system/bin/linker",
];

pub const LINKER64: &str = "/system/bin/linker64";
pub const LINKER32: &str = "/system/bin/linker";

/// Highest API level that still allows direct execution.
pub const MAX_DIRECT_EXEC_API_LEVEL: u32 = 28;

const API_LEVEL_PROPERTY: &str = "ro.build.version.sdk";

/// How binaries have to be started on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkerState {
    #[default]
    None,
    Linker32,
    Linker64,
}

impl LinkerState {
    /// Select the linker for an API level and a pointer width in bits.
    pub fn for_api_level(api_level: u32, pointer_width: u32) -> Self {
        if api_level <= MAX_DIRECT_EXEC_API_LEVEL {
            Self::None
        } else if pointer_width == 64 {
            Self::Linker64
        } else {
            Self::Linker32
        }
    }

    pub fn path(self) -> Option<&'static Path> {
        match self {
            Self::None => None,
            Self::Linker32 => Some(Path::new(LINKER32)),
            Self::Linker64 => Some(Path::new(LINKER64)),
        }
    }
}

/// Check whether `path` is one of the known system linker locations.
pub fn is_linker_path(path: &Path) -> bool {
    LINKER_PATHS.iter().any(|linker| path == Path::new(linker))
}

/// Parse the output of `getprop ro.build.version.sdk`.
pub fn parse_api_level(output: &str) -> Result<u32> {
    let trimmed = output.trim();
    trimmed
        .parse()
        .map_err(|_| Error::InvalidApiLevel(trimmed.to_string()))
}

/// Ask the platform for its API level.
pub fn query_api_level() -> Result<u32> {
    let output = Command::new("getprop").arg(API_LEVEL_PROPERTY).capture_stdout()?;
    parse_api_level(&output)
}

/// Decide how binaries are started on this host.
///
/// Only Android needs the linker; elsewhere no query is made.
pub fn detect() -> Result<LinkerState> {
    if !cfg!(target_os = "android") {
        return Ok(LinkerState::None);
    }

    let api_level = query_api_level()?;
    let state = LinkerState::for_api_level(api_level, usize::BITS);
    tracing::debug!(api_level, ?state, "selected linker");
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn old_api_levels_exec_directly() {
        assert_eq!(LinkerState::for_api_level(21, 64), LinkerState::None);
        assert_eq!(LinkerState::for_api_level(28, 64), LinkerState::None);
    }

    #[test]
    fn new_api_levels_use_linker_by_width() {
        assert_eq!(LinkerState::for_api_level(29, 64), LinkerState::Linker64);
        assert_eq!(LinkerState::for_api_level(34, 32), LinkerState::Linker32);
    }

    #[test]
    fn linker_paths() {
        assert_eq!(LinkerState::None.path(), None);
        assert_eq!(
            LinkerState::Linker64.path(),
            Some(Path::new("/system/bin/linker64"))
        );
        assert_eq!(
            LinkerState::Linker32.path(),
            Some(Path::new("/system/bin/linker"))
        );
    }

    #[test]
    fn recognizes_linker_locations() {
        for linker in LINKER_PATHS {
            assert!(is_linker_path(Path::new(linker)));
        }
        assert!(!is_linker_path(Path::new("/system/bin/sh")));
        assert!(!is_linker_path(Path::new("/data/local/tmp/packrun")));
    }

    #[test]
    fn parse_api_level_trims_output() {
        assert_eq!(parse_api_level("33\n").unwrap(), 33);
        assert_eq!(parse_api_level("  29 ").unwrap(), 29);
    }

    #[test]
    fn parse_api_level_rejects_garbage() {
        assert!(matches!(
            parse_api_level(""),
            Err(Error::InvalidApiLevel(_))
        ));
        assert!(matches!(
            parse_api_level("UpsideDownCake"),
            Err(Error::InvalidApiLevel(s)) if s == "UpsideDownCake"
        ));
    }

    #[cfg(not(target_os = "android"))]
    #[test]
    fn detect_off_android_is_direct() {
        assert_eq!(detect().unwrap(), LinkerState::None);
    }
}

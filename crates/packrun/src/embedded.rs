//! Resources packed into the binary by the build script.

/// The payload archive, zstd-compressed tar.
pub static ARCHIVE: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/res.tar.zst"));

static COMMANDS: &str = include_str!(concat!(env!("OUT_DIR"), "/available_commands.txt"));

/// Names of the embedded commands, as shown when no command is given.
pub fn command_listing() -> &'static str {
    COMMANDS.trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_is_zstd() {
        assert_eq!(
            packrun_archive::detect_compression(ARCHIVE),
            Some(packrun_archive::Compression::Zstd)
        );
    }

    #[test]
    fn listing_is_single_line() {
        assert!(!command_listing().contains('\n'));
    }
}

//! Packs the payload directory into the archive the launcher embeds.
//!
//! Outputs in `OUT_DIR`:
//! - `res.tar.zst`: the payload tree as a zstd-compressed tar stream, or the
//!   file named by `PACKRUN_ARCHIVE` copied verbatim.
//! - `available_commands.txt`: space separated command names, or the file
//!   named by `PACKRUN_COMMANDS` copied verbatim.

use std::env;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

const ARCHIVE_NAME: &str = "res.tar.zst";
const COMMANDS_NAME: &str = "available_commands.txt";
const ZSTD_LEVEL: i32 = 19;

fn main() -> Result<()> {
    for var in ["PACKRUN_ARCHIVE", "PACKRUN_PAYLOAD_DIR", "PACKRUN_COMMANDS"] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").context("OUT_DIR is not set")?);
    let manifest_dir =
        PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").context("CARGO_MANIFEST_DIR is not set")?);

    let payload = env::var_os("PACKRUN_PAYLOAD_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| manifest_dir.join("payload"));
    println!("cargo:rerun-if-changed={}", payload.display());

    let archive_out = out_dir.join(ARCHIVE_NAME);
    match env::var_os("PACKRUN_ARCHIVE") {
        Some(archive) => {
            let archive = PathBuf::from(archive);
            println!("cargo:rerun-if-changed={}", archive.display());
            fs::copy(&archive, &archive_out)
                .with_context(|| format!("Failed to copy archive {}", archive.display()))?;
        }
        None => pack_payload(&payload, &archive_out)?,
    }

    let commands_out = out_dir.join(COMMANDS_NAME);
    match env::var_os("PACKRUN_COMMANDS") {
        Some(commands) => {
            let commands = PathBuf::from(commands);
            println!("cargo:rerun-if-changed={}", commands.display());
            fs::copy(&commands, &commands_out)
                .with_context(|| format!("Failed to copy command list {}", commands.display()))?;
        }
        None => {
            let listing = list_commands(&payload.join("bin"))?;
            fs::write(&commands_out, listing)
                .with_context(|| format!("Failed to write {}", commands_out.display()))?;
        }
    }

    Ok(())
}

fn pack_payload(payload: &Path, out: &Path) -> Result<()> {
    let file = File::create(out).with_context(|| format!("Failed to create {}", out.display()))?;
    let encoder = zstd::stream::write::Encoder::new(file, ZSTD_LEVEL)
        .context("Failed to create zstd encoder")?;
    let mut archive = tar::Builder::new(encoder);

    if payload.is_dir() {
        add_directory_to_archive(&mut archive, payload)?;
    } else {
        println!(
            "cargo:warning=payload directory {} does not exist, embedding an empty archive",
            payload.display()
        );
    }

    let encoder = archive.into_inner().context("Failed to finalize archive")?;
    let mut file = encoder.finish().context("Failed to finish zstd stream")?;
    file.flush()?;
    Ok(())
}

fn add_directory_to_archive<W: Write>(archive: &mut tar::Builder<W>, source_dir: &Path) -> Result<()> {
    for entry in WalkDir::new(source_dir)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();

        if path == source_dir {
            continue;
        }

        let relative_path = path
            .strip_prefix(source_dir)
            .context("Failed to compute relative path")?;
        let archive_path = relative_path
            .to_str()
            .context("Invalid UTF-8 in path")?
            .replace('\\', "/");

        let metadata = entry.path().symlink_metadata()?;
        let mut header = tar::Header::new_gnu();
        header.set_mtime(0);
        header.set_uid(0);
        header.set_gid(0);

        if entry.file_type().is_dir() {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
            header.set_mode(mode_of(&metadata, 0o755));
            archive
                .append_data(&mut header, &archive_path, io::empty())
                .with_context(|| format!("Failed to add directory {archive_path}"))?;
        } else if entry.file_type().is_symlink() {
            let target = fs::read_link(path)?;
            header.set_entry_type(tar::EntryType::Symlink);
            header.set_size(0);
            header.set_mode(0o777);
            header
                .set_link_name(&target)
                .with_context(|| format!("Failed to set link target of {archive_path}"))?;
            archive
                .append_data(&mut header, &archive_path, io::empty())
                .with_context(|| format!("Failed to add symlink {archive_path}"))?;
        } else if entry.file_type().is_file() {
            let mut mode = mode_of(&metadata, 0o644);
            if is_command(relative_path) {
                mode |= 0o111;
            }
            header.set_entry_type(tar::EntryType::Regular);
            header.set_size(metadata.len());
            header.set_mode(mode);
            let mut file_handle =
                File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
            archive
                .append_data(&mut header, &archive_path, &mut file_handle)
                .with_context(|| format!("Failed to add file {archive_path}"))?;
        }
        // Other file types are not packed.
    }

    Ok(())
}

/// Regular files directly under `bin/` are the launcher's commands.
fn is_command(relative_path: &Path) -> bool {
    relative_path.parent() == Some(Path::new("bin"))
}

fn list_commands(bin_dir: &Path) -> Result<String> {
    if !bin_dir.is_dir() {
        return Ok(String::new());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(bin_dir).with_context(|| format!("Failed to read {}", bin_dir.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names.join(" "))
}

#[cfg(unix)]
fn mode_of(metadata: &fs::Metadata, _default: u32) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn mode_of(_metadata: &fs::Metadata, default: u32) -> u32 {
    default
}

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::linker::is_linker_path;

/// Where this process really lives and which arguments belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Resolved path of the launcher binary.
    pub executable: PathBuf,
    /// Directory containing [`Invocation::executable`].
    pub executable_dir: PathBuf,
    /// Arguments after the program name, with any linker shim argument removed.
    pub args: Vec<OsString>,
    /// Whether the OS started this process through the system linker.
    pub via_linker: bool,
}

impl Invocation {
    /// Probe the running process.
    pub fn from_env() -> Result<Self> {
        let exe = std::env::current_exe().map_err(Error::ExecutablePath)?;
        let exe = canonicalize(&exe)?;
        Self::resolve(exe, std::env::args_os().collect())
    }

    /// Build an invocation from the resolved executable path and the raw
    /// argument vector (program name included).
    ///
    /// When `executable` is a system linker, `argv[1]` is the real program
    /// and is consumed as such.
    pub fn resolve(executable: PathBuf, argv: Vec<OsString>) -> Result<Self> {
        let mut argv = argv.into_iter();
        let _program_name = argv.next();

        if !is_linker_path(&executable) {
            let executable_dir = parent_dir(&executable);
            return Ok(Self {
                executable,
                executable_dir,
                args: argv.collect(),
                via_linker: false,
            });
        }

        let program = argv.next().ok_or_else(|| Error::MissingProgram {
            linker: executable.clone(),
        })?;
        let program = PathBuf::from(program);
        // The shim argument may be relative or a symlink; fall back to it
        // verbatim when it cannot be resolved.
        let program = canonicalize(&program).unwrap_or(program);
        tracing::debug!(
            linker = %executable.display(),
            program = %program.display(),
            "started through the system linker"
        );

        let executable_dir = parent_dir(&program);
        Ok(Self {
            executable: program,
            executable_dir,
            args: argv.collect(),
            via_linker: true,
        })
    }
}

fn canonicalize(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|e| Error::Canonicalize {
        path: path.to_path_buf(),
        source: e,
    })
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn direct_invocation_drops_program_name() {
        let invocation = Invocation::resolve(
            PathBuf::from("/opt/tools/packrun"),
            argv(&["packrun", "foo", "a", "b"]),
        )
        .unwrap();

        assert_eq!(invocation.executable, Path::new("/opt/tools/packrun"));
        assert_eq!(invocation.executable_dir, Path::new("/opt/tools"));
        assert_eq!(invocation.args, argv(&["foo", "a", "b"]));
        assert!(!invocation.via_linker);
    }

    #[test]
    fn direct_invocation_without_arguments() {
        let invocation =
            Invocation::resolve(PathBuf::from("/opt/tools/packrun"), argv(&["packrun"])).unwrap();
        assert!(invocation.args.is_empty());
    }

    #[test]
    fn empty_argv_is_tolerated() {
        let invocation = Invocation::resolve(PathBuf::from("/opt/packrun"), Vec::new()).unwrap();
        assert!(invocation.args.is_empty());
    }

    #[test]
    fn linker_invocation_shifts_arguments() {
        let invocation = Invocation::resolve(
            PathBuf::from("/system/bin/linker64"),
            argv(&[
                "/system/bin/linker64",
                "/data/local/tmp/does-not-exist/packrun",
                "foo",
                "a",
            ]),
        )
        .unwrap();

        assert!(invocation.via_linker);
        assert_eq!(
            invocation.executable,
            Path::new("/data/local/tmp/does-not-exist/packrun")
        );
        assert_eq!(
            invocation.executable_dir,
            Path::new("/data/local/tmp/does-not-exist")
        );
        assert_eq!(invocation.args, argv(&["foo", "a"]));
    }

    #[test]
    fn apex_linker_is_recognized() {
        let invocation = Invocation::resolve(
            PathBuf::from("/apex/com.android.runtime/bin/linker"),
            argv(&["linker", "packrun-missing-relative"]),
        )
        .unwrap();

        assert!(invocation.via_linker);
        assert_eq!(invocation.executable_dir, Path::new("."));
        assert!(invocation.args.is_empty());
    }

    #[test]
    fn linker_invocation_requires_program() {
        let result = Invocation::resolve(
            PathBuf::from("/system/bin/linker64"),
            argv(&["/system/bin/linker64"]),
        );
        assert!(matches!(result, Err(Error::MissingProgram { .. })));
    }

    #[test]
    fn linker_program_is_canonicalized() {
        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("packrun");
        std::fs::write(&program, b"").unwrap();
        let dotted = dir.path().join(".").join("packrun");

        let invocation = Invocation::resolve(
            PathBuf::from("/system/bin/linker64"),
            vec![OsString::from("linker64"), dotted.into_os_string()],
        )
        .unwrap();

        assert_eq!(invocation.executable, program.canonicalize().unwrap());
    }

    #[test]
    fn from_env_finds_test_binary() {
        let invocation = Invocation::from_env().unwrap();
        assert!(invocation.executable.is_absolute());
        assert!(invocation.executable_dir.is_dir());
        assert!(!invocation.via_linker);
    }
}

use std::ffi::OsString;
use std::path::PathBuf;

use packrun_platform::LinkerState;

/// How a resolved binary is started.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ExecStrategy {
    /// Execute the binary itself.
    #[default]
    Direct,
    /// Execute the given linker with the binary as its first argument.
    Linker(PathBuf),
}

impl ExecStrategy {
    /// Program and argument vector that start `target` with `forwarded`.
    pub fn command_line(&self, target: PathBuf, forwarded: Vec<OsString>) -> (PathBuf, Vec<OsString>) {
        match self {
            Self::Direct => (target, forwarded),
            Self::Linker(linker) => {
                let mut args = Vec::with_capacity(forwarded.len() + 1);
                args.push(target.into_os_string());
                args.extend(forwarded);
                (linker.clone(), args)
            }
        }
    }
}

impl From<LinkerState> for ExecStrategy {
    fn from(state: LinkerState) -> Self {
        match state.path() {
            Some(linker) => Self::Linker(linker.to_path_buf()),
            None => Self::Direct,
        }
    }
}

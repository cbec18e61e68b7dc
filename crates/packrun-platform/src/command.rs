use crate::error::{Error, Result};
use std::ffi::OsStr;
use std::process::{Command as StdCommand, Output};

/// Captured external command used for platform queries.
#[derive(Debug)]
pub struct Command {
    inner: StdCommand,
    program: String,
}

impl Command {
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            inner: StdCommand::new(&program),
            program,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.inner.arg(arg);
        self
    }

    /// Run to completion and capture stdout and stderr.
    pub fn capture(mut self) -> Result<Output> {
        self.inner.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::CommandNotFound {
                    cmd: self.program.clone(),
                }
            } else {
                Error::CommandFailed {
                    cmd: self.program.clone(),
                    source: e,
                }
            }
        })
    }

    /// Run to completion and return stdout; a nonzero exit is an error.
    pub fn capture_stdout(self) -> Result<String> {
        let program = self.program.clone();
        let output = self.capture()?;
        if !output.status.success() {
            return Err(Error::CommandStatus {
                cmd: program,
                status: output.status,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_new() {
        let cmd = Command::new("getprop");
        assert_eq!(cmd.program, "getprop");
    }

    #[test]
    fn test_command_args() {
        let cmd = Command::new("getprop").arg("ro.build.version.sdk");
        let args: Vec<_> = cmd.inner.get_args().collect();
        assert_eq!(args, ["ro.build.version.sdk"]);
    }

    #[test]
    fn test_command_not_found() {
        let result = Command::new("packrun_nonexistent_binary_12345").capture();
        assert!(matches!(result, Err(Error::CommandNotFound { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_stdout() {
        let out = Command::new("sh").arg("-c").arg("echo 33").capture_stdout().unwrap();
        assert_eq!(out.trim(), "33");
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_stdout_failure_status() {
        let result = Command::new("sh").arg("-c").arg("exit 2").capture_stdout();
        assert!(matches!(result, Err(Error::CommandStatus { .. })));
    }
}

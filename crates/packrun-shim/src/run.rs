//! Child execution and exit status translation.
//!
//! The child inherits the launcher's standard streams and environment, plus
//! the plan's exports. Its termination is folded into one exit code:
//!
//! | termination              | code      |
//! |--------------------------|-----------|
//! | exited with `N`          | `N`       |
//! | killed by signal `S`     | `128 + S` |
//! | binary not found         | `127`     |
//! | any other launch failure | `126`     |
//! | anything else            | `128`     |

use std::io;
use std::process::{Command, ExitStatus, Stdio};

use crate::dispatch::InvocationPlan;
use crate::error::{Error, Result};

pub const EXIT_NOT_FOUND: i32 = 127;
pub const EXIT_CANNOT_EXECUTE: i32 = 126;
pub const EXIT_ABNORMAL: i32 = 128;
pub const SIGNAL_EXIT_BASE: i32 = 128;

/// How the child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(i32),
    Abnormal,
}

impl Termination {
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self::Exited(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self::Signaled(signal);
            }
        }

        Self::Abnormal
    }

    pub fn exit_code(self) -> i32 {
        match self {
            Self::Exited(code) => code,
            Self::Signaled(signal) => SIGNAL_EXIT_BASE + signal,
            Self::Abnormal => EXIT_ABNORMAL,
        }
    }
}

/// Exit code for a child that could not be started.
pub fn launch_failure_code(err: &io::Error) -> i32 {
    match err.kind() {
        io::ErrorKind::NotFound => EXIT_NOT_FOUND,
        _ => EXIT_CANNOT_EXECUTE,
    }
}

/// Start the planned child and wait for it.
pub fn spawn_and_wait(plan: InvocationPlan) -> Result<ExitStatus> {
    let mut child = Command::new(&plan.program)
        .args(&plan.args)
        .envs(plan.envs)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| Error::Launch {
            program: plan.program.clone(),
            source: e,
        })?;

    child.wait().map_err(|e| Error::Wait {
        program: plan.program,
        source: e,
    })
}

/// Run the plan to completion and return the launcher's exit code.
pub fn run(plan: InvocationPlan) -> i32 {
    match spawn_and_wait(plan) {
        Ok(status) => {
            let termination = Termination::from_status(status);
            log_termination(termination);
            termination.exit_code()
        }
        Err(Error::Launch { program, source }) => {
            eprintln!("Failed to run {}: {source}", program.display());
            launch_failure_code(&source)
        }
        Err(err) => {
            eprintln!("{err}");
            EXIT_ABNORMAL
        }
    }
}

fn log_termination(termination: Termination) {
    match termination {
        Termination::Exited(code) => tracing::debug!(code, "child exited"),
        Termination::Signaled(signal) => {
            tracing::debug!(signal, name = signal_name(signal), "child killed by signal")
        }
        Termination::Abnormal => tracing::warn!("child ended without exit code or signal"),
    }
}

#[cfg(unix)]
fn signal_name(signal: i32) -> &'static str {
    nix::sys::signal::Signal::try_from(signal)
        .map(|s| s.as_str())
        .unwrap_or("unknown")
}

#[cfg(not(unix))]
fn signal_name(_signal: i32) -> &'static str {
    "unknown"
}

use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::resolver::TargetResolver;
use crate::strategy::ExecStrategy;

/// A fully decided child invocation.
///
/// Consumed by [`crate::run`], so each plan starts at most one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationPlan {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Variables set on top of the inherited environment.
    pub envs: Vec<(OsString, OsString)>,
}

/// Turns the forwarded argument vector into an [`InvocationPlan`].
#[derive(Debug, Clone)]
pub struct Dispatcher<R> {
    resolver: R,
    strategy: ExecStrategy,
    listing: String,
    envs: Vec<(OsString, OsString)>,
}

impl<R: TargetResolver> Dispatcher<R> {
    pub fn new(resolver: R, strategy: ExecStrategy) -> Self {
        Self {
            resolver,
            strategy,
            listing: String::new(),
            envs: Vec::new(),
        }
    }

    /// Space separated command names shown when no command is given.
    pub fn listing(mut self, listing: impl Into<String>) -> Self {
        self.listing = listing.into();
        self
    }

    /// Environment exported to every planned child.
    pub fn envs(mut self, envs: Vec<(OsString, OsString)>) -> Self {
        self.envs = envs;
        self
    }

    /// Plan the invocation for `args` (`command arg...`).
    ///
    /// Without a command, the available commands are written to `out` and
    /// `None` is returned.
    pub fn dispatch(&self, args: &[OsString], out: &mut dyn Write) -> Result<Option<InvocationPlan>> {
        let Some((command, forwarded)) = args.split_first() else {
            writeln!(out, "Available commands: {}", self.listing).map_err(Error::Listing)?;
            return Ok(None);
        };

        let target = self.resolve(command)?;
        let (program, args) = self.strategy.command_line(target, forwarded.to_vec());
        tracing::debug!(
            command = %command.to_string_lossy(),
            program = %program.display(),
            ?args,
            "planned invocation"
        );

        Ok(Some(InvocationPlan {
            program,
            args,
            envs: self.envs.clone(),
        }))
    }

    fn resolve(&self, command: &OsStr) -> Result<PathBuf> {
        self.resolver
            .resolve(command)
            .ok_or_else(|| Error::NotFound(command.to_string_lossy().into_owned()))
    }
}

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use packrun_fs::Workspace;
use packrun_platform::{Invocation, LinkerState, env, linker};
use packrun_shim::run::EXIT_NOT_FOUND;
use packrun_shim::{BinDirResolver, Dispatcher, ExecStrategy};

use crate::embedded;

/// Exit code for fatal launcher errors and for a missing command.
pub const EXIT_FAILURE: i32 = 1;

/// Process-wide values, collected once before any stage runs.
#[derive(Debug, Clone)]
pub struct LaunchContext {
    pub invocation: Invocation,
    pub linker: LinkerState,
    pub temp_root: PathBuf,
    pub pid: u32,
}

impl LaunchContext {
    pub fn probe() -> Result<Self> {
        let invocation = Invocation::from_env().context("Failed to locate the running executable")?;
        let linker = linker::detect().context("Failed to determine how to start binaries")?;

        Ok(Self {
            invocation,
            linker,
            temp_root: env::system_temp_dir(),
            pid: std::process::id(),
        })
    }

    /// Candidate parents of the workspace, in order of preference.
    fn workspace_roots(&self) -> [PathBuf; 2] {
        [
            self.temp_root.clone(),
            self.invocation.executable_dir.clone(),
        ]
    }
}

/// Run the launcher and return the process exit code.
pub fn run() -> i32 {
    let result = LaunchContext::probe()
        .and_then(|ctx| launch(&ctx, embedded::ARCHIVE, embedded::command_listing()));

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            EXIT_FAILURE
        }
    }
}

/// Extract `archive` into a fresh workspace and run the requested command.
///
/// The workspace is removed before this returns, on every path.
pub fn launch(ctx: &LaunchContext, archive: &[u8], listing: &str) -> Result<i32> {
    tracing::info!(
        executable = %ctx.invocation.executable.display(),
        via_linker = ctx.invocation.via_linker,
        linker = ?ctx.linker,
        "probed environment"
    );

    let workspace = Workspace::establish(ctx.workspace_roots(), ctx.pid)?;
    tracing::info!(workspace = %workspace.path().display(), "workspace ready");

    let report = packrun_archive::extract_from_bytes(archive, workspace.path())
        .context("Failed to extract embedded archive")?;
    tracing::info!(
        compression = ?report.compression,
        entries = report.entry_count(),
        directories = report.directories,
        files = report.files,
        symlinks = report.symlinks,
        skipped = report.skipped,
        bytes = report.total_bytes,
        "extracted payload"
    );

    let exports = env::workspace_exports(workspace.path(), &workspace.lib_dir())
        .context("Failed to prepare the command environment")?;
    let dispatcher = Dispatcher::new(
        BinDirResolver::new(workspace.bin_dir()),
        ExecStrategy::from(ctx.linker),
    )
    .listing(listing)
    .envs(exports);

    let plan = match dispatcher.dispatch(&ctx.invocation.args, &mut io::stderr()) {
        Ok(Some(plan)) => plan,
        Ok(None) => return Ok(EXIT_FAILURE),
        Err(err @ packrun_shim::Error::NotFound(_)) => {
            eprintln!("{err}");
            return Ok(EXIT_NOT_FOUND);
        }
        Err(err) => return Err(err.into()),
    };

    let code = packrun_shim::run(plan);
    if let Err(e) = workspace.close() {
        tracing::warn!(error = %e, "workspace cleanup failed");
    }
    Ok(code)
}

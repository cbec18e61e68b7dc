//! packrun: unpack the embedded toolset into a private temporary directory and
//! run one of its commands.
//!
//! ```text
//! packrun <command> [args...]
//! ```

use tracing_subscriber::EnvFilter;

mod embedded;
mod launch;

/// Log filter directives, e.g. `PACKRUN_LOG=debug`.
const LOG_ENV: &str = "PACKRUN_LOG";

fn main() {
    init_tracing();

    // Everything that owns a resource lives inside `launch::run`, so the
    // workspace is gone by the time the process exits.
    let code = launch::run();
    std::process::exit(code);
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

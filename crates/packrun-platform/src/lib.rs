//! Host probing for the launcher: where the running binary really is,
//! whether the Android system linker has to start child binaries, and the
//! environment handed to them.

pub use error::{Error, Result};
pub use linker::LinkerState;
pub use probe::Invocation;

pub mod command;
pub mod env;
mod error;
pub mod linker;
mod probe;

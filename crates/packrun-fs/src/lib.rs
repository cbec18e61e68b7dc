//! Filesystem primitives for the launcher: the process-scoped extraction
//! workspace and permission application for extracted files.

mod error;
pub mod permissions;
mod workspace;

pub use error::{Error, Result};
pub use permissions::{PERMISSION_MASK, apply_mode};
pub use workspace::{WORKSPACE_PREFIX, Workspace, workspace_name};

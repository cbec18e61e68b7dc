//! Command dispatch for the packrun launcher.
//!
//! # Architecture
//!
//! The shim maps a command name to a binary through a [`TargetResolver`],
//! decides how that binary is started with an [`ExecStrategy`], and records
//! the result as an [`InvocationPlan`]. [`run`] executes the plan and folds
//! the child's termination into the launcher's exit code.
//!
//! # Example
//!
//! ```
//! use std::ffi::OsString;
//! use std::path::PathBuf;
//! use packrun_shim::{BinDirResolver, Dispatcher, ExecStrategy};
//!
//! let dispatcher = Dispatcher::new(BinDirResolver::new("/ws/bin"), ExecStrategy::Direct);
//! let args = vec![OsString::from("foo"), OsString::from("a")];
//! let plan = dispatcher.dispatch(&args, &mut std::io::sink()).unwrap().unwrap();
//! assert_eq!(plan.program, PathBuf::from("/ws/bin/foo"));
//! ```

pub use dispatch::{Dispatcher, InvocationPlan};
pub use error::{Error, Result};
pub use resolver::{BinDirResolver, TargetResolver};
pub use run::{Termination, launch_failure_code, run, spawn_and_wait};
pub use strategy::ExecStrategy;

mod dispatch;
mod error;
mod resolver;
pub mod run;
mod strategy;

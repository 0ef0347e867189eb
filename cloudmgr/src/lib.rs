//! Command construction and result reporting for the `docker` CLI and QEMU.
//!
//! Every operation follows the same path: validate input, check the engine
//! is reachable (docker operations only), build an argument vector, invoke
//! the external tool once, and turn its exit status and output into a
//! [`Report`].
//!
//! # Architecture
//!
//! ```text
//! Engine (docker)            Qemu (qemu-img + qemu-system-x86_64)
//!  ├── engine::commands       ├── vm::commands
//!  └── Runner                 ├── DiskStore  (<name>.qcow2 files)
//!       ├── SystemRunner      └── Runner
//!       └── ScriptedRunner (tests)
//! ```
//!
//! Nothing is cached: listings re-query the engine or re-scan the
//! filesystem on every call.

#![allow(clippy::missing_docs_in_private_items)]

mod config;
mod disk;
pub mod dockerfile;
pub mod engine;
mod error;
pub mod input;
mod process;
mod report;
pub mod vm;

pub use config::{DEFAULT_BASE_IMAGE, DEFAULT_START_COMMAND, Settings};
pub use disk::{DISK_SUFFIX, DiskStore};
pub use engine::{ContainerScope, Engine, LocalSearch};
pub use error::{Error, Result};
pub use process::{Invocation, InvocationResult, Runner, SIGNALED, SystemRunner};
#[cfg(any(test, feature = "testing"))]
pub use process::{Scripted, ScriptedRunner};
pub use report::{FAILURE_PREFIX, Report, Shape};
pub use vm::{Created, Qemu, Step, VmConfig};

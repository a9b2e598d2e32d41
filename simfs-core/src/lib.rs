//! Multi-user in-memory file system simulator core.
//!
//! This crate provides the pieces behind the `simfs` terminal:
//! - `fs`: arena-backed node tree and path resolution
//! - `users`: account registry and login handling
//! - `engine`: file and directory command semantics
//! - `command` / `shell`: line parsing, dispatch and reply rendering
//!
//! # Architecture
//!
//! All state lives in memory and is dropped on exit:
//! - `FileSystem`: the shared tree, operated on through a `Session`
//! - `UserRegistry`: accounts; login sets the session's current user
//! - `Session`: current user and working directory, passed into every call
//! - `Shell`: owns the above and drives a `Console`

pub mod command;
pub mod console;
pub mod engine;
pub mod error;
pub mod fs;
pub mod session;
pub mod shell;
pub mod users;

pub use command::{Command, Verb};
pub use console::{Console, HeadlessConsole};
pub use engine::{EntryInfo, FileSystem, WriteOutcome};
pub use error::{SimError, SimResult};
pub use fs::{NodeHandle, NodeId, NodeKind};
pub use session::{Session, SessionState};
pub use shell::{OutputFormat, Reply, Shell, ShellConfig};
pub use users::{User, UserRegistry};

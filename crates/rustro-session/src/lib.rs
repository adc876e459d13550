//! Session assembly and launch orchestration for rustro

pub mod environment;
pub mod handoff;
pub mod launcher;

pub use environment::{keys, EnvironmentBuilder, SessionEnvironment, StorageRoots};
pub use handoff::{ExecutionHandoff, LoggingHandoff};
pub use launcher::{LaunchRequest, LaunchState, SessionLauncher};

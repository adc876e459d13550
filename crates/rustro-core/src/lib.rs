//! Core logic for the rustro session bootstrap
//!
//! This crate provides the foundational types, error handling,
//! configuration, logging and permission-gating infrastructure
//! shared by the staging and session crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod permission;

pub use config::Config;
pub use error::{LauncherError, Result, SessionError, StageError};
pub use permission::{
    AutoGrantGate, PermissionGate, PermissionOutcome, PermissionTicket,
    StoragePermissions,
};

//! Error types for the rustro launcher

use crate::permission::StoragePermissions;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the launcher workspace
#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Staging error: {0}")]
    Stage(#[from] StageError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

/// Core staging errors
#[derive(Error, Debug)]
pub enum StageError {
    #[error("Invalid core reference {path:?}: no usable file name")]
    InvalidCoreReference { path: PathBuf },

    #[error("Core source {path:?} is not readable: {source}")]
    SourceNotReadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create core directory {dir:?}: {source}")]
    DestinationDirCreateFailed {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("Staging I/O failure for {dest:?}: {source}")]
    StagingIo {
        dest: PathBuf,
        source: std::io::Error,
    },
}

/// Session launch errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Storage permission denied: {denied:?}")]
    PermissionDenied { denied: StoragePermissions },

    #[error("Staging error: {0}")]
    Stage(#[from] StageError),
}

/// Result type alias for launcher operations
pub type Result<T> = std::result::Result<T, LauncherError>;

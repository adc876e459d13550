//! Canonical destination paths for staged cores

use rustro_core::error::StageError;
use std::path::{Path, PathBuf};

/// Identity of a candidate libretro core.
///
/// Two cores with the same name are the same logical core; the last one
/// staged wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreReference {
    source: PathBuf,
    name: String,
}

impl CoreReference {
    /// Derive a reference from a candidate core path.
    ///
    /// The staging name is the source's final path segment. Fails when
    /// the path has no resolvable segment (empty, root, trailing `..`)
    /// or the segment is not valid UTF-8.
    pub fn new(source: impl Into<PathBuf>) -> Result<Self, StageError> {
        let source = source.into();
        let name = match source.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => return Err(StageError::InvalidCoreReference { path: source }),
        };

        Ok(Self { source, name })
    }

    /// Where the candidate binary currently lives
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Stable staging identity; never empty, never contains separators
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Destination of a staged core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingTarget {
    dest_dir: PathBuf,
    dest_path: PathBuf,
}

impl StagingTarget {
    /// Compute the destination for `reference` under `dest_dir`.
    ///
    /// The destination is always a direct child of `dest_dir`: the name
    /// comes from `file_name()` and cannot traverse out of it. No I/O.
    pub fn resolve(dest_dir: impl Into<PathBuf>, reference: &CoreReference) -> Self {
        let dest_dir = dest_dir.into();
        let dest_path = dest_dir.join(reference.name());
        Self {
            dest_dir,
            dest_path,
        }
    }

    /// The private, executable-capable core directory
    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Full destination path for this core
    pub fn dest_path(&self) -> &Path {
        &self.dest_path
    }
}

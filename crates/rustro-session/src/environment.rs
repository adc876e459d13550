//! Session environment assembly
//!
//! The environment is the immutable key/value bundle a launched session
//! consumes. The key names are a wire contract with the execution engine
//! and must be honored verbatim.

use rustro_core::config::PathConfig;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Bundle keys consumed by the execution engine
pub mod keys {
    pub const ROM: &str = "ROM";
    pub const LIBRETRO: &str = "LIBRETRO";
    pub const CONFIGFILE: &str = "CONFIGFILE";
    pub const IME: &str = "IME";
    pub const DATADIR: &str = "DATADIR";
    pub const APK: &str = "APK";
    pub const SDCARD: &str = "SDCARD";
    pub const DOWNLOADS: &str = "DOWNLOADS";
    pub const SCREENSHOTS: &str = "SCREENSHOTS";
    pub const EXTERNAL: &str = "EXTERNAL";
}

/// Shared storage locations handed to a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageRoots {
    /// Shared external storage root
    pub sdcard: PathBuf,
    /// Shared downloads directory
    pub downloads: PathBuf,
    /// Shared screenshots directory
    pub screenshots: PathBuf,
    /// App-specific directory on external storage
    pub external: PathBuf,
}

impl StorageRoots {
    /// Pull the storage roots out of the configured path layout
    pub fn from_config(paths: &PathConfig) -> Self {
        Self {
            sdcard: paths.sdcard.clone(),
            downloads: paths.downloads.clone(),
            screenshots: paths.screenshots.clone(),
            external: paths.external.clone(),
        }
    }
}

/// Immutable environment handed to the execution engine.
///
/// Constructed once per launch via [`EnvironmentBuilder`]; no value is
/// mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionEnvironment {
    content: Option<PathBuf>,
    core: PathBuf,
    config_file: PathBuf,
    ime: String,
    data_dir: PathBuf,
    source_dir: PathBuf,
    roots: StorageRoots,
}

impl SessionEnvironment {
    /// Content to load, if any
    pub fn content(&self) -> Option<&Path> {
        self.content.as_deref()
    }

    /// Effective core path for this session
    pub fn core(&self) -> &Path {
        &self.core
    }

    /// Frontend configuration file
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Input-method identifier
    pub fn ime(&self) -> &str {
        &self.ime
    }

    /// Application-private data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory holding the installed frontend
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Shared storage locations
    pub fn roots(&self) -> &StorageRoots {
        &self.roots
    }

    /// Key/value view in the bundle contract.
    ///
    /// `ROM` is absent entirely when there is no content; downstream
    /// consumers rely on key-absent meaning no content.
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        let mut map = BTreeMap::new();

        if let Some(content) = &self.content {
            map.insert(keys::ROM, path_value(content));
        }
        map.insert(keys::LIBRETRO, path_value(&self.core));
        map.insert(keys::CONFIGFILE, path_value(&self.config_file));
        map.insert(keys::IME, self.ime.clone());
        map.insert(keys::DATADIR, path_value(&self.data_dir));
        map.insert(keys::APK, path_value(&self.source_dir));
        map.insert(keys::SDCARD, path_value(&self.roots.sdcard));
        map.insert(keys::DOWNLOADS, path_value(&self.roots.downloads));
        map.insert(keys::SCREENSHOTS, path_value(&self.roots.screenshots));
        map.insert(keys::EXTERNAL, path_value(&self.roots.external));

        map
    }
}

fn path_value(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Builder for [`SessionEnvironment`].
///
/// Pure construction, no I/O, no failure mode; all inputs are assumed
/// pre-resolved by the caller.
pub struct EnvironmentBuilder {
    content: Option<PathBuf>,
    core: PathBuf,
    config_file: PathBuf,
    ime: String,
    data_dir: PathBuf,
    source_dir: PathBuf,
    roots: StorageRoots,
}

impl EnvironmentBuilder {
    /// Start from the mandatory fields of the bundle contract
    pub fn new(
        core: PathBuf,
        config_file: PathBuf,
        ime: String,
        data_dir: PathBuf,
        source_dir: PathBuf,
        roots: StorageRoots,
    ) -> Self {
        Self {
            content: None,
            core,
            config_file,
            ime,
            data_dir,
            source_dir,
            roots,
        }
    }

    /// Attach the optional content path
    pub fn content(mut self, content: Option<PathBuf>) -> Self {
        self.content = content;
        self
    }

    /// Finalize the immutable environment
    pub fn build(self) -> SessionEnvironment {
        SessionEnvironment {
            content: self.content,
            core: self.core,
            config_file: self.config_file,
            ime: self.ime,
            data_dir: self.data_dir,
            source_dir: self.source_dir,
            roots: self.roots,
        }
    }
}

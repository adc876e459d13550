//! Core staging into the private executable directory
//!
//! Makes a candidate core available at its staging target without ever
//! exposing a partially written file: bytes are copied into a uniquely
//! named temp file inside the destination directory and published with a
//! single atomic rename. Concurrent stagers for the same destination each
//! work on their own temp file; the last rename wins.

use crate::paths::{CoreReference, StagingTarget};
use rustro_core::error::StageError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How a core became available for loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedOutcome {
    /// Freshly copied and published at the staging target
    Staged(PathBuf),
    /// A usable file was already present at the staging target
    AlreadyStaged(PathBuf),
    /// The source is executable at its original location; loaded from there
    UsedInPlace(PathBuf),
}

impl StagedOutcome {
    /// The path the session should load the core from
    pub fn effective_path(&self) -> &Path {
        match self {
            Self::Staged(path) | Self::AlreadyStaged(path) | Self::UsedInPlace(path) => path,
        }
    }
}

/// Stager for the process-wide private core directory
#[derive(Debug, Default)]
pub struct CoreStager;

impl CoreStager {
    /// Create a new stager
    pub fn new() -> Self {
        Self
    }

    /// Make the referenced core available at `target`.
    ///
    /// Already-staged content is trusted and skipped unless `force` is
    /// set. A source that is executable at its original location is used
    /// from there without copying.
    pub fn ensure_staged(
        &self,
        reference: &CoreReference,
        target: &StagingTarget,
        force: bool,
    ) -> Result<StagedOutcome, StageError> {
        if !force && dest_usable(target.dest_path()) {
            debug!("Core already staged at {:?}", target.dest_path());
            return Ok(StagedOutcome::AlreadyStaged(target.dest_path().to_path_buf()));
        }

        let mut src = fs::File::open(reference.source()).map_err(|err| {
            StageError::SourceNotReadable {
                path: reference.source().to_path_buf(),
                source: err,
            }
        })?;
        let src_meta = src.metadata().map_err(|err| StageError::SourceNotReadable {
            path: reference.source().to_path_buf(),
            source: err,
        })?;
        if !src_meta.is_file() {
            return Err(StageError::SourceNotReadable {
                path: reference.source().to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }

        // A core already executable at its original location is assumed
        // properly installed; it is loaded from there, not copied.
        if is_executable(&src_meta) {
            info!(
                "Core {:?} is executable in place, staging skipped",
                reference.source()
            );
            return Ok(StagedOutcome::UsedInPlace(reference.source().to_path_buf()));
        }

        fs::create_dir_all(target.dest_dir()).map_err(|err| {
            StageError::DestinationDirCreateFailed {
                dir: target.dest_dir().to_path_buf(),
                source: err,
            }
        })?;

        let tmp = tempfile::NamedTempFile::new_in(target.dest_dir()).map_err(|err| {
            StageError::StagingIo {
                dest: target.dest_path().to_path_buf(),
                source: err,
            }
        })?;

        match copy_and_publish(&mut src, tmp, src_meta.len(), target.dest_path()) {
            Ok(copied) => {
                info!(
                    "Staged core {:?} -> {:?} ({} bytes)",
                    reference.source(),
                    target.dest_path(),
                    copied
                );
                Ok(StagedOutcome::Staged(target.dest_path().to_path_buf()))
            }
            Err(err) => Err(StageError::StagingIo {
                dest: target.dest_path().to_path_buf(),
                source: err,
            }),
        }
    }
}

/// Fill the temp file from `src`, mark it executable and rename it onto
/// `dest`. The rename is the only point at which `dest` changes; on any
/// failure the temp file is removed and removal problems are logged
/// without masking the original error.
fn copy_and_publish(
    src: &mut fs::File,
    mut tmp: tempfile::NamedTempFile,
    expected: u64,
    dest: &Path,
) -> io::Result<u64> {
    match fill_temp(src, &mut tmp, expected) {
        Ok(copied) => match tmp.persist(dest) {
            Ok(_) => Ok(copied),
            Err(persist_err) => {
                let cause = persist_err.error;
                if let Err(cleanup) = persist_err.file.close() {
                    warn!("Failed to remove staging temp file: {}", cleanup);
                }
                Err(cause)
            }
        },
        Err(err) => {
            if let Err(cleanup) = tmp.close() {
                warn!("Failed to remove staging temp file: {}", cleanup);
            }
            Err(err)
        }
    }
}

/// Copy all bytes and verify the count against the source length at the
/// time of the copy
fn fill_temp(
    src: &mut fs::File,
    tmp: &mut tempfile::NamedTempFile,
    expected: u64,
) -> io::Result<u64> {
    let copied = io::copy(src, tmp.as_file_mut())?;
    if copied != expected {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("copied {} of {} bytes", copied, expected),
        ));
    }
    mark_executable(tmp.as_file())?;
    Ok(copied)
}

/// A destination is usable when it is a regular file that is executable
/// or can be marked executable in place
fn dest_usable(dest: &Path) -> bool {
    let meta = match fs::metadata(dest) {
        Ok(meta) => meta,
        Err(_) => return false,
    };
    if !meta.is_file() {
        return false;
    }
    if is_executable(&meta) {
        return true;
    }

    // Present but missing the executable bit: mark it rather than re-copy.
    match mark_path_executable(dest, meta) {
        Ok(()) => true,
        Err(err) => {
            warn!("Staged core {:?} cannot be marked executable: {}", dest, err);
            false
        }
    }
}

#[cfg(unix)]
fn is_executable(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &fs::Metadata) -> bool {
    // No executable bit on this platform; candidates are always staged.
    false
}

#[cfg(unix)]
fn mark_executable(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = file.metadata()?.permissions();
    perms.set_mode(perms.mode() | 0o111);
    file.set_permissions(perms)
}

#[cfg(not(unix))]
fn mark_executable(_file: &fs::File) -> io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn mark_path_executable(path: &Path, meta: fs::Metadata) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = meta.permissions();
    perms.set_mode(perms.mode() | 0o111);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn mark_path_executable(_path: &Path, _meta: fs::Metadata) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_core(dir: &Path, name: &str, len: usize) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(&vec![0xAB; len]).unwrap();
        path
    }

    fn staged(dest_dir: &Path, source: &Path) -> (CoreReference, StagingTarget) {
        let reference = CoreReference::new(source).unwrap();
        let target = StagingTarget::resolve(dest_dir, &reference);
        (reference, target)
    }

    #[test]
    fn test_stage_copies_and_marks_executable() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_core(tmp.path(), "core_x.so", 4096);
        let dest_dir = tmp.path().join("cores");
        let (reference, target) = staged(&dest_dir, &source);

        let outcome = CoreStager::new()
            .ensure_staged(&reference, &target, false)
            .unwrap();

        assert_eq!(outcome, StagedOutcome::Staged(dest_dir.join("core_x.so")));
        let meta = fs::metadata(outcome.effective_path()).unwrap();
        assert_eq!(meta.len(), 4096);
        #[cfg(unix)]
        assert!(is_executable(&meta));
    }

    #[test]
    fn test_second_call_skips_staging() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_core(tmp.path(), "core_x.so", 128);
        let dest_dir = tmp.path().join("cores");
        let (reference, target) = staged(&dest_dir, &source);
        let stager = CoreStager::new();

        stager.ensure_staged(&reference, &target, false).unwrap();
        let before = fs::read(target.dest_path()).unwrap();

        let outcome = stager.ensure_staged(&reference, &target, false).unwrap();
        assert_eq!(
            outcome,
            StagedOutcome::AlreadyStaged(target.dest_path().to_path_buf())
        );
        assert_eq!(fs::read(target.dest_path()).unwrap(), before);
    }

    #[test]
    fn test_force_restages_changed_source() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_core(tmp.path(), "core_x.so", 64);
        let dest_dir = tmp.path().join("cores");
        let (reference, target) = staged(&dest_dir, &source);
        let stager = CoreStager::new();

        stager.ensure_staged(&reference, &target, false).unwrap();

        fs::write(&source, vec![0xCD; 256]).unwrap();
        let outcome = stager.ensure_staged(&reference, &target, true).unwrap();

        assert_eq!(outcome, StagedOutcome::Staged(target.dest_path().to_path_buf()));
        assert_eq!(fs::metadata(target.dest_path()).unwrap().len(), 256);
    }

    #[test]
    fn test_missing_source_never_creates_dest() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("missing_core.so");
        let dest_dir = tmp.path().join("cores");
        let reference = CoreReference::new(&source).unwrap();
        let target = StagingTarget::resolve(&dest_dir, &reference);

        let err = CoreStager::new()
            .ensure_staged(&reference, &target, false)
            .unwrap_err();

        assert!(matches!(err, StageError::SourceNotReadable { .. }));
        assert!(!target.dest_path().exists());
    }

    #[test]
    fn test_directory_source_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("core_dir.so");
        fs::create_dir(&source).unwrap();
        let dest_dir = tmp.path().join("cores");
        let (reference, target) = staged(&dest_dir, &source);

        let err = CoreStager::new()
            .ensure_staged(&reference, &target, false)
            .unwrap_err();

        assert!(matches!(err, StageError::SourceNotReadable { .. }));
        assert!(!target.dest_path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_executable_source_is_used_in_place() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let source = write_core(tmp.path(), "core_y.so", 512);
        fs::set_permissions(&source, fs::Permissions::from_mode(0o755)).unwrap();
        let dest_dir = tmp.path().join("cores");
        let (reference, target) = staged(&dest_dir, &source);

        let outcome = CoreStager::new()
            .ensure_staged(&reference, &target, false)
            .unwrap();

        assert_eq!(outcome, StagedOutcome::UsedInPlace(source.clone()));
        assert_eq!(outcome.effective_path(), source.as_path());
        assert!(!dest_dir.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_staged_file_with_stripped_bit_is_remarked() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let source = write_core(tmp.path(), "core_x.so", 64);
        let dest_dir = tmp.path().join("cores");
        let (reference, target) = staged(&dest_dir, &source);
        let stager = CoreStager::new();

        stager.ensure_staged(&reference, &target, false).unwrap();
        fs::set_permissions(target.dest_path(), fs::Permissions::from_mode(0o644)).unwrap();

        let outcome = stager.ensure_staged(&reference, &target, false).unwrap();
        assert_eq!(
            outcome,
            StagedOutcome::AlreadyStaged(target.dest_path().to_path_buf())
        );
        let meta = fs::metadata(target.dest_path()).unwrap();
        assert!(is_executable(&meta));
    }

    #[test]
    fn test_concurrent_staging_converges() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_core(tmp.path(), "core_x.so", 16 * 1024);
        let dest_dir = tmp.path().join("cores");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let source = source.clone();
            let dest_dir = dest_dir.clone();
            handles.push(std::thread::spawn(move || {
                let reference = CoreReference::new(&source).unwrap();
                let target = StagingTarget::resolve(&dest_dir, &reference);
                CoreStager::new().ensure_staged(&reference, &target, true)
            }));
        }

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }

        let meta = fs::metadata(dest_dir.join("core_x.so")).unwrap();
        assert_eq!(meta.len(), 16 * 1024);
    }

    #[test]
    fn test_dest_dir_parents_are_created() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_core(tmp.path(), "core_x.so", 32);
        let dest_dir = tmp.path().join("app").join("data").join("cores");
        let (reference, target) = staged(&dest_dir, &source);

        CoreStager::new()
            .ensure_staged(&reference, &target, false)
            .unwrap();

        assert!(target.dest_path().exists());
    }
}

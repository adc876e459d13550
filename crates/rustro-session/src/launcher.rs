//! Session launch orchestration
//!
//! One [`SessionLauncher`] per launch request, terminal on success or
//! failure. The launcher resolves the storage permission gate, stages the
//! requested core if needed, builds the session environment and returns
//! it to the caller for handoff.

use crate::environment::{EnvironmentBuilder, SessionEnvironment, StorageRoots};
use rustro_core::config::Config;
use rustro_core::error::SessionError;
use rustro_core::permission::{PermissionGate, PermissionTicket, StoragePermissions};
use rustro_stage::{CoreReference, CoreStager, StagingTarget};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Parameters of a single launch request.
///
/// Carried through the whole launch, including across the permission
/// suspension; nothing here is process-wide state.
#[derive(Debug, Clone, Default)]
pub struct LaunchRequest {
    /// Content to load, if any
    pub content: Option<PathBuf>,
    /// Candidate core to stage and load, if any
    pub core: Option<PathBuf>,
    /// Re-stage even when a usable copy is already in place
    pub force_restage: bool,
}

/// Launch progress; `Ready` and `Failed` are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    /// Waiting for the platform permission gate
    AwaitingPermissions,
    /// Staging the requested core
    StagingCore,
    /// Assembling the session environment
    BuildingEnvironment,
    /// Environment handed back to the caller
    Ready,
    /// Terminal failure
    Failed,
}

/// One-shot launch orchestrator
pub struct SessionLauncher {
    request: LaunchRequest,
    config: Config,
    stager: CoreStager,
    state: LaunchState,
}

impl SessionLauncher {
    /// Create a launcher for one request
    pub fn new(request: LaunchRequest, config: Config) -> Self {
        Self {
            request,
            config,
            stager: CoreStager::new(),
            state: LaunchState::AwaitingPermissions,
        }
    }

    /// Current launch state
    pub fn state(&self) -> LaunchState {
        self.state
    }

    /// Drive the launch to a terminal state.
    ///
    /// Suspends on the permission ticket only when the request carries
    /// content; a cold launch issues the OS-level request once and
    /// proceeds without waiting for the dialog.
    pub fn run(&mut self, gate: &dyn PermissionGate) -> Result<SessionEnvironment, SessionError> {
        match self.drive(gate) {
            Ok(env) => {
                self.transition(LaunchState::Ready);
                Ok(env)
            }
            Err(err) => {
                self.transition(LaunchState::Failed);
                warn!("Launch failed: {}", err);
                Err(err)
            }
        }
    }

    fn drive(&mut self, gate: &dyn PermissionGate) -> Result<SessionEnvironment, SessionError> {
        self.await_permissions(gate)?;

        let core_path = match self.request.core.clone() {
            Some(candidate) => {
                self.transition(LaunchState::StagingCore);
                self.stage_core(&candidate)?
            }
            // No explicit core: the session browses the private core
            // directory itself.
            None => self.config.paths.cores.clone(),
        };

        self.transition(LaunchState::BuildingEnvironment);
        Ok(self.build_environment(core_path))
    }

    fn await_permissions(&self, gate: &dyn PermissionGate) -> Result<(), SessionError> {
        let wanted = StoragePermissions::launch_set();
        let missing = wanted - gate.preflight(wanted);
        if missing.is_empty() {
            debug!("Storage permissions already granted");
            return Ok(());
        }

        let ticket = PermissionTicket::new();
        gate.request(missing, ticket.clone());

        if self.request.content.is_none() {
            // Cold launch: the request has been issued, but nothing that
            // needs shared storage is loaded, so the dialog outcome does
            // not gate this flow.
            info!("No content requested, not waiting for permission grant");
            return Ok(());
        }

        let outcome = ticket.wait();
        if outcome.is_granted() {
            info!("Storage permissions granted: {:?}", outcome.granted);
            Ok(())
        } else {
            Err(SessionError::PermissionDenied {
                denied: outcome.denied,
            })
        }
    }

    fn stage_core(&self, candidate: &Path) -> Result<PathBuf, SessionError> {
        let reference = CoreReference::new(candidate)?;
        let target = StagingTarget::resolve(&self.config.paths.cores, &reference);
        let outcome = self
            .stager
            .ensure_staged(&reference, &target, self.request.force_restage)?;

        Ok(outcome.effective_path().to_path_buf())
    }

    fn build_environment(&self, core: PathBuf) -> SessionEnvironment {
        EnvironmentBuilder::new(
            core,
            self.config.paths.config_file.clone(),
            self.config.input.ime.clone(),
            self.config.paths.data_dir.clone(),
            self.config.paths.source_dir.clone(),
            StorageRoots::from_config(&self.config.paths),
        )
        .content(self.request.content.clone())
        .build()
    }

    fn transition(&mut self, next: LaunchState) {
        debug!("Launch state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

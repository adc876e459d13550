//! Storage permission gating
//!
//! Models the platform's asynchronous permission dialog as a capability.
//! The launcher asks the gate which permissions are already granted, issues
//! a request for the missing ones, and suspends on a [`PermissionTicket`]
//! that the platform resolves from its callback thread.

use bitflags::bitflags;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use tracing::debug;

bitflags! {
    /// External storage permissions a launch may require
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StoragePermissions: u32 {
        /// Read access to shared external storage
        const READ_EXTERNAL = 1 << 0;
        /// Write access to shared external storage
        const WRITE_EXTERNAL = 1 << 1;
    }
}

impl StoragePermissions {
    /// The full set a content launch asks for
    pub fn launch_set() -> Self {
        Self::READ_EXTERNAL | Self::WRITE_EXTERNAL
    }
}

/// Result of a permission request, as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionOutcome {
    /// Permissions the user granted
    pub granted: StoragePermissions,
    /// Permissions the user denied
    pub denied: StoragePermissions,
}

impl PermissionOutcome {
    /// Outcome with every requested permission granted
    pub fn all_granted(wanted: StoragePermissions) -> Self {
        Self {
            granted: wanted,
            denied: StoragePermissions::empty(),
        }
    }

    /// Outcome with every requested permission denied
    pub fn all_denied(wanted: StoragePermissions) -> Self {
        Self {
            granted: StoragePermissions::empty(),
            denied: wanted,
        }
    }

    /// Whether nothing was denied
    pub fn is_granted(&self) -> bool {
        self.denied.is_empty()
    }
}

/// Shared state between a suspended launcher and the platform callback
struct TicketState {
    outcome: Mutex<Option<PermissionOutcome>>,
    resolved: Condvar,
}

/// Resume handle for a pending permission request.
///
/// One side is held by the suspended launcher, a clone by the platform.
/// [`PermissionTicket::resolve`] may be called from any thread and wakes
/// the launcher blocked in [`PermissionTicket::wait`].
#[derive(Clone)]
pub struct PermissionTicket {
    state: Arc<TicketState>,
}

impl PermissionTicket {
    /// Create an unresolved ticket
    pub fn new() -> Self {
        Self {
            state: Arc::new(TicketState {
                outcome: Mutex::new(None),
                resolved: Condvar::new(),
            }),
        }
    }

    /// Deliver the platform's answer. The first resolution wins; later
    /// calls are ignored.
    pub fn resolve(&self, outcome: PermissionOutcome) {
        let mut slot = self.state.outcome.lock();
        if slot.is_none() {
            debug!("Permission ticket resolved: {:?}", outcome);
            *slot = Some(outcome);
            self.state.resolved.notify_all();
        }
    }

    /// Block until the platform resolves the ticket
    pub fn wait(&self) -> PermissionOutcome {
        let mut slot = self.state.outcome.lock();
        loop {
            if let Some(outcome) = *slot {
                return outcome;
            }
            self.state.resolved.wait(&mut slot);
        }
    }

    /// Outcome if already resolved, without blocking
    pub fn try_outcome(&self) -> Option<PermissionOutcome> {
        *self.state.outcome.lock()
    }
}

impl Default for PermissionTicket {
    fn default() -> Self {
        Self::new()
    }
}

/// Platform permission dialog capability
pub trait PermissionGate: Send + Sync {
    /// Subset of `wanted` already granted without prompting the user
    fn preflight(&self, wanted: StoragePermissions) -> StoragePermissions;

    /// Prompt the user for `wanted`; the outcome is delivered through
    /// `ticket` once the platform's dialog completes
    fn request(&self, wanted: StoragePermissions, ticket: PermissionTicket);
}

/// Gate for hosts without a runtime permission dialog.
///
/// Every permission is reported as pre-granted, so launches never suspend.
pub struct AutoGrantGate;

impl PermissionGate for AutoGrantGate {
    fn preflight(&self, wanted: StoragePermissions) -> StoragePermissions {
        wanted
    }

    fn request(&self, wanted: StoragePermissions, ticket: PermissionTicket) {
        ticket.resolve(PermissionOutcome::all_granted(wanted));
    }
}

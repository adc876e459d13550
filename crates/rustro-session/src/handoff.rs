//! Execution handoff capability

use crate::environment::SessionEnvironment;
use tracing::info;

/// Receiver of a ready session environment.
///
/// The execution engine behind this trait is opaque to the launcher and
/// may retain the environment for the session's lifetime.
pub trait ExecutionHandoff {
    /// Hand a fully resolved environment to the execution engine
    fn launch(&self, env: &SessionEnvironment);
}

/// Handoff that only logs the environment; useful as a dry-run target
pub struct LoggingHandoff;

impl ExecutionHandoff for LoggingHandoff {
    fn launch(&self, env: &SessionEnvironment) {
        for (key, value) in env.to_map() {
            info!("session env {}={}", key, value);
        }
    }
}

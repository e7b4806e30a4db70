//! Apply context and provider traits
//!
//! These traits allow the declarative crate to be used without
//! depending on specific implementations of service control.

use crate::types::CommandOutput;
use anyhow::Result;

/// Provider for restarting the service that consumes applied resources
///
/// Implement this trait to hook a real service manager in; use
/// [`NoRestart`] where no restart should happen.
pub trait ServiceControl {
    /// Restart a service, returning the command output
    fn restart(&self, service: &str) -> Result<CommandOutput>;

    /// Restart a service and return just success/failure
    fn restart_status(&self, service: &str) -> Result<bool> {
        Ok(self.restart(service)?.success)
    }
}

/// Service control that never restarts anything and always reports success
pub struct NoRestart;

impl ServiceControl for NoRestart {
    fn restart(&self, service: &str) -> Result<CommandOutput> {
        log::debug!("Skipping restart of {}", service);
        Ok(CommandOutput::empty_success())
    }
}

/// Context passed to resource apply operations
pub struct ApplyContext {
    /// Whether this is a dry run (no actual changes)
    pub dry_run: bool,
    /// Whether to output verbose information
    pub verbose: bool,
}

impl ApplyContext {
    /// Create a new apply context
    pub fn new(dry_run: bool, verbose: bool) -> Self {
        Self { dry_run, verbose }
    }
}

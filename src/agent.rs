//! Live agent restart through the configured service control command

use anyhow::Result;
use declarative::{CommandOutput, ServiceControl};

use crate::error::ProviderError;
use crate::runner;

/// Restarts the agent by running a fixed command line
#[derive(Debug, Clone)]
pub struct AgentService {
    command: Vec<String>,
}

impl AgentService {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl ServiceControl for AgentService {
    fn restart(&self, service: &str) -> Result<CommandOutput> {
        log::info!("Restarting {} via: {}", service, self.command.join(" "));
        let output =
            runner::run_output(&self.command).map_err(|source| ProviderError::RestartFailed {
                command: self.command.join(" "),
                source,
            })?;
        if !output.success {
            log::error!(
                "Error restarting {}: {}",
                service,
                output.stderr_str().trim()
            );
        }
        Ok(output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn service(parts: &[&str]) -> AgentService {
        AgentService::new(parts.iter().map(|s| (*s).to_string()).collect())
    }

    #[test]
    fn test_restart_success() {
        assert!(service(&["true"]).restart_status("omsagent").unwrap());
    }

    #[test]
    fn test_restart_failure_exit_status() {
        assert!(!service(&["false"]).restart_status("omsagent").unwrap());
    }

    #[test]
    fn test_restart_command_not_found() {
        let err = service(&["agentplug-no-such-program"])
            .restart("omsagent")
            .unwrap_err();
        assert!(err.to_string().contains("agentplug-no-such-program"));
    }
}

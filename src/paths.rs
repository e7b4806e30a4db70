//! Centralized path resolution for agentplug
//!
//! Every path the provider touches comes from [`crate::config::ProviderConfig`].
//! This module holds the environment overrides layered on top of it and the
//! path expansion applied to every configured path.
//!
//! # Environment Variables
//!
//! - `AGENTPLUG_CONFIG` - Provider configuration file (TOML)
//! - `AGENTPLUG_MODULE_ROOT` - Override the plugin installation-unit root
//! - `AGENTPLUG_PLUGIN_DIR` - Override the live agent plugin directory
//! - `AGENTPLUG_CONF_DIR` - Override the live agent conf directory
//! - `AGENTPLUG_AGENT_CONFIG_ROOT` - Override the multi-workspace config root

use std::path::{Path, PathBuf};

/// Environment variable for the configuration file
pub const ENV_CONFIG: &str = "AGENTPLUG_CONFIG";

/// Environment variable for the installation-unit root
pub const ENV_MODULE_ROOT: &str = "AGENTPLUG_MODULE_ROOT";

/// Environment variable for the live plugin directory
pub const ENV_PLUGIN_DIR: &str = "AGENTPLUG_PLUGIN_DIR";

/// Environment variable for the live conf directory
pub const ENV_CONF_DIR: &str = "AGENTPLUG_CONF_DIR";

/// Environment variable for the agent config root
pub const ENV_AGENT_CONFIG_ROOT: &str = "AGENTPLUG_AGENT_CONFIG_ROOT";

/// Read a path override from the environment, expanded
pub fn env_override(key: &str) -> Option<PathBuf> {
    let value = std::env::var(key).ok()?;
    if value.is_empty() {
        return None;
    }
    let path = expand(&value);
    log::debug!("Using {} from {}", path.display(), key);
    Some(path)
}

/// Expand ~ and environment variables in a path string.
///
/// This is the canonical path expansion function for agentplug. All modules
/// should use this instead of calling shellexpand directly.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

/// Expand a path that may already hold `~` or `$VAR` segments
pub fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => expand(s),
        None => path.to_path_buf(),
    }
}

// ============================================================================
// Tests
// ============================================================================

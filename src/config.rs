//! Provider configuration
//!
//! Everything the provider reads or writes is located through
//! [`ProviderConfig`]; nothing consults a global path constant.

use anyhow::{Context, Result, bail};
use fileset::Checksum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

/// Paths, file lists and commands for one agent installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Directory holding one installation unit per plugin
    pub module_root: PathBuf,
    /// Live agent plugin directory
    pub plugin_dir: PathBuf,
    /// Live agent conf directory
    pub conf_dir: PathBuf,
    /// Multi-workspace agent config root
    pub agent_config_root: PathBuf,
    /// Root the agent config tree is relative to when deriving state paths
    pub config_root: PathBuf,
    /// Root of per-workspace state trees
    pub state_root: PathBuf,
    /// Plugin files that make up the diagnostic logging capability
    pub diag_plugins: Vec<String>,
    /// Text whose presence in a workspace conf marks diagnostics as enabled
    pub diag_marker: String,
    /// Service restarted after a successful Set
    pub service_name: String,
    /// Command line that restarts the agent
    pub restart_command: Vec<String>,
    /// Strategy for comparing deployed files against their sources
    pub checksum: Checksum,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            module_root: PathBuf::from(
                "/opt/microsoft/omsconfig/modules/nxOMSPlugin/DSCResources/MSFT_nxOMSPluginResource/Plugins",
            ),
            plugin_dir: PathBuf::from("/opt/microsoft/omsagent/plugin"),
            conf_dir: PathBuf::from("/etc/opt/microsoft/omsagent/conf/omsagent.d"),
            agent_config_root: PathBuf::from("/etc/opt/microsoft/omsagent"),
            config_root: PathBuf::from("/etc"),
            state_root: PathBuf::from("/var"),
            diag_plugins: vec![
                "out_oms_diag.rb".to_string(),
                "oms_diag_lib.rb".to_string(),
                "oms_configuration.rb".to_string(),
            ],
            diag_marker: "out_oms_diag".to_string(),
            service_name: "omsagent".to_string(),
            restart_command: vec![
                "sudo".to_string(),
                "/opt/microsoft/omsagent/bin/service_control".to_string(),
                "restart".to_string(),
            ],
            checksum: Checksum::Md5,
        }
    }
}

impl ProviderConfig {
    /// Resolve the configuration: defaults, then the file, then env overrides
    ///
    /// A file that is named but missing is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.expand_paths();
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse TOML configuration text; absent keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid TOML format in provider config")
    }

    /// Check the configuration for values the provider cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.restart_command.is_empty() {
            bail!("restart_command must name a program");
        }
        if self.diag_marker.is_empty() {
            bail!("diag_marker must not be empty");
        }
        if self.service_name.is_empty() {
            bail!("service_name must not be empty");
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        let overrides = [
            (paths::ENV_MODULE_ROOT, &mut self.module_root),
            (paths::ENV_PLUGIN_DIR, &mut self.plugin_dir),
            (paths::ENV_CONF_DIR, &mut self.conf_dir),
            (paths::ENV_AGENT_CONFIG_ROOT, &mut self.agent_config_root),
        ];
        for (key, slot) in overrides {
            if let Some(path) = paths::env_override(key) {
                *slot = path;
            }
        }
    }

    fn expand_paths(&mut self) {
        for slot in [
            &mut self.module_root,
            &mut self.plugin_dir,
            &mut self.conf_dir,
            &mut self.agent_config_root,
            &mut self.config_root,
            &mut self.state_root,
        ] {
            *slot = paths::expand_path(slot);
        }
    }

    /// Conf file of the default (single) workspace
    pub fn default_workspace_conf(&self) -> PathBuf {
        crate::workspace::conf_file(&self.agent_config_root)
    }

    /// A complete installation layout under `root`, for tests
    #[cfg(test)]
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            module_root: root.join("modules"),
            plugin_dir: root.join("opt").join("plugin"),
            conf_dir: root.join("etc").join("omsagent").join("conf").join("omsagent.d"),
            agent_config_root: root.join("etc").join("omsagent"),
            config_root: root.join("etc"),
            state_root: root.join("var"),
            ..Self::default()
        }
    }
}

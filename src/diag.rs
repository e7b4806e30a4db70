//! Diagnostic logging activation in the agent configuration
//!
//! Diagnostics are "enabled" when every agent conf file (the default one and
//! one per workspace) carries the diagnostic output section. Enabling them
//! appends that section to each conf file lacking it.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use crate::config::ProviderConfig;
use crate::workspace;

/// Capability for inspecting and enabling diagnostic logging
pub trait DiagnosticLog: fmt::Debug {
    /// Whether every existing agent conf file already carries the marker
    fn is_enabled(&self) -> bool;

    /// Whether all diagnostic plugin files are deployed
    fn plugins_copied(&self) -> bool;

    /// Append the diagnostic section to every conf file lacking it
    fn update_conf(&self) -> bool;
}

/// Diagnostics that are always enabled and never deployed
#[derive(Debug, Default)]
pub struct NoDiagnostics;

impl DiagnosticLog for NoDiagnostics {
    fn is_enabled(&self) -> bool {
        true
    }

    fn plugins_copied(&self) -> bool {
        false
    }

    fn update_conf(&self) -> bool {
        true
    }
}

/// The diagnostic capability for `config`
///
/// An empty diagnostic plugin list turns diagnostics off entirely.
pub fn for_config(config: &ProviderConfig) -> Box<dyn DiagnosticLog> {
    if config.diag_plugins.is_empty() {
        log::debug!("No diagnostic plugins configured");
        Box::new(NoDiagnostics)
    } else {
        Box::new(DiagnosticConfig::from_config(config))
    }
}

/// Live diagnostic configuration over the agent's conf files
#[derive(Debug, Clone)]
pub struct DiagnosticConfig {
    plugin_dir: PathBuf,
    plugins: Vec<String>,
    marker: String,
    agent_config_root: PathBuf,
    config_root: PathBuf,
    state_root: PathBuf,
}

impl DiagnosticConfig {
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            plugin_dir: config.plugin_dir.clone(),
            plugins: config.diag_plugins.clone(),
            marker: config.diag_marker.clone(),
            agent_config_root: config.agent_config_root.clone(),
            config_root: config.config_root.clone(),
            state_root: config.state_root.clone(),
        }
    }

    /// Whether the conf at `path` lacks the marker; missing files do not
    fn lacks_marker(&self, path: &Path) -> io::Result<bool> {
        if !path.is_file() {
            return Ok(false);
        }
        let content = fs::read(path)?;
        Ok(!contains(&content, self.marker.as_bytes()))
    }

    fn first_lacking(&self) -> io::Result<Option<PathBuf>> {
        // Default conf is checked before workspaces are listed
        let default_conf = workspace::conf_file(&self.agent_config_root);
        if self.lacks_marker(&default_conf)? {
            return Ok(Some(default_conf));
        }
        for ws in workspace::discover(&self.agent_config_root)? {
            let conf = ws.conf_file();
            if self.lacks_marker(&conf)? {
                return Ok(Some(conf));
            }
        }
        Ok(None)
    }

    fn append_block(&self, workspace_root: &Path) -> io::Result<bool> {
        let conf = workspace::conf_file(workspace_root);
        if !self.lacks_marker(&conf)? {
            return Ok(false);
        }
        let block = render_block(workspace_root, &self.config_root, &self.state_root)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "path is not valid UTF-8"))?;
        let mut file = OpenOptions::new().append(true).open(&conf)?;
        file.write_all(block.as_bytes())?;
        log::info!("Enabled diagnostic logging in {}", conf.display());
        Ok(true)
    }

    fn update_one(&self, workspace_root: &Path) -> bool {
        match self.append_block(workspace_root) {
            Ok(_) => true,
            Err(e) => {
                log::error!(
                    "Failed to update {}: {}",
                    workspace::conf_file(workspace_root).display(),
                    e
                );
                false
            }
        }
    }
}

impl DiagnosticLog for DiagnosticConfig {
    fn is_enabled(&self) -> bool {
        match self.first_lacking() {
            Ok(None) => true,
            Ok(Some(conf)) => {
                log::info!("Diagnostic logging is not enabled in {}", conf.display());
                false
            }
            Err(e) => {
                log::error!("Failed to check diagnostic logging state: {}", e);
                true
            }
        }
    }

    fn plugins_copied(&self) -> bool {
        self.plugins
            .iter()
            .all(|name| self.plugin_dir.join(name).is_file())
    }

    fn update_conf(&self) -> bool {
        // Default conf is updated before workspaces are listed
        if !self.update_one(&self.agent_config_root) {
            return false;
        }
        match workspace::discover(&self.agent_config_root) {
            Ok(workspaces) => workspaces.iter().all(|ws| self.update_one(&ws.root)),
            Err(e) => {
                log::error!(
                    "Failed to list workspaces under {}: {}",
                    self.agent_config_root.display(),
                    e
                );
                false
            }
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

/// State directory of a workspace: its path below `config_root`, re-rooted
/// at `state_root`
fn state_dir(workspace_root: &Path, config_root: &Path, state_root: &Path) -> PathBuf {
    let relative: PathBuf = match workspace_root.strip_prefix(config_root) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => workspace_root
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect(),
    };
    state_root.join(relative).join("state")
}

/// A path as UTF-8 text, or `None` (logged) when it is not
fn utf8_path(path: &Path) -> Option<&str> {
    let text = path.to_str();
    if text.is_none() {
        log::error!("Path is not valid UTF-8: {}", path.display());
    }
    text
}

/// The diagnostic output section for the workspace rooted at `workspace_root`
///
/// Returns `None` when any rendered path is not valid UTF-8.
pub fn render_block(workspace_root: &Path, config_root: &Path, state_root: &Path) -> Option<String> {
    let conf_dir = workspace_root.join("conf");
    let cert_dir = workspace_root.join("certs");
    let state_dir = state_dir(workspace_root, config_root, state_root);
    Some(format!(
        "\n<match diag.oms diag.oms.**>\n  type out_oms_diag\n  log_level info\n  num_threads 5\n\n  omsadmin_conf_path {conf}/omsadmin.conf\n  cert_path {certs}/oms.crt\n  key_path {certs}/oms.key\n\n  buffer_chunk_limit 1m\n  buffer_type file\n  buffer_path {state}/out_oms_diag*.buffer\n\n  buffer_queue_limit 50\n  buffer_queue_full_action drop_oldest_chunk\n  flush_interval 10s\n  retry_limit 10\n  retry_wait 30s\n  max_retry_wait 9m\n</match>\n\n",
        conf = utf8_path(&conf_dir)?,
        certs = utf8_path(&cert_dir)?,
        state = utf8_path(&state_dir)?,
    ))
}

//! Plugin installation units and their reconciliation
//!
//! An installation unit is `<module_root>/<name>/` with an optional
//! `plugin/` and an optional `conf/` directory. Which of the two exist
//! decides everything the provider does with the plugin.

pub mod plugin;

pub use plugin::{Plugin, Targets};

use std::fmt;
use std::path::{Path, PathBuf};

/// Structural case of an installation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallCase {
    /// Both `plugin/` and `conf/` exist
    BothDirs,
    /// Only `plugin/` exists
    PluginOnly,
    /// Only `conf/` exists
    ConfOnly,
    /// Neither exists (or the name cannot address a unit)
    Neither,
}

impl InstallCase {
    fn from_dirs(plugin: bool, conf: bool) -> Self {
        match (plugin, conf) {
            (true, true) => Self::BothDirs,
            (true, false) => Self::PluginOnly,
            (false, true) => Self::ConfOnly,
            (false, false) => Self::Neither,
        }
    }

    pub fn has_plugin(self) -> bool {
        matches!(self, Self::BothDirs | Self::PluginOnly)
    }

    pub fn has_conf(self) -> bool {
        matches!(self, Self::BothDirs | Self::ConfOnly)
    }
}

impl fmt::Display for InstallCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BothDirs => "plugin and conf",
            Self::PluginOnly => "plugin only",
            Self::ConfOnly => "conf only",
            Self::Neither => "invalid",
        };
        f.write_str(label)
    }
}

/// A plugin's source artifacts under the module root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationUnit {
    pub name: String,
    pub plugin_src: PathBuf,
    pub conf_src: PathBuf,
    pub case: InstallCase,
}

impl InstallationUnit {
    /// Locate and classify the unit for `name`
    pub fn locate(module_root: &Path, name: &str) -> Self {
        let root = module_root.join(name);
        let plugin_src = root.join("plugin");
        let conf_src = root.join("conf");
        let case = if is_unit_name(name) {
            InstallCase::from_dirs(plugin_src.is_dir(), conf_src.is_dir())
        } else {
            log::debug!("{:?} cannot name an installation unit", name);
            InstallCase::Neither
        };
        Self {
            name: name.to_string(),
            plugin_src,
            conf_src,
            case,
        }
    }
}

/// A single, plain path component
fn is_unit_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

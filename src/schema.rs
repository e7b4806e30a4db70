use anyhow::{Context, Result};
use declarative::Status;
use serde::{Deserialize, Serialize};
use std::io::Read;

// ============================================================================
// Plugin Declarations
// ============================================================================

/// One declared plugin, as exchanged with the configuration engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSpec {
    #[serde(rename = "PluginName")]
    pub name: String,
    #[serde(rename = "Ensure")]
    pub ensure: String,
}

impl PluginSpec {
    /// Build a declaration from caller-supplied strings
    pub fn new(name: &str, ensure: &str) -> Self {
        Self {
            name: normalize(name),
            ensure: normalize(ensure),
        }
    }

    fn normalized(self) -> Self {
        Self::new(&self.name, &self.ensure)
    }
}

/// Drop every non-ASCII character
pub fn normalize(value: &str) -> String {
    value.chars().filter(char::is_ascii).collect()
}

/// Parse a `Name=Ensure` command-line argument
pub fn parse_arg(arg: &str) -> Result<PluginSpec, String> {
    let (name, ensure) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected Name=Ensure, got '{}'", arg))?;
    Ok(PluginSpec::new(name, ensure))
}

/// Read a JSON array of declarations
pub fn read_specs(reader: impl Read) -> Result<Vec<PluginSpec>> {
    let specs: Vec<PluginSpec> =
        serde_json::from_reader(reader).context("Invalid plugin declaration JSON")?;
    Ok(specs.into_iter().map(PluginSpec::normalized).collect())
}

// ============================================================================
// Verb Reports
// ============================================================================

/// Result of Test and Set
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub status: Status,
}

/// Result of Get: the plugins already in place
#[derive(Debug, Clone, Serialize)]
pub struct GetReport {
    pub status: Status,
    pub name: String,
    pub plugins: Vec<PluginSpec>,
}

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::fs::File;
use std::io;
use std::path::PathBuf;

use crate::paths;
use crate::schema::{self, PluginSpec};

#[derive(Parser)]
#[command(name = "agentplug")]
#[command(version)]
#[command(about = "Reconcile logging agent plugins against their declared state", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Provider configuration file (TOML)
    #[arg(short, long, global = true, env = paths::ENV_CONFIG)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Report the plugins already deployed
    Get(VerbArgs),

    /// Check the declared plugins against the agent
    Test(VerbArgs),

    /// Converge the declared plugins and restart the agent
    Set(SetArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Verb Arguments
// ============================================================================

#[derive(Args)]
pub struct VerbArgs {
    /// Configuration name echoed back by Get
    #[arg(short, long, default_value = "")]
    pub name: String,

    /// Plugin declarations as Name=Ensure
    #[arg(value_name = "PLUGIN", value_parser = schema::parse_arg)]
    pub plugins: Vec<PluginSpec>,

    /// JSON array of {"PluginName", "Ensure"} objects; "-" reads stdin
    #[arg(long, value_name = "PATH")]
    pub plugins_file: Option<PathBuf>,
}

impl VerbArgs {
    /// Declarations from the command line followed by those from the file
    pub fn declarations(&self) -> Result<Vec<PluginSpec>> {
        let mut specs = self.plugins.clone();
        if let Some(path) = &self.plugins_file {
            let from_file = if path.as_os_str() == "-" {
                schema::read_specs(io::stdin().lock())?
            } else {
                let file = File::open(path)
                    .with_context(|| format!("Could not open plugins file: {}", path.display()))?;
                schema::read_specs(file)
                    .with_context(|| format!("Invalid plugins file: {}", path.display()))?
            };
            specs.extend(from_file);
        }
        Ok(specs)
    }
}

#[derive(Args)]
pub struct SetArgs {
    #[command(flatten)]
    pub verb: VerbArgs,

    /// Show what would change without touching the agent
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the agent restart
    #[arg(long)]
    pub no_restart: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_set() {
        let cli = Cli::try_parse_from([
            "agentplug",
            "set",
            "--dry-run",
            "CustomLog=Present",
            "Syslog=Absent",
        ])
        .unwrap();

        let Command::Set(args) = cli.command else {
            panic!("expected set");
        };
        assert!(args.dry_run);
        assert!(!args.no_restart);
        assert_eq!(
            args.verb.declarations().unwrap(),
            vec![
                PluginSpec::new("CustomLog", "Present"),
                PluginSpec::new("Syslog", "Absent"),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_malformed_plugin() {
        assert!(Cli::try_parse_from(["agentplug", "test", "CustomLog"]).is_err());
    }

    #[test]
    fn test_get_name() {
        let cli = Cli::try_parse_from(["agentplug", "-v", "get", "--name", "agent"]).unwrap();
        assert_eq!(cli.verbose, 1);
        let Command::Get(args) = cli.command else {
            panic!("expected get");
        };
        assert_eq!(args.name, "agent");
        assert!(args.declarations().unwrap().is_empty());
    }

    #[test]
    fn test_declarations_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("plugins.json");
        fs::write(&path, r#"[{"PluginName": "Perf", "Ensure": "Present"}]"#).unwrap();
        let args = VerbArgs {
            name: String::new(),
            plugins: vec![PluginSpec::new("CustomLog", "Absent")],
            plugins_file: Some(path),
        };

        let specs = args.declarations().unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[1].name, "Perf");
    }

    #[test]
    fn test_declarations_missing_file() {
        let args = VerbArgs {
            name: String::new(),
            plugins: Vec::new(),
            plugins_file: Some(PathBuf::from("/nonexistent/agentplug/plugins.json")),
        };
        assert!(args.declarations().is_err());
    }
}

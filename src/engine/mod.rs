//! Verb engine for agentplug
//!
//! The engine answers the three verbs of the configuration engine:
//! 1. Get - Report every installation unit already deployed
//! 2. Test - Check each declared plugin against the live agent
//! 3. Set - Converge each declared plugin, then restart the agent
//!
//! Every failure is logged here and reported as `[-1]`.

use declarative::{
    BoxedResource, ExecuteOptions, ExecutionPlan, ResourceExt, ServiceControl, Status, execute,
    test_all,
};
use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;

use crate::agent::AgentService;
use crate::config::ProviderConfig;
use crate::diag::{self, DiagnosticLog};
use crate::resource::{InstallCase, InstallationUnit, Plugin, Targets};
use crate::schema::{GetReport, PluginSpec};

/// Plugin provider bound to one agent installation
pub struct Provider {
    config: ProviderConfig,
    targets: Rc<Targets>,
    service: Box<dyn ServiceControl>,
}

impl Provider {
    /// Provider with the live diagnostic configuration and agent restart
    pub fn new(config: ProviderConfig) -> Self {
        let diag = diag::for_config(&config);
        let service = AgentService::new(config.restart_command.clone());
        Self::with_collaborators(config, diag, Box::new(service))
    }

    pub fn with_collaborators(
        config: ProviderConfig,
        diag: Box<dyn DiagnosticLog>,
        service: Box<dyn ServiceControl>,
    ) -> Self {
        let targets = Rc::new(Targets {
            plugin_dir: config.plugin_dir.clone(),
            conf_dir: config.conf_dir.clone(),
            checksum: config.checksum,
            diag,
        });
        Self {
            config,
            targets,
            service,
        }
    }

    fn plugin(&self, name: &str, ensure: &str) -> Plugin {
        let unit = InstallationUnit::locate(&self.config.module_root, name);
        Plugin::new(unit, ensure, Rc::clone(&self.targets))
    }

    fn resources(&self, specs: &[PluginSpec]) -> Vec<BoxedResource> {
        specs
            .iter()
            .map(|spec| Box::new(self.plugin(&spec.name, &spec.ensure)) as BoxedResource)
            .collect()
    }

    /// Report every installation unit whose files are already deployed
    ///
    /// The declared plugin list plays no part in Get.
    pub fn get(&self, name: &str) -> GetReport {
        let units = match list_units(&self.config.module_root) {
            Ok(units) => units,
            Err(e) => {
                log::error!(
                    "Failed to list installation units in {}: {}",
                    self.config.module_root.display(),
                    e
                );
                Vec::new()
            }
        };

        let mut plugins = Vec::new();
        for unit in units {
            let plugin = self.plugin(&unit, "Present");
            if plugin.case() == InstallCase::Neither {
                log::warn!("{} contains neither a plugin nor a conf directory", unit);
                continue;
            }
            if plugin.is_present() {
                plugins.push(PluginSpec::new(&unit, "Present"));
            } else {
                log::debug!("{} is not deployed", unit);
            }
        }

        GetReport {
            status: Status::Success,
            name: name.to_string(),
            plugins,
        }
    }

    /// Check every declared plugin; the first one out of state fails the call
    pub fn test(&self, specs: &[PluginSpec]) -> Status {
        match test_all(&self.resources(specs)) {
            Ok(()) => Status::Success,
            Err(e) => {
                log::warn!("Test failed: {:#}", e);
                Status::Failure
            }
        }
    }

    /// Converge every declared plugin in order, then restart the agent
    ///
    /// The first failure stops the run; changes already made stay in place.
    pub fn set(&self, specs: &[PluginSpec], opts: ExecuteOptions) -> Status {
        let mut plan = ExecutionPlan::new();
        for resource in self.resources(specs) {
            plan.add_resource(resource);
        }
        plan.add_post_action(self.config.service_name.clone());

        match execute(plan, opts, self.service.as_ref()) {
            Ok(summary) => {
                log::info!(
                    "Set complete: {} created, {} removed, {} unchanged, {} skipped",
                    summary.created,
                    summary.removed,
                    summary.no_change,
                    summary.skipped
                );
                Status::Success
            }
            Err(e) => {
                log::error!("Set failed: {:#}", e);
                Status::Failure
            }
        }
    }
}

/// Names of the directories under `module_root`, sorted
///
/// Symlinks to directories count, as they do when a unit is located by name.
fn list_units(module_root: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(module_root)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => log::warn!("Skipping non UTF-8 unit name {:?}", raw),
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::{DiagnosticConfig, NoDiagnostics};
    use anyhow::Result;
    use declarative::{CommandOutput, NoRestart};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Restart double that records calls and answers with a fixed status
    #[derive(Clone)]
    struct RecordingService {
        succeed: bool,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl ServiceControl for RecordingService {
        fn restart(&self, service: &str) -> Result<CommandOutput> {
            self.calls.borrow_mut().push(service.to_string());
            Ok(CommandOutput {
                stdout: Vec::new(),
                stderr: b"service_control: failed".to_vec(),
                success: self.succeed,
            })
        }
    }

    fn recording(succeed: bool) -> RecordingService {
        RecordingService {
            succeed,
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    struct Env {
        _tmp: TempDir,
        config: ProviderConfig,
    }

    impl Env {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let config = ProviderConfig::rooted_at(tmp.path());
            fs::create_dir_all(&config.module_root).unwrap();
            fs::create_dir_all(&config.plugin_dir).unwrap();
            fs::create_dir_all(&config.conf_dir).unwrap();
            Self { _tmp: tmp, config }
        }

        fn file(&self, unit: &str, dir: &str, name: &str, content: &str) {
            let dir = self.config.module_root.join(unit).join(dir);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(name), content).unwrap();
        }

        fn provider(&self) -> Provider {
            Provider::with_collaborators(
                self.config.clone(),
                Box::new(NoDiagnostics),
                Box::new(NoRestart),
            )
        }

        fn live_conf(&self, name: &str) -> PathBuf {
            self.config.conf_dir.join(name)
        }

        fn live_plugin(&self, name: &str) -> PathBuf {
            self.config.plugin_dir.join(name)
        }
    }

    fn spec(name: &str, ensure: &str) -> Vec<PluginSpec> {
        vec![PluginSpec::new(name, ensure)]
    }

    // ========================================================================
    // Test and Set
    // ========================================================================

    #[test]
    fn test_conf_only_cycle() {
        let env = Env::new();
        env.file("CustomLog", "conf", "custom.conf", "<source>\n</source>\n");
        let provider = env.provider();
        let opts = ExecuteOptions::default();

        assert_eq!(provider.test(&spec("CustomLog", "Present")), Status::Failure);
        assert_eq!(provider.set(&spec("CustomLog", "Present"), opts.clone()), Status::Success);
        assert!(env.live_conf("custom.conf").is_file());
        assert_eq!(provider.test(&spec("CustomLog", "Present")), Status::Success);

        assert_eq!(provider.set(&spec("CustomLog", "Absent"), opts), Status::Success);
        assert!(!env.live_conf("custom.conf").exists());
        assert_eq!(provider.test(&spec("CustomLog", "Absent")), Status::Success);
        assert_eq!(provider.test(&spec("CustomLog", "Present")), Status::Failure);
    }

    #[test]
    fn test_invalid_unit_fails_every_verb() {
        let env = Env::new();
        let provider = env.provider();
        for ensure in ["Present", "Absent"] {
            assert_eq!(provider.test(&spec("Broken", ensure)), Status::Failure);
            assert_eq!(
                provider.set(&spec("Broken", ensure), ExecuteOptions::default()),
                Status::Failure
            );
        }
    }

    #[test]
    fn test_unrecognized_ensure_fails() {
        let env = Env::new();
        env.file("CustomLog", "conf", "custom.conf", "x");
        let provider = env.provider();

        assert_eq!(provider.test(&spec("CustomLog", "Enabled")), Status::Failure);
        assert_eq!(
            provider.set(&spec("CustomLog", "Enabled"), ExecuteOptions::default()),
            Status::Failure
        );
    }

    #[test]
    fn test_plugin_only_absent_never_removes_files() {
        let env = Env::new();
        env.file("Perf", "plugin", "in_perf.rb", "class Perf; end\n");
        let provider = env.provider();

        provider.set(&spec("Perf", "Present"), ExecuteOptions::default());
        assert_eq!(
            provider.set(&spec("Perf", "Absent"), ExecuteOptions::default()),
            Status::Success
        );

        assert!(env.live_plugin("in_perf.rb").is_file());
        assert_eq!(provider.test(&spec("Perf", "Absent")), Status::Success);
        let report = provider.get("agent");
        assert_eq!(report.plugins, spec("Perf", "Present"));
    }

    #[test]
    fn test_set_stops_at_first_failure() {
        let env = Env::new();
        env.file("First", "conf", "first.conf", "1");
        env.file("Last", "conf", "last.conf", "3");
        let service = recording(true);
        let provider = Provider::with_collaborators(
            env.config.clone(),
            Box::new(NoDiagnostics),
            Box::new(service.clone()),
        );
        let specs = vec![
            PluginSpec::new("First", "Present"),
            PluginSpec::new("Broken", "Present"),
            PluginSpec::new("Last", "Present"),
        ];

        assert_eq!(provider.set(&specs, ExecuteOptions::default()), Status::Failure);
        assert!(env.live_conf("first.conf").exists());
        assert!(!env.live_conf("last.conf").exists());
        assert!(service.calls.borrow().is_empty());
    }

    #[test]
    fn test_set_restarts_agent_once() {
        let env = Env::new();
        env.file("A", "conf", "a.conf", "a");
        env.file("B", "plugin", "b.rb", "b");
        let service = recording(true);
        let provider = Provider::with_collaborators(
            env.config.clone(),
            Box::new(NoDiagnostics),
            Box::new(service.clone()),
        );
        let specs = vec![
            PluginSpec::new("A", "Present"),
            PluginSpec::new("B", "Present"),
        ];

        assert_eq!(provider.set(&specs, ExecuteOptions::default()), Status::Success);
        assert_eq!(*service.calls.borrow(), vec!["omsagent".to_string()]);
    }

    #[test]
    fn test_set_fails_when_restart_fails() {
        let env = Env::new();
        env.file("CustomLog", "conf", "custom.conf", "x");
        let provider = Provider::with_collaborators(
            env.config.clone(),
            Box::new(NoDiagnostics),
            Box::new(recording(false)),
        );

        assert_eq!(
            provider.set(&spec("CustomLog", "Present"), ExecuteOptions::default()),
            Status::Failure
        );
        assert!(env.live_conf("custom.conf").is_file());
    }

    #[test]
    fn test_set_dry_run_touches_nothing() {
        let env = Env::new();
        env.file("CustomLog", "conf", "custom.conf", "x");
        let service = recording(true);
        let provider = Provider::with_collaborators(
            env.config.clone(),
            Box::new(NoDiagnostics),
            Box::new(service.clone()),
        );
        let opts = ExecuteOptions {
            dry_run: true,
            verbose: false,
        };

        assert_eq!(provider.set(&spec("CustomLog", "Present"), opts), Status::Success);
        assert!(!env.live_conf("custom.conf").exists());
        assert!(service.calls.borrow().is_empty());
    }

    #[test]
    fn test_empty_declaration() {
        let env = Env::new();
        let provider = env.provider();
        assert_eq!(provider.test(&[]), Status::Success);
        assert_eq!(provider.set(&[], ExecuteOptions::default()), Status::Success);
    }

    #[test]
    fn test_set_enables_diagnostics_in_every_workspace() {
        let env = Env::new();
        let ws = "9c4a7b1e-2d3f-4a5b-8c6d-7e8f9a0b1c2d";
        for name in &env.config.diag_plugins {
            env.file("Diag", "plugin", name, "# diag\n");
        }
        let default_conf = env.config.default_workspace_conf();
        let ws_conf = crate::workspace::conf_file(&env.config.agent_config_root.join(ws));
        for conf in [&default_conf, &ws_conf] {
            fs::create_dir_all(conf.parent().unwrap()).unwrap();
            fs::write(conf, "<source>\n</source>\n").unwrap();
        }
        let provider = Provider::with_collaborators(
            env.config.clone(),
            Box::new(DiagnosticConfig::from_config(&env.config)),
            Box::new(NoRestart),
        );

        assert_eq!(provider.test(&spec("Diag", "Present")), Status::Failure);
        assert_eq!(
            provider.set(&spec("Diag", "Present"), ExecuteOptions::default()),
            Status::Success
        );
        assert_eq!(provider.test(&spec("Diag", "Present")), Status::Success);

        for conf in [&default_conf, &ws_conf] {
            let content = fs::read_to_string(conf).unwrap();
            assert_eq!(content.matches("type out_oms_diag").count(), 1);
        }
        let ws_content = fs::read_to_string(&ws_conf).unwrap();
        assert!(ws_content.contains(&format!("{ws}/state/out_oms_diag*.buffer")));
    }

    // ========================================================================
    // Get
    // ========================================================================

    #[test]
    fn test_get_reports_deployed_units() {
        let env = Env::new();
        env.file("Syslog", "plugin", "in_syslog.rb", "p");
        env.file("Syslog", "conf", "syslog.conf", "c");
        env.file("CustomLog", "conf", "custom.conf", "c");
        env.file("Pending", "conf", "pending.conf", "c");
        fs::create_dir_all(env.config.module_root.join("Broken")).unwrap();
        let provider = env.provider();
        let specs = vec![
            PluginSpec::new("Syslog", "Present"),
            PluginSpec::new("CustomLog", "Present"),
        ];
        provider.set(&specs, ExecuteOptions::default());

        let report = provider.get("agent");

        assert_eq!(report.status, Status::Success);
        assert_eq!(report.name, "agent");
        assert_eq!(
            report.plugins,
            vec![
                PluginSpec::new("CustomLog", "Present"),
                PluginSpec::new("Syslog", "Present"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_get_follows_symlinked_units() {
        let env = Env::new();
        let elsewhere = env.config.module_root.parent().unwrap().join("shared");
        fs::create_dir_all(elsewhere.join("conf")).unwrap();
        fs::write(elsewhere.join("conf").join("custom.conf"), "c").unwrap();
        std::os::unix::fs::symlink(&elsewhere, env.config.module_root.join("CustomLog")).unwrap();
        fs::write(env.config.module_root.join("notes.txt"), "not a unit").unwrap();
        let provider = env.provider();

        assert_eq!(
            provider.set(&spec("CustomLog", "Present"), ExecuteOptions::default()),
            Status::Success
        );
        assert_eq!(provider.test(&spec("CustomLog", "Present")), Status::Success);
        assert_eq!(provider.get("agent").plugins, spec("CustomLog", "Present"));
    }

    #[test]
    fn test_get_omits_modified_units() {
        let env = Env::new();
        env.file("CustomLog", "conf", "custom.conf", "abc");
        let provider = env.provider();
        provider.set(&spec("CustomLog", "Present"), ExecuteOptions::default());
        fs::write(env.live_conf("custom.conf"), "abd").unwrap();

        assert!(provider.get("agent").plugins.is_empty());
    }

    #[test]
    fn test_get_without_module_root() {
        let env = Env::new();
        fs::remove_dir_all(&env.config.module_root).unwrap();

        let report = env.provider().get("agent");
        assert_eq!(report.status, Status::Success);
        assert!(report.plugins.is_empty());
    }
}

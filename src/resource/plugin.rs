//! Plugin resource - deploy or withdraw a plugin's files in the live agent

use anyhow::Result;
use declarative::{ApplyContext, ApplyResult, Ensure, Resource, ResourceState};
use fileset::Checksum;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::{InstallCase, InstallationUnit};
use crate::diag::DiagnosticLog;
use crate::error::ProviderError;

/// Live agent locations shared by every plugin in one invocation
#[derive(Debug)]
pub struct Targets {
    pub plugin_dir: PathBuf,
    pub conf_dir: PathBuf,
    pub checksum: Checksum,
    pub diag: Box<dyn DiagnosticLog>,
}

/// A declared plugin bound to its installation unit
#[derive(Debug)]
pub struct Plugin {
    unit: InstallationUnit,
    /// Kept raw so a bad value fails this plugin only when it is reached
    ensure: String,
    targets: Rc<Targets>,
}

impl Plugin {
    pub fn new(unit: InstallationUnit, ensure: impl Into<String>, targets: Rc<Targets>) -> Self {
        Self {
            unit,
            ensure: ensure.into(),
            targets,
        }
    }

    pub fn case(&self) -> InstallCase {
        self.unit.case
    }

    /// Case and ensure, validated in that order
    fn resolve(&self) -> Result<(InstallCase, Ensure), ProviderError> {
        if self.unit.case == InstallCase::Neither {
            return Err(ProviderError::InvalidInstallationUnit {
                name: self.unit.name.clone(),
            });
        }
        let ensure = self.ensure.parse::<Ensure>()?;
        Ok((self.unit.case, ensure))
    }

    /// Whether every file the unit provides is deployed with matching content
    fn files_match(&self) -> bool {
        let case = self.unit.case;
        let checksum = self.targets.checksum;
        (!case.has_plugin()
            || fileset::check_all(&self.unit.plugin_src, &self.targets.plugin_dir, checksum))
            && (!case.has_conf()
                || fileset::check_all(&self.unit.conf_src, &self.targets.conf_dir, checksum))
    }

    /// Diagnostic plugins are deployed but their conf section is missing
    fn diag_pending(&self) -> bool {
        let diag = &self.targets.diag;
        diag.plugins_copied() && !diag.is_enabled()
    }

    fn copy(&self, src: &Path, dest: &Path) -> Result<(), ProviderError> {
        let copied = fileset::copy_all(src, dest).map_err(|source| ProviderError::FileOperation {
            op: "copy_all",
            src: src.to_path_buf(),
            dest: dest.to_path_buf(),
            source,
        })?;
        log::debug!("{}: copied {} files to {}", self.unit.name, copied, dest.display());
        Ok(())
    }

    fn delete(&self, src: &Path, dest: &Path) -> Result<(), ProviderError> {
        let removed =
            fileset::delete_all(src, dest).map_err(|source| ProviderError::FileOperation {
                op: "delete_all",
                src: src.to_path_buf(),
                dest: dest.to_path_buf(),
                source,
            })?;
        log::debug!("{}: removed {} files from {}", self.unit.name, removed, dest.display());
        Ok(())
    }

    fn deploy(&self, case: InstallCase) -> Result<ApplyResult, ProviderError> {
        if case.has_plugin() {
            self.copy(&self.unit.plugin_src, &self.targets.plugin_dir)?;
        }
        if case.has_conf() {
            self.copy(&self.unit.conf_src, &self.targets.conf_dir)?;
        }
        if case == InstallCase::PluginOnly && self.diag_pending() {
            log::info!("{}: enabling diagnostic logging", self.unit.name);
            if !self.targets.diag.update_conf() {
                return Err(ProviderError::DiagnosticUpdate);
            }
        }
        Ok(ApplyResult::Created)
    }

    fn withdraw(&self, case: InstallCase) -> Result<ApplyResult, ProviderError> {
        if !case.has_conf() {
            // Plugin files may be shared by other plugins; they stay deployed
            log::info!("{}: plugin files are never removed", self.unit.name);
            return Ok(ApplyResult::NoChange);
        }
        self.delete(&self.unit.conf_src, &self.targets.conf_dir)?;
        Ok(ApplyResult::Removed)
    }
}

impl Resource for Plugin {
    fn id(&self) -> String {
        self.unit.name.clone()
    }

    fn description(&self) -> String {
        format!("Ensure {} is {} ({})", self.unit.name, self.ensure, self.unit.case)
    }

    fn resource_type(&self) -> &'static str {
        "plugin"
    }

    fn current_state(&self) -> Result<ResourceState> {
        if self.unit.case == InstallCase::Neither {
            return Err(ProviderError::InvalidInstallationUnit {
                name: self.unit.name.clone(),
            }
            .into());
        }
        if self.files_match() {
            Ok(ResourceState::Present {
                details: Some(self.unit.case.to_string()),
            })
        } else {
            Ok(ResourceState::Absent)
        }
    }

    fn desired_state(&self) -> Result<ResourceState> {
        Ok(self.ensure.parse::<Ensure>()?.into())
    }

    fn test(&self) -> Result<bool> {
        let (case, ensure) = self.resolve()?;
        let in_state = match ensure {
            Ensure::Present => {
                self.files_match() && !(case == InstallCase::PluginOnly && self.diag_pending())
            }
            Ensure::Absent if case.has_conf() => {
                fileset::none_present(&self.unit.conf_src, &self.targets.conf_dir)
            }
            Ensure::Absent => true,
        };
        Ok(in_state)
    }

    fn apply(&self, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        let (case, ensure) = self.resolve()?;

        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: format!("Dry run: would ensure {} is {}", self.unit.name, ensure),
            });
        }

        let result = match ensure {
            Ensure::Present => self.deploy(case)?,
            Ensure::Absent => self.withdraw(case)?,
        };
        Ok(result)
    }
}

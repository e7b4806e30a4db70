//! Workspace discovery under the multi-tenant agent config root
//!
//! A workspace is a subdirectory named by the canonical (hyphenated,
//! lowercase) form of a UUID. Anything else under the root is ignored.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A tenant-scoped agent configuration subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub id: Uuid,
    pub root: PathBuf,
}

impl Workspace {
    /// The workspace's agent conf file
    pub fn conf_file(&self) -> PathBuf {
        conf_file(&self.root)
    }
}

/// `<root>/conf/omsagent.conf`
pub fn conf_file(workspace_root: &Path) -> PathBuf {
    workspace_root.join("conf").join("omsagent.conf")
}

/// Parse `name` as a workspace id, accepting only the canonical form
pub fn canonical_id(name: &str) -> Option<Uuid> {
    let id = Uuid::parse_str(name).ok()?;
    (id.hyphenated().to_string() == name).then_some(id)
}

/// List the workspaces directly under `agent_config_root`, sorted by id
pub fn discover(agent_config_root: &Path) -> io::Result<Vec<Workspace>> {
    let mut workspaces = Vec::new();
    for entry in fs::read_dir(agent_config_root)? {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        let Some(id) = canonical_id(&name) else {
            continue;
        };
        let root = entry.path();
        if root.is_dir() {
            workspaces.push(Workspace { id, root });
        }
    }
    workspaces.sort_by_key(|ws| ws.id);
    Ok(workspaces)
}

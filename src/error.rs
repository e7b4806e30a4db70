//! Error types for plugin reconciliation.
//!
//! None of these cross a verb boundary: the engine logs them and reports
//! `[-1]` to the caller.

use declarative::UnrecognizedEnsure;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reconciling a plugin declaration
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The installation unit has neither a `plugin/` nor a `conf/` directory
    #[error("{name} contains neither a plugin nor a conf directory")]
    InvalidInstallationUnit {
        /// Declared plugin name
        name: String,
    },

    /// The declared ensure value is neither `Present` nor `Absent`
    #[error(transparent)]
    UnrecognizedDesiredState(#[from] UnrecognizedEnsure),

    /// Copy, removal or listing failed
    #[error("{op} failed for src: {} dest: {}", .src.display(), .dest.display())]
    FileOperation {
        /// Operation name, e.g. "copy_all"
        op: &'static str,
        src: PathBuf,
        dest: PathBuf,
        #[source]
        source: fileset::Error,
    },

    /// Diagnostic logging could not be enabled in the agent configuration
    #[error("failed to enable diagnostic logging in agent configuration")]
    DiagnosticUpdate,

    /// The restart command could not be started
    #[error("failed to run restart command {command}: {source}")]
    RestartFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

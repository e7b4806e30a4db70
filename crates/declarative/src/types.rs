//! Core types for declarative resource management

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::process::Output;
use std::str::FromStr;
use thiserror::Error;

/// Desired presence of a resource, as declared by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ensure {
    Present,
    Absent,
}

/// An ensure value other than `Present` or `Absent`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Ensure value: {0} not expected")]
pub struct UnrecognizedEnsure(pub String);

impl FromStr for Ensure {
    type Err = UnrecognizedEnsure;

    /// Exact, case-sensitive match
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Present" => Ok(Self::Present),
            "Absent" => Ok(Self::Absent),
            other => Err(UnrecognizedEnsure(other.to_string())),
        }
    }
}

impl fmt::Display for Ensure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "Present"),
            Self::Absent => write!(f, "Absent"),
        }
    }
}

/// Current or desired state of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceState {
    /// Resource exists/is configured
    Present { details: Option<String> },
    /// Resource does not exist/is not configured
    Absent,
}

impl ResourceState {
    /// Check if state represents presence
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present { .. })
    }
}

impl From<Ensure> for ResourceState {
    fn from(ensure: Ensure) -> Self {
        match ensure {
            Ensure::Present => Self::Present { details: None },
            Ensure::Absent => Self::Absent,
        }
    }
}

/// Result of applying a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// No changes needed
    NoChange,
    /// Resource was created
    Created,
    /// Resource was removed
    Removed,
    /// Apply was skipped
    Skipped { reason: String },
}

/// Outcome of a whole verb invocation.
///
/// Serializes as the single-element list the configuration engine expects:
/// `[0]` for success, `[-1]` for failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

impl Status {
    /// Numeric code reported to the engine
    pub fn code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => -1,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn from_bool(ok: bool) -> Self {
        if ok { Self::Success } else { Self::Failure }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq([self.code()])
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.code())
    }
}

/// Summary of execution results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub removed: usize,
    pub skipped: usize,
    pub no_change: usize,
    /// Post-apply actions that ran successfully
    pub post_actions: usize,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.removed
    }

    /// Total number of resources processed
    pub fn total(&self) -> usize {
        self.created + self.removed + self.skipped + self.no_change
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &ApplyResult) {
        match result {
            ApplyResult::NoChange => self.no_change += 1,
            ApplyResult::Created => self.created += 1,
            ApplyResult::Removed => self.removed += 1,
            ApplyResult::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Options for execution
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Verbose output
    pub verbose: bool,
}

/// Output from a service control command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub success: bool,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
            success: output.status.success(),
        }
    }
}

impl CommandOutput {
    /// A successful run with no output
    pub fn empty_success() -> Self {
        Self {
            stdout: Vec::new(),
            stderr: Vec::new(),
            success: true,
        }
    }

    /// Get stdout as a string
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a string
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_parse_exact() {
        assert_eq!("Present".parse::<Ensure>().unwrap(), Ensure::Present);
        assert_eq!("Absent".parse::<Ensure>().unwrap(), Ensure::Absent);
    }

    #[test]
    fn test_ensure_parse_rejects_other_values() {
        for value in ["present", "ABSENT", "", "Removed", " Present"] {
            let err = value.parse::<Ensure>().unwrap_err();
            assert_eq!(err, UnrecognizedEnsure(value.to_string()));
        }
    }

    #[test]
    fn test_status_serializes_as_list() {
        assert_eq!(serde_json::to_string(&Status::Success).unwrap(), "[0]");
        assert_eq!(serde_json::to_string(&Status::Failure).unwrap(), "[-1]");
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Failure.to_string(), "[-1]");
        assert_eq!(Status::from_bool(true), Status::Success);
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = ExecuteSummary::default();
        summary.add_result(&ApplyResult::Created);
        summary.add_result(&ApplyResult::Removed);
        summary.add_result(&ApplyResult::NoChange);

        assert_eq!(summary.total_changes(), 2);
        assert_eq!(summary.total(), 3);
    }
}

//! # Declarative
//!
//! A framework for desired-state resource providers.
//!
//! This crate provides the core abstractions behind the three verbs a
//! configuration engine drives a provider with: get the current state,
//! test it against the declared state, and set it.
//!
//! ## Core Concepts
//!
//! - **Resource**: Something with state that can be tested and converged
//! - **Ensure**: The declared presence of a resource (`Present`/`Absent`)
//! - **ExecutionPlan**: Ordered resources plus post-apply actions
//! - **Status**: The `[0]`/`[-1]` outcome reported back to the engine
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{ExecuteOptions, ExecutionPlan, NoRestart, execute, test_all};
//!
//! let mut plan = ExecutionPlan::new();
//! plan.add_resource(Box::new(my_resource));
//! plan.add_post_action("agent".into());
//!
//! if test_all(&plan.resources).is_err() {
//!     let summary = execute(plan, ExecuteOptions::default(), &NoRestart)?;
//!     println!("{} changes", summary.total_changes());
//! }
//! ```
//!
//! ## Provider Traits
//!
//! - [`ServiceControl`]: Restarts the service consuming applied resources
//!
//! This allows the crate to be used without hard dependencies on a
//! specific service manager.

pub mod context;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{ApplyContext, NoRestart, ServiceControl};
pub use executor::{execute, test_all};
pub use planner::ExecutionPlan;
pub use resource::{BoxedResource, Resource, ResourceExt};
pub use types::{
    ApplyResult, CommandOutput, Ensure, ExecuteOptions, ExecuteSummary, ResourceState, Status,
    UnrecognizedEnsure,
};

//! Execution planner - builds resource execution plans

use crate::resource::BoxedResource;

/// An ordered execution plan
pub struct ExecutionPlan {
    /// Resources, applied in insertion order
    pub resources: Vec<BoxedResource>,
    /// Post-apply actions (services to restart)
    pub post_actions: Vec<String>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
            post_actions: Vec::new(),
        }
    }

    /// Append a resource to the plan
    pub fn add_resource(&mut self, resource: BoxedResource) {
        self.resources.push(resource);
    }

    /// Add a post-apply action
    pub fn add_post_action(&mut self, action: String) {
        if !self.post_actions.contains(&action) {
            self.post_actions.push(action);
        }
    }

    /// Total number of resources in the plan
    pub fn total_resources(&self) -> usize {
        self.resources.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Default for ExecutionPlan {
    fn default() -> Self {
        Self::new()
    }
}

//! Execution engine - tests and applies resources sequentially, failing fast

use crate::context::{ApplyContext, ServiceControl};
use crate::planner::ExecutionPlan;
use crate::resource::BoxedResource;
use crate::types::{ExecuteOptions, ExecuteSummary};
use anyhow::{Context, Result, bail};

/// Test resources in order, stopping at the first one out of its desired state
///
/// A resource that cannot be tested counts as out of state.
pub fn test_all(resources: &[BoxedResource]) -> Result<()> {
    for resource in resources {
        let in_state = resource
            .test()
            .with_context(|| format!("Failed to test {}", resource.id()))?;
        if !in_state {
            bail!("{} is not in its desired state", resource.id());
        }
        log::debug!("{} is in its desired state", resource.id());
    }
    Ok(())
}

/// Execute a plan
///
/// Resources are applied in order. The first error aborts
/// the run; changes already made are kept. Post actions run only after every
/// resource applied, and only outside dry runs.
///
/// # Arguments
/// * `plan` - The execution plan to run
/// * `opts` - Execution options (dry_run, verbose)
/// * `service` - Service control used for post-apply restarts
pub fn execute<S>(plan: ExecutionPlan, opts: ExecuteOptions, service: &S) -> Result<ExecuteSummary>
where
    S: ServiceControl + ?Sized,
{
    let mut summary = ExecuteSummary::default();
    let mut ctx = ApplyContext::new(opts.dry_run, opts.verbose);

    for resource in &plan.resources {
        log::info!("{}", resource.description());
        let result = resource
            .apply(&mut ctx)
            .with_context(|| format!("Failed to apply {}", resource.id()))?;
        summary.add_result(&result);
    }

    if opts.dry_run {
        for action in &plan.post_actions {
            log::info!("Would restart {}", action);
        }
        return Ok(summary);
    }

    for action in &plan.post_actions {
        let output = service
            .restart(action)
            .with_context(|| format!("Failed to restart {}", action))?;
        if !output.success {
            bail!(
                "Error restarting {}: {}",
                action,
                output.stderr_str().trim()
            );
        }
        summary.post_actions += 1;
    }

    Ok(summary)
}

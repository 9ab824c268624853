use cantata_artifact::FsStore;
use cantata_run::{RunState, StepStatus};
use cantata_workflow::{Step, Workflow};

/// Compute the steps eligible to run right now.
///
/// A step qualifies when it is still pending and every artifact named in
/// its `inputs` is registered for the run; a step with no inputs qualifies
/// as soon as it is pending. Steps are returned in declared workflow order.
/// The computation is recomputed fresh on every call and has no memory
/// across ticks.
pub fn find_runnable_steps<'a>(
  workflow: &'a Workflow,
  state: &RunState,
  artifacts: &FsStore,
) -> Vec<&'a Step> {
  workflow
    .steps
    .iter()
    .filter(|step| state.status(&step.name) == Some(StepStatus::Pending))
    .filter(|step| step.inputs.iter().all(|input| artifacts.exists(input)))
    .collect()
}

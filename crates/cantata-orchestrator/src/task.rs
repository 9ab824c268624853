use cantata_run::{RunState, StepStatus};
use cantata_workflow::{Step, Workflow};
use serde::{Deserialize, Serialize};

/// A human-gated step whose inputs are satisfied, projected for display
/// and completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitingTask {
  /// Step name; also the key used to resolve the step on completion.
  pub name: String,
  pub description: String,
  pub prompt: String,
  pub inputs: Vec<String>,
  pub output: String,
}

impl WaitingTask {
  fn from_step(step: &Step) -> Self {
    Self {
      name: step.name.clone(),
      description: step.description.clone(),
      prompt: step.prompt.clone(),
      inputs: step.inputs.clone(),
      output: step.output.clone(),
    }
  }
}

/// Project the steps currently gated at `ready` into waiting tasks, in
/// declared workflow order. Read-only.
pub(crate) fn waiting_tasks(workflow: &Workflow, state: &RunState) -> Vec<WaitingTask> {
  workflow
    .steps
    .iter()
    .filter(|step| state.status(&step.name) == Some(StepStatus::Ready))
    .map(WaitingTask::from_step)
    .collect()
}

use std::collections::HashMap;

use cantata_workflow::Workflow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a single step within a run.
///
/// `Pending` steps may become `Ready` (human steps) or `Succeeded` (tool
/// steps) once their inputs exist; `Ready` steps succeed through task
/// completion. `Failed` is terminal and kept for state-document
/// compatibility; no engine path currently produces it. Statuses never
/// regress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
  Pending,
  Ready,
  Succeeded,
  Failed,
}

/// Per-step state as stored in the run document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepState {
  pub status: StepStatus,
}

/// The persisted state of one workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
  /// Stable run identifier; doubles as the storage directory name.
  pub id: String,
  /// Human-facing display name, independent of the id.
  pub name: String,
  /// Workflow this run was created from, re-resolved on every load.
  pub workflow_name: String,
  pub created_at: DateTime<Utc>,
  /// One entry per workflow step, keyed by step name. The key set is fixed
  /// at creation and never changes for the lifetime of the run.
  pub step_states: HashMap<String, StepState>,
}

impl RunState {
  /// Create a fresh state for `workflow` with every step pending.
  pub fn new(workflow: &Workflow, id: impl Into<String>, name: impl Into<String>) -> Self {
    let step_states = workflow
      .steps
      .iter()
      .map(|step| {
        (
          step.name.clone(),
          StepState {
            status: StepStatus::Pending,
          },
        )
      })
      .collect();

    Self {
      id: id.into(),
      name: name.into(),
      workflow_name: workflow.id.clone(),
      created_at: Utc::now(),
      step_states,
    }
  }

  /// Current status of a step, if the step exists in this run.
  pub fn status(&self, step_name: &str) -> Option<StepStatus> {
    self.step_states.get(step_name).map(|s| s.status)
  }

  /// Record a new status for a step.
  pub fn set_status(&mut self, step_name: &str, status: StepStatus) {
    self
      .step_states
      .insert(step_name.to_string(), StepState { status });
  }

  /// Whether every step has finished (succeeded or failed). Pending and
  /// ready steps both count as unfinished.
  pub fn all_steps_completed(&self) -> bool {
    self
      .step_states
      .values()
      .all(|s| matches!(s.status, StepStatus::Succeeded | StepStatus::Failed))
  }
}

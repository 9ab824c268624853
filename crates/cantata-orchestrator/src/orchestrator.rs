//! Tick-driven run orchestration.
//!
//! Each tick is a bounded fork-join: runnable tool steps are dispatched as
//! concurrent units, each returning a tagged outcome, and the outcomes are
//! applied to the run state only after every unit has joined. Human steps
//! are gated synchronously before the fan-out. There is no cross-tick
//! concurrency; callers are expected to keep at most one tick in flight
//! per run.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use cantata_artifact::{ArtifactError, FsStore};
use cantata_registry::WorkflowRegistry;
use cantata_run::{RunState, RunStore, RunSummary, StepStatus};
use cantata_workflow::{Handler, Step, Workflow};
use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::error::OrchestratorError;
use crate::resolver::find_runnable_steps;
use crate::task::{WaitingTask, waiting_tasks};

/// Outcome of one dispatched tool step.
enum StepOutcome {
  Succeeded { step: Step },
  Failed { step: Step, error: ArtifactError },
}

/// Drives workflow runs one tick at a time.
pub struct Orchestrator {
  runs: RunStore,
}

impl Orchestrator {
  pub fn new(runs: RunStore) -> Self {
    Self { runs }
  }

  /// The underlying run store.
  pub fn runs(&self) -> &RunStore {
    &self.runs
  }

  /// Initialize a new run with every step pending and persist it.
  pub async fn create_run(
    &self,
    workflow: &Workflow,
    run_id: &str,
    display_name: &str,
  ) -> Result<(), OrchestratorError> {
    let state = RunState::new(workflow, run_id, display_name);
    self.runs.save(&state).await?;
    info!(run_id, workflow = %workflow.id, "created run");
    Ok(())
  }

  /// Execute one tick: run every runnable tool step concurrently and gate
  /// runnable human steps at `ready`. Returns whether the run is complete.
  ///
  /// A `false` return with no error means either a human gate is holding
  /// the run or no step can make progress; callers distinguish the two by
  /// inspecting step states.
  #[instrument(name = "tick", skip(self, workflow), fields(workflow = %workflow.id))]
  pub async fn tick(&self, workflow: &Workflow, run_id: &str) -> Result<bool, OrchestratorError> {
    let mut state = self.runs.load(run_id).await?;

    if state.all_steps_completed() {
      return Ok(true);
    }

    let artifacts = Arc::new(self.runs.artifacts(run_id).await?);
    let runnable = find_runnable_steps(workflow, &state, &artifacts);
    if runnable.is_empty() {
      return Ok(false);
    }

    let mut tool_steps = Vec::new();
    for step in runnable {
      match step.handler {
        Handler::Human => {
          info!(step = %step.name, "step waiting on human task");
          state.set_status(&step.name, StepStatus::Ready);
        }
        Handler::Tool => tool_steps.push(step.clone()),
      }
    }

    let handles: Vec<_> = tool_steps
      .into_iter()
      .map(|step| {
        let artifacts = Arc::clone(&artifacts);
        tokio::spawn(async move { execute_tool_step(step, &artifacts).await })
      })
      .collect();

    let mut first_error = None;
    for joined in join_all(handles).await {
      match joined? {
        StepOutcome::Succeeded { step } => {
          info!(step = %step.name, output = %step.output, "step succeeded");
          state.set_status(&step.name, StepStatus::Succeeded);
        }
        StepOutcome::Failed { step, error } => {
          // The step stays pending so the next tick re-resolves and
          // retries it.
          warn!(step = %step.name, error = %error, "step failed, left pending");
          if first_error.is_none() {
            first_error = Some(error);
          }
        }
      }
    }

    // A failed unit aborts the tick without persisting, discarding the
    // in-memory progress of its successful siblings for this tick.
    if let Some(error) = first_error {
      return Err(error.into());
    }

    self.runs.save(&state).await?;
    Ok(state.all_steps_completed())
  }

  /// List the run's human tasks currently gated at `ready`.
  pub async fn list_waiting_tasks(
    &self,
    workflow: &Workflow,
    run_id: &str,
  ) -> Result<Vec<WaitingTask>, OrchestratorError> {
    let state = self.runs.load(run_id).await?;
    Ok(waiting_tasks(workflow, &state))
  }

  /// Aggregate waiting tasks for a batch of runs, keyed by run id.
  ///
  /// Workflows are resolved once per distinct name across the batch.
  /// Summaries with a blank id or workflow name are skipped.
  pub async fn list_waiting_tasks_by_run<R: WorkflowRegistry>(
    &self,
    registry: &R,
    runs: &[RunSummary],
  ) -> Result<HashMap<String, Vec<WaitingTask>>, OrchestratorError> {
    let mut workflows: HashMap<String, Workflow> = HashMap::new();
    let mut tasks_by_run = HashMap::new();

    for run in runs {
      if run.id.is_empty() || run.workflow_name.is_empty() {
        continue;
      }

      if !workflows.contains_key(&run.workflow_name) {
        let (workflow, _) = registry.get(&run.workflow_name).await?;
        workflows.insert(run.workflow_name.clone(), workflow);
      }
      let workflow = &workflows[&run.workflow_name];

      let tasks = self.list_waiting_tasks(workflow, &run.id).await?;
      tasks_by_run.insert(run.id.clone(), tasks);
    }

    Ok(tasks_by_run)
  }

  /// Complete the waiting task at `index`: produce its artifact and mark
  /// the step succeeded.
  ///
  /// The index is positional into the run's current waiting list, not a
  /// stable identifier; callers should re-fetch the list immediately
  /// before completing.
  pub async fn complete_task(
    &self,
    workflow: &Workflow,
    run_id: &str,
    index: usize,
  ) -> Result<(), OrchestratorError> {
    let mut state = self.runs.load(run_id).await?;
    let tasks = waiting_tasks(workflow, &state);

    let Some(task) = tasks.get(index) else {
      return Err(OrchestratorError::InvalidTaskIndex {
        index,
        len: tasks.len(),
      });
    };

    let step = workflow
      .step(&task.name)
      .ok_or_else(|| OrchestratorError::UnknownStep(task.name.clone()))?;

    let artifacts = self.runs.artifacts(run_id).await?;
    let content = step_content(step, &artifacts).await?;
    if !step.output.is_empty() {
      artifacts.write(&step.output, &content).await?;
    }

    state.set_status(&step.name, StepStatus::Succeeded);
    self.runs.save(&state).await?;
    info!(run_id, step = %step.name, "task completed");
    Ok(())
  }
}

/// Compute the content a step produces: the concatenation of its inputs in
/// declared order, or the inline literal when it has none.
async fn step_content(step: &Step, artifacts: &FsStore) -> Result<Bytes, ArtifactError> {
  if step.inputs.is_empty() {
    return Ok(Bytes::from(step.content.clone().into_bytes()));
  }

  let contents = artifacts.read_many(&step.inputs).await?;
  let mut combined = BytesMut::new();
  // Declared input order, not map order.
  for input in &step.inputs {
    if let Some(content) = contents.get(input) {
      combined.extend_from_slice(content);
    }
  }
  Ok(combined.freeze())
}

/// Run one tool step: compute its content and write its output artifact.
/// The run state is never touched here; failures are reported through the
/// outcome and applied after the join.
async fn execute_tool_step(step: Step, artifacts: &FsStore) -> StepOutcome {
  let content = match step_content(&step, artifacts).await {
    Ok(content) => content,
    Err(error) => return StepOutcome::Failed { step, error },
  };

  // An empty output name means the step produces nothing.
  if !step.output.is_empty()
    && let Err(error) = artifacts.write(&step.output, &content).await
  {
    return StepOutcome::Failed { step, error };
  }

  StepOutcome::Succeeded { step }
}

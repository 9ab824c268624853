use thiserror::Error;

/// Errors surfaced by run orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
  /// Task index outside the current waiting list.
  #[error("no waiting task at index {index} (run has {len} waiting tasks)")]
  InvalidTaskIndex { index: usize, len: usize },

  /// A waiting task names a step missing from the workflow definition.
  #[error("step not found in workflow: {0}")]
  UnknownStep(String),

  #[error(transparent)]
  Run(#[from] cantata_run::RunError),

  #[error(transparent)]
  Artifact(#[from] cantata_artifact::ArtifactError),

  #[error(transparent)]
  Registry(#[from] cantata_registry::RegistryError),

  /// A dispatched step execution could not be joined.
  #[error("failed to join step execution: {0}")]
  Join(#[from] tokio::task::JoinError),
}

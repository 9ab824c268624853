use cantata_workflow::WorkflowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
  /// No definition exists for the requested id.
  #[error("workflow not found: {0}")]
  NotFound(String),

  /// A definition cannot be saved without an id.
  #[error("workflow id cannot be empty")]
  EmptyId,

  /// The definition exists but could not be decoded or encoded.
  #[error(transparent)]
  Workflow(#[from] WorkflowError),

  /// An I/O error occurred.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

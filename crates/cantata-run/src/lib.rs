//! Cantata Run
//!
//! Run state for workflow executions. Each run persists a single JSON
//! document (`state.json`) recording per-step statuses. Artifact existence
//! is deliberately not part of the document; it is rebuilt from the run's
//! artifacts directory when the run is loaded.

mod state;
mod store;

pub use state::{RunState, StepState, StepStatus};
pub use store::{RunStore, RunSummary};

use thiserror::Error;

/// Error type for run state persistence.
#[derive(Debug, Error)]
pub enum RunError {
  /// No state document exists for the run.
  #[error("run not found: {0}")]
  RunNotFound(String),

  /// The state document could not be encoded or decoded.
  #[error("invalid run state: {0}")]
  Parse(#[from] serde_json::Error),

  /// The state document could not be read or written.
  #[error("failed to persist run state: {0}")]
  Persistence(#[from] std::io::Error),
}

use std::path::PathBuf;

use async_trait::async_trait;
use cantata_workflow::Workflow;

use crate::error::RegistryError;

/// Lookup and listing of workflow definitions.
///
/// Loading must be deterministic and idempotent: the same id yields the
/// same definition until the underlying storage changes.
#[async_trait]
pub trait WorkflowRegistry: Send + Sync {
  /// Load a workflow by id, returning it with its source location.
  async fn get(&self, id: &str) -> Result<(Workflow, PathBuf), RegistryError>;

  /// List every available workflow definition.
  async fn list(&self) -> Result<Vec<Workflow>, RegistryError>;

  /// Persist a workflow definition under its id.
  async fn save(&self, workflow: &Workflow) -> Result<(), RegistryError>;
}

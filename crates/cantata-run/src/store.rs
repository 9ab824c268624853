use std::path::{Path, PathBuf};

use cantata_artifact::{ArtifactError, FsStore};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::warn;

use crate::{RunError, RunState};

/// Summary of a run as returned by [`RunStore::list`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
  pub id: String,
  pub name: String,
  pub workflow_name: String,
}

/// On-disk layout and persistence for runs.
///
/// Each run owns one directory under the store root:
///
/// ```text
/// {root}/
/// └── {run_id}/
///     ├── state.json
///     └── artifacts/
/// ```
pub struct RunStore {
  root: PathBuf,
}

impl RunStore {
  /// Create a store over the given root directory.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// The directory runs are stored in.
  pub fn root(&self) -> &Path {
    &self.root
  }

  fn run_dir(&self, run_id: &str) -> PathBuf {
    self.root.join(run_id)
  }

  fn state_path(&self, run_id: &str) -> PathBuf {
    self.run_dir(run_id).join("state.json")
  }

  /// Directory holding the run's artifacts.
  pub fn artifacts_dir(&self, run_id: &str) -> PathBuf {
    self.run_dir(run_id).join("artifacts")
  }

  /// Open the run's artifact store, scanning existing artifacts into its
  /// registry.
  pub async fn artifacts(&self, run_id: &str) -> Result<FsStore, ArtifactError> {
    FsStore::open(self.artifacts_dir(run_id)).await
  }

  /// Persist a run state document, creating the run directory if needed.
  pub async fn save(&self, state: &RunState) -> Result<(), RunError> {
    let dir = self.run_dir(&state.id);
    fs::create_dir_all(&dir).await?;

    let data = serde_json::to_vec_pretty(state)?;
    fs::write(self.state_path(&state.id), data).await?;
    Ok(())
  }

  /// Load a run state document.
  pub async fn load(&self, run_id: &str) -> Result<RunState, RunError> {
    let path = self.state_path(run_id);
    let data = match fs::read(&path).await {
      Ok(data) => data,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        return Err(RunError::RunNotFound(run_id.to_string()));
      }
      Err(e) => return Err(e.into()),
    };

    Ok(serde_json::from_slice(&data)?)
  }

  /// List all runs in the store, sorted by id. Entries whose state document
  /// cannot be read are skipped rather than failing the whole listing.
  pub async fn list(&self) -> Result<Vec<RunSummary>, RunError> {
    let mut entries = match fs::read_dir(&self.root).await {
      Ok(entries) => entries,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(e.into()),
    };

    let mut summaries = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
      if !entry.path().is_dir() {
        continue;
      }
      let Some(run_id) = entry.file_name().to_str().map(str::to_string) else {
        continue;
      };

      match self.load(&run_id).await {
        Ok(state) => summaries.push(RunSummary {
          id: state.id,
          name: state.name,
          workflow_name: state.workflow_name,
        }),
        Err(e) => warn!(run_id = %run_id, error = %e, "skipping unreadable run"),
      }
    }

    summaries.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(summaries)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::StepStatus;
  use cantata_workflow::{Step, Workflow};

  fn sample_workflow() -> Workflow {
    Workflow {
      id: "wf".to_string(),
      steps: vec![
        Step {
          name: "first".to_string(),
          ..Step::default()
        },
        Step {
          name: "second".to_string(),
          ..Step::default()
        },
      ],
      ..Workflow::default()
    }
  }

  #[tokio::test]
  async fn save_then_load_round_trips() {
    let temp = tempfile::tempdir().unwrap();
    let store = RunStore::new(temp.path().join("runs"));

    let mut state = RunState::new(&sample_workflow(), "run-1", "Run One");
    state.set_status("first", StepStatus::Succeeded);
    store.save(&state).await.unwrap();

    let loaded = store.load("run-1").await.unwrap();
    assert_eq!(loaded, state);
  }

  #[tokio::test]
  async fn load_missing_run_is_run_not_found() {
    let temp = tempfile::tempdir().unwrap();
    let store = RunStore::new(temp.path().join("runs"));

    let err = store.load("absent").await.unwrap_err();
    assert!(matches!(err, RunError::RunNotFound(id) if id == "absent"));
  }

  #[tokio::test]
  async fn load_malformed_document_is_a_parse_error() {
    let temp = tempfile::tempdir().unwrap();
    let store = RunStore::new(temp.path().join("runs"));

    let dir = temp.path().join("runs").join("broken");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("state.json"), "not json").unwrap();

    assert!(matches!(
      store.load("broken").await.unwrap_err(),
      RunError::Parse(_)
    ));
  }

  #[tokio::test]
  async fn list_returns_summaries_and_skips_unreadable_entries() {
    let temp = tempfile::tempdir().unwrap();
    let store = RunStore::new(temp.path().join("runs"));

    let workflow = sample_workflow();
    store
      .save(&RunState::new(&workflow, "run-b", "B"))
      .await
      .unwrap();
    store
      .save(&RunState::new(&workflow, "run-a", "A"))
      .await
      .unwrap();

    let broken = temp.path().join("runs").join("broken");
    std::fs::create_dir_all(&broken).unwrap();
    std::fs::write(broken.join("state.json"), "{").unwrap();

    let summaries = store.list().await.unwrap();
    let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["run-a", "run-b"]);
    assert_eq!(summaries[0].workflow_name, "wf");
  }

  #[tokio::test]
  async fn list_missing_root_is_empty() {
    let temp = tempfile::tempdir().unwrap();
    let store = RunStore::new(temp.path().join("nope"));
    assert!(store.list().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn artifacts_dir_is_under_the_run_dir() {
    let temp = tempfile::tempdir().unwrap();
    let store = RunStore::new(temp.path().join("runs"));

    let dir = store.artifacts_dir("run-1");
    assert!(dir.ends_with("runs/run-1/artifacts"));

    let artifacts = store.artifacts("run-1").await.unwrap();
    assert!(artifacts.list().is_empty());
  }
}

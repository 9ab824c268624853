use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cantata_workflow::Workflow;
use tokio::fs;

use crate::error::RegistryError;
use crate::registry::WorkflowRegistry;

/// Filesystem-based workflow registry.
///
/// Definitions are TOML files in a single directory:
///
/// ```text
/// {root}/
/// ├── release-notes.toml
/// └── onboarding.toml
/// ```
///
/// The file stem is the workflow id.
pub struct FsWorkflowRegistry {
  root: PathBuf,
}

impl FsWorkflowRegistry {
  /// Create a registry over the given directory.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// The directory definitions are stored in.
  pub fn root(&self) -> &Path {
    &self.root
  }

  fn path_for(&self, id: &str) -> PathBuf {
    self.root.join(format!("{id}.toml"))
  }
}

#[async_trait]
impl WorkflowRegistry for FsWorkflowRegistry {
  async fn get(&self, id: &str) -> Result<(Workflow, PathBuf), RegistryError> {
    if id.is_empty() {
      return Err(RegistryError::EmptyId);
    }

    let path = self.path_for(id);
    let source = match fs::read_to_string(&path).await {
      Ok(source) => source,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        return Err(RegistryError::NotFound(id.to_string()));
      }
      Err(e) => return Err(e.into()),
    };

    let workflow = Workflow::from_toml(id, &source)?;
    Ok((workflow, path))
  }

  async fn list(&self) -> Result<Vec<Workflow>, RegistryError> {
    let mut entries = match fs::read_dir(&self.root).await {
      Ok(entries) => entries,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(e.into()),
    };

    let mut workflows = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
      let path = entry.path();
      if path.is_dir() || path.extension().and_then(|e| e.to_str()) != Some("toml") {
        continue;
      }

      let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
        continue;
      };

      let (workflow, _) = self.get(id).await?;
      workflows.push(workflow);
    }

    workflows.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(workflows)
  }

  async fn save(&self, workflow: &Workflow) -> Result<(), RegistryError> {
    if workflow.id.is_empty() {
      return Err(RegistryError::EmptyId);
    }

    fs::create_dir_all(&self.root).await?;
    let encoded = workflow.to_toml()?;
    fs::write(self.path_for(&workflow.id), encoded).await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use cantata_workflow::Step;

  fn sample_workflow(id: &str) -> Workflow {
    Workflow {
      id: id.to_string(),
      display_name: "Sample".to_string(),
      description: "A sample workflow".to_string(),
      steps: vec![Step {
        name: "only".to_string(),
        content: "data".to_string(),
        output: "out".to_string(),
        ..Step::default()
      }],
      ..Workflow::default()
    }
  }

  #[tokio::test]
  async fn save_then_get_round_trips() {
    let temp = tempfile::tempdir().unwrap();
    let registry = FsWorkflowRegistry::new(temp.path().join("workflows"));

    let workflow = sample_workflow("sample");
    registry.save(&workflow).await.unwrap();

    let (loaded, path) = registry.get("sample").await.unwrap();
    assert_eq!(loaded, workflow);
    assert!(path.ends_with("sample.toml"));
  }

  #[tokio::test]
  async fn get_missing_workflow_is_not_found() {
    let temp = tempfile::tempdir().unwrap();
    let registry = FsWorkflowRegistry::new(temp.path());

    let err = registry.get("missing").await.unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(id) if id == "missing"));
  }

  #[tokio::test]
  async fn get_empty_id_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let registry = FsWorkflowRegistry::new(temp.path());

    assert!(matches!(
      registry.get("").await.unwrap_err(),
      RegistryError::EmptyId
    ));
  }

  #[tokio::test]
  async fn list_returns_toml_definitions_sorted_by_id() {
    let temp = tempfile::tempdir().unwrap();
    let registry = FsWorkflowRegistry::new(temp.path().join("workflows"));

    registry.save(&sample_workflow("beta")).await.unwrap();
    registry.save(&sample_workflow("alpha")).await.unwrap();
    std::fs::write(registry.root().join("notes.txt"), "ignored").unwrap();

    let workflows = registry.list().await.unwrap();
    let ids: Vec<&str> = workflows.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["alpha", "beta"]);
  }

  #[tokio::test]
  async fn list_missing_directory_is_empty() {
    let temp = tempfile::tempdir().unwrap();
    let registry = FsWorkflowRegistry::new(temp.path().join("nope"));

    assert!(registry.list().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn save_empty_id_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let registry = FsWorkflowRegistry::new(temp.path());

    let workflow = sample_workflow("");
    assert!(matches!(
      registry.save(&workflow).await.unwrap_err(),
      RegistryError::EmptyId
    ));
  }
}

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;
use tokio::fs;

use crate::ArtifactError;

/// Filesystem-backed artifact store for one run.
///
/// Artifacts are flat files at `{dir}/{name}`. The store keeps a
/// name -> path registry behind a single mutex; concurrent step executions
/// within one tick share the store and register their outputs through it.
pub struct FsStore {
  dir: PathBuf,
  registry: Mutex<HashMap<String, PathBuf>>,
}

impl FsStore {
  /// Open the store rooted at `dir`, scanning existing artifacts into the
  /// registry. A missing directory is an empty store, not an error.
  pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, ArtifactError> {
    let dir = dir.into();
    let mut registry = HashMap::new();

    match fs::read_dir(&dir).await {
      Ok(mut entries) => {
        while let Some(entry) = entries.next_entry().await? {
          let path = entry.path();
          if path.is_file()
            && let Some(name) = path.file_name().and_then(|n| n.to_str())
          {
            registry.insert(name.to_string(), path.clone());
          }
        }
      }
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
      Err(e) => return Err(e.into()),
    }

    Ok(Self {
      dir,
      registry: Mutex::new(registry),
    })
  }

  /// The directory this store is rooted at.
  pub fn dir(&self) -> &Path {
    &self.dir
  }

  /// Whether `name` is registered for this run.
  pub fn exists(&self, name: &str) -> bool {
    self.registry().contains_key(name)
  }

  /// All registered artifact names, sorted.
  pub fn list(&self) -> Vec<String> {
    let mut names: Vec<String> = self.registry().keys().cloned().collect();
    names.sort();
    names
  }

  /// Read one artifact. Fails with [`ArtifactError::NotFound`] if the name
  /// was never registered.
  pub async fn read(&self, name: &str) -> Result<Bytes, ArtifactError> {
    let path = self
      .registry()
      .get(name)
      .cloned()
      .ok_or_else(|| ArtifactError::NotFound(name.to_string()))?;
    let data = fs::read(&path).await?;
    Ok(Bytes::from(data))
  }

  /// Read a batch of artifacts into a name -> content map, failing on the
  /// first missing name.
  pub async fn read_many(
    &self,
    names: &[String],
  ) -> Result<HashMap<String, Bytes>, ArtifactError> {
    let mut contents = HashMap::with_capacity(names.len());
    for name in names {
      contents.insert(name.clone(), self.read(name).await?);
    }
    Ok(contents)
  }

  /// Write (or overwrite) an artifact, creating the directory if needed,
  /// and register it.
  pub async fn write(&self, name: &str, content: impl AsRef<[u8]>) -> Result<(), ArtifactError> {
    fs::create_dir_all(&self.dir).await?;
    let path = self.dir.join(name);
    fs::write(&path, content.as_ref()).await?;
    self.registry().insert(name.to_string(), path);
    Ok(())
  }

  fn registry(&self) -> MutexGuard<'_, HashMap<String, PathBuf>> {
    self.registry.lock().unwrap_or_else(|e| e.into_inner())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn open_missing_directory_is_empty() {
    let temp = tempfile::tempdir().unwrap();
    let store = FsStore::open(temp.path().join("artifacts")).await.unwrap();

    assert!(store.list().is_empty());
    assert!(!store.exists("anything"));
  }

  #[tokio::test]
  async fn write_registers_and_read_returns_content() {
    let temp = tempfile::tempdir().unwrap();
    let store = FsStore::open(temp.path().join("artifacts")).await.unwrap();

    store.write("report", "hello").await.unwrap();

    assert!(store.exists("report"));
    assert_eq!(store.read("report").await.unwrap(), Bytes::from("hello"));
  }

  #[tokio::test]
  async fn open_scans_existing_files() {
    let temp = tempfile::tempdir().unwrap();
    let dir = temp.path().join("artifacts");

    {
      let store = FsStore::open(&dir).await.unwrap();
      store.write("a", "1").await.unwrap();
      store.write("b", "2").await.unwrap();
    }

    let reopened = FsStore::open(&dir).await.unwrap();
    assert_eq!(reopened.list(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(reopened.read("b").await.unwrap(), Bytes::from("2"));
  }

  #[tokio::test]
  async fn read_unregistered_name_is_not_found() {
    let temp = tempfile::tempdir().unwrap();
    let store = FsStore::open(temp.path().join("artifacts")).await.unwrap();

    let err = store.read("missing").await.unwrap_err();
    assert!(matches!(err, ArtifactError::NotFound(name) if name == "missing"));
  }

  #[tokio::test]
  async fn read_many_fails_on_first_missing_name() {
    let temp = tempfile::tempdir().unwrap();
    let store = FsStore::open(temp.path().join("artifacts")).await.unwrap();
    store.write("present", "x").await.unwrap();

    let names = vec!["present".to_string(), "absent".to_string()];
    let err = store.read_many(&names).await.unwrap_err();
    assert!(matches!(err, ArtifactError::NotFound(name) if name == "absent"));
  }

  #[tokio::test]
  async fn overwrite_replaces_content() {
    let temp = tempfile::tempdir().unwrap();
    let store = FsStore::open(temp.path().join("artifacts")).await.unwrap();

    store.write("draft", "v1").await.unwrap();
    store.write("draft", "v2").await.unwrap();

    assert_eq!(store.read("draft").await.unwrap(), Bytes::from("v2"));
    assert_eq!(store.list(), vec!["draft".to_string()]);
  }

  #[tokio::test]
  async fn empty_content_round_trips() {
    let temp = tempfile::tempdir().unwrap();
    let store = FsStore::open(temp.path().join("artifacts")).await.unwrap();

    store.write("empty", "").await.unwrap();

    assert!(store.exists("empty"));
    assert_eq!(store.read("empty").await.unwrap(), Bytes::new());
  }
}

//! Cantata Artifact
//!
//! Per-run artifact storage. Artifacts are named byte strings produced by
//! workflow steps, stored as flat files under a run's artifacts directory.
//!
//! Opening a store scans the directory into an in-memory registry. After
//! open, the registry (not the filesystem) answers existence and listing
//! queries, and every write registers its name as the file lands on disk.

mod fs;

pub use fs::FsStore;

use thiserror::Error;

/// Error type for artifact storage operations.
#[derive(Debug, Error)]
pub enum ArtifactError {
  /// The requested artifact was never written for this run.
  #[error("artifact not found: {0}")]
  NotFound(String),

  /// An I/O error occurred.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

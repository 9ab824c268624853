use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
  /// The definition could not be decoded.
  #[error("invalid workflow definition: {0}")]
  Parse(#[from] toml::de::Error),

  /// The definition could not be encoded.
  #[error("failed to serialize workflow definition: {0}")]
  Serialize(#[from] toml::ser::Error),
}

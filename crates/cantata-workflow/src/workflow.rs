use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::step::Step;

/// A workflow definition.
///
/// Step names must be unique within a workflow; the engine treats this as a
/// precondition and does not validate it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
  /// Identifier assigned by the loading layer, not part of the serialized
  /// definition.
  #[serde(skip)]
  pub id: String,
  #[serde(default)]
  pub display_name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub message: String,
  #[serde(default)]
  pub steps: Vec<Step>,
}

impl Workflow {
  /// Parse a TOML definition, assigning the given id.
  pub fn from_toml(id: impl Into<String>, source: &str) -> Result<Self, WorkflowError> {
    let mut workflow: Workflow = toml::from_str(source)?;
    workflow.id = id.into();
    Ok(workflow)
  }

  /// Encode the definition as TOML. The id is not serialized.
  pub fn to_toml(&self) -> Result<String, WorkflowError> {
    Ok(toml::to_string_pretty(self)?)
  }

  /// Look up a step by name.
  pub fn step(&self, name: &str) -> Option<&Step> {
    self.steps.iter().find(|step| step.name == name)
  }
}

use serde::{Deserialize, Deserializer, Serialize};

/// How a step is executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handler {
  /// Executed automatically by the engine during a tick.
  #[default]
  Tool,
  /// Gated at `ready` until a person completes the task.
  Human,
}

/// A single step in a workflow definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
  pub name: String,
  #[serde(default)]
  pub description: String,
  /// Instructions shown to a person while a human step is waiting.
  #[serde(default)]
  pub prompt: String,
  #[serde(default, deserialize_with = "handler_or_default")]
  pub handler: Handler,
  /// Inline literal used as the produced artifact when `inputs` is empty.
  #[serde(default)]
  pub content: String,
  /// Artifact names this step depends on. Order is significant: the
  /// produced content is the concatenation of these inputs in this order.
  #[serde(default)]
  pub inputs: Vec<String>,
  /// Artifact name this step produces. Empty for steps that produce
  /// nothing.
  #[serde(default)]
  pub output: String,
}

/// Accepts `""` as the default handler, for definitions that spell the
/// handler out as an empty string rather than omitting the key.
fn handler_or_default<'de, D>(deserializer: D) -> Result<Handler, D::Error>
where
  D: Deserializer<'de>,
{
  let value = String::deserialize(deserializer)?;
  match value.as_str() {
    "" | "tool" => Ok(Handler::Tool),
    "human" => Ok(Handler::Human),
    other => Err(serde::de::Error::unknown_variant(other, &["tool", "human"])),
  }
}

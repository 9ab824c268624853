//! Cantata Workflow
//!
//! Workflow definition types for Cantata. A workflow is an ordered sequence
//! of named steps wired together by artifact names: each step consumes the
//! artifacts listed in `inputs` and produces the artifact named `output`.
//!
//! Definitions are TOML documents. The workflow id is assigned by the layer
//! that loads the definition (typically the file stem) and is not part of
//! the serialized form.

mod error;
mod step;
mod workflow;

pub use error::WorkflowError;
pub use step::{Handler, Step};
pub use workflow::Workflow;

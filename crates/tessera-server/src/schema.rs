use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tessera_inspect::FunctionReport;
use tessera_types::TypeDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
  Task,
  Graph,
}

/// The `user_state_snapshot` of a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateSnapshot {
  /// A task's own signature.
  Signature {
    input: IndexMap<String, TypeDescriptor>,
    output: TypeDescriptor,
  },
  /// A graph's state schema as computed by the assistant API.
  External(Value),
}

/// One entry of a schema listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
  pub name: String,
  pub docstring: Option<String>,
  pub source_file: Option<String>,
  pub user_state_snapshot: Option<StateSnapshot>,
  pub kind: SchemaKind,
  /// Why the entry could not be inspected.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl Schema {
  pub fn task(name: impl Into<String>, report: FunctionReport) -> Self {
    Self {
      name: name.into(),
      docstring: report.docstring,
      source_file: report.source_file,
      user_state_snapshot: Some(StateSnapshot::Signature {
        input: report.parameters,
        output: report.return_type,
      }),
      kind: SchemaKind::Task,
      error: report.error,
    }
  }

  pub fn graph(name: impl Into<String>, report: FunctionReport, state_schema: Value) -> Self {
    Self {
      name: name.into(),
      docstring: report.docstring,
      source_file: report.source_file,
      user_state_snapshot: Some(StateSnapshot::External(state_schema)),
      kind: SchemaKind::Graph,
      error: report.error,
    }
  }
}

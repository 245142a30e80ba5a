use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ConfigError;

/// Environment variable holding the task registry.
pub const TASKS_VAR: &str = "TASKS";
/// Environment variable holding the graph registry.
pub const GRAPHS_VAR: &str = "LANGSERVE_GRAPHS";

/// One registered task. Fields other than `source_file` are kept as given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskEntry {
  #[serde(default)]
  pub source_file: Option<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl TaskEntry {
  /// `<source_file>:<name>`. The task name doubles as the symbol to load
  /// from its file.
  pub fn locator(&self, name: &str) -> String {
    format!("{}:{}", self.source_file.as_deref().unwrap_or_default(), name)
  }
}

/// Task name → entry, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskRegistry(IndexMap<String, TaskEntry>);

impl TaskRegistry {
  pub fn get(&self, name: &str) -> Option<&TaskEntry> {
    self.0.get(name)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &TaskEntry)> {
    self.0.iter()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// The locator of a registered task.
  pub fn locator(&self, name: &str) -> Option<String> {
    self.get(name).map(|entry| entry.locator(name))
  }
}

/// Graph name → locator, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphRegistry(IndexMap<String, String>);

impl GraphRegistry {
  pub fn get(&self, name: &str) -> Option<&str> {
    self.0.get(name).map(String::as_str)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.0.contains_key(name)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
    self.0.iter()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// Everything a server serves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
  pub tasks: TaskRegistry,
  pub graphs: GraphRegistry,
}

impl Registry {
  /// Read [`TASKS_VAR`] and [`GRAPHS_VAR`]. Unset variables mean an empty
  /// registry.
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_vars(|var| std::env::var(var).ok())
  }

  /// Like [`Registry::from_env`], reading variables through `lookup`.
  pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
    let tasks = lookup(TASKS_VAR).unwrap_or_else(|| "{}".to_string());
    let graphs = lookup(GRAPHS_VAR).unwrap_or_else(|| "{}".to_string());
    Self::from_json(&tasks, &graphs)
  }

  pub fn from_json(tasks: &str, graphs: &str) -> Result<Self, ConfigError> {
    let registry = Self {
      tasks: parse(TASKS_VAR, tasks)?,
      graphs: parse(GRAPHS_VAR, graphs)?,
    };
    debug!(
      tasks = registry.tasks.len(),
      graphs = registry.graphs.len(),
      "registry loaded"
    );
    Ok(registry)
  }
}

fn parse<T: DeserializeOwned>(var: &str, text: &str) -> Result<T, ConfigError> {
  let text = if text.trim().is_empty() { "{}" } else { text };
  serde_json::from_str(text).map_err(|e| ConfigError::InvalidRegistry {
    var: var.to_string(),
    message: e.to_string(),
  })
}

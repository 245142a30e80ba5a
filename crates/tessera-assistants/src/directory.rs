use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tessera_config::GraphRegistry;

use crate::error::AssistantError;

/// An assistant as listed by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assistant {
  pub assistant_id: String,
  pub graph_id: String,
  /// Timestamp as sent by the API. ISO-8601 text orders chronologically.
  #[serde(default)]
  pub updated_at: String,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// Source of assistants and their state schemas.
#[async_trait]
pub trait AssistantDirectory: Send + Sync {
  /// List every assistant.
  async fn search(&self) -> Result<Vec<Assistant>, AssistantError>;

  /// The state schema computed for one assistant.
  async fn state_schema(&self, assistant_id: &str) -> Result<Value, AssistantError>;
}

/// The most recently updated assistant of every graph in `graphs`, newest
/// first. Assistants of unregistered graphs are skipped.
pub fn latest_per_graph(mut assistants: Vec<Assistant>, graphs: &GraphRegistry) -> Vec<Assistant> {
  assistants.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

  let mut seen = HashSet::new();
  assistants
    .into_iter()
    .filter(|a| graphs.contains(&a.graph_id) && seen.insert(a.graph_id.clone()))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use tessera_config::Registry;

  fn assistant(id: &str, graph: &str, updated_at: &str) -> Assistant {
    Assistant {
      assistant_id: id.to_string(),
      graph_id: graph.to_string(),
      updated_at: updated_at.to_string(),
      extra: Map::new(),
    }
  }

  #[test]
  fn test_latest_per_graph() {
    let registry = Registry::from_json("{}", r#"{"chat": "c.lua:g", "search": "s.lua:g"}"#).unwrap();
    let assistants = vec![
      assistant("a1", "chat", "2024-01-01T00:00:00Z"),
      assistant("a2", "chat", "2024-03-01T00:00:00Z"),
      assistant("b1", "search", "2024-02-01T00:00:00Z"),
      assistant("x1", "unregistered", "2025-01-01T00:00:00Z"),
    ];

    let latest = latest_per_graph(assistants, &registry.graphs);
    let ids: Vec<&str> = latest.iter().map(|a| a.assistant_id.as_str()).collect();
    assert_eq!(ids, vec!["a2", "b1"]);
  }

  #[test]
  fn test_extra_fields_survive() {
    let assistant: Assistant = serde_json::from_value(serde_json::json!({
      "assistant_id": "a1",
      "graph_id": "chat",
      "updated_at": "2024-01-01",
      "name": "Chat",
    }))
    .unwrap();
    assert_eq!(assistant.extra["name"], "Chat");
  }
}

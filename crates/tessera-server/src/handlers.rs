use std::collections::HashMap;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use futures::future::join_all;
use serde_json::{Map, Value, json};
use tessera_assistants::latest_per_graph;
use tessera_inspect::{FunctionReport, inspect};
use tessera_invoke::invoke;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::schema::Schema;
use crate::state::AppState;

pub async fn health() -> Json<Value> {
  Json(json!({ "status": "ok" }))
}

/// One schema per registered task, in registration order. A task that
/// cannot be inspected still gets an entry, with its `error` set.
#[instrument(skip_all)]
pub async fn task_schemas(State(state): State<AppState>) -> Result<Json<Vec<Schema>>, ApiError> {
  let registry = state.registry.clone();
  let cwd = state.cwd.clone();

  let schemas = tokio::task::spawn_blocking(move || {
    registry
      .tasks
      .iter()
      .map(|(name, entry)| Schema::task(name, inspect(&entry.locator(name), &cwd)))
      .collect::<Vec<_>>()
  })
  .await?;

  Ok(Json(schemas))
}

/// Run a task with the JSON object in the body as its arguments.
#[instrument(skip(state, body))]
pub async fn run_task(
  State(state): State<AppState>,
  Path(task_name): Path<String>,
  body: Bytes,
) -> Result<Json<Value>, ApiError> {
  let locator = state
    .registry
    .tasks
    .locator(&task_name)
    .ok_or_else(|| ApiError::TaskNotFound(task_name.clone()))?;
  let arguments = parse_arguments(&body)?;

  let cwd = state.cwd.clone();
  let result = tokio::task::spawn_blocking(move || invoke(&locator, &arguments, &cwd)).await??;

  info!(task = %task_name, "task completed");
  Ok(Json(json!({ "result": result })))
}

/// An empty body means no arguments.
fn parse_arguments(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return Ok(Map::new());
  }
  match serde_json::from_slice(body) {
    Ok(Value::Object(arguments)) => Ok(arguments),
    Ok(_) => Err(ApiError::InvalidBody(
      "request body must be a JSON object".to_string(),
    )),
    Err(e) => Err(ApiError::InvalidBody(format!("invalid JSON body: {e}"))),
  }
}

/// Registered graphs that have an assistant, newest assistant first. The
/// snapshot is the assistant's state schema; the rest comes from inspecting
/// the graph's locator.
#[instrument(skip_all)]
pub async fn graph_schemas(State(state): State<AppState>) -> Result<Json<Vec<Schema>>, ApiError> {
  let registry = state.registry.clone();
  let cwd = state.cwd.clone();
  let mut reports: HashMap<String, FunctionReport> = tokio::task::spawn_blocking(move || {
    registry
      .graphs
      .iter()
      .map(|(name, locator)| (name.clone(), inspect(locator, &cwd)))
      .collect()
  })
  .await?;

  let assistants = state.assistants.search().await?;
  let latest = latest_per_graph(assistants, &state.registry.graphs);

  let state_schemas = join_all(
    latest
      .iter()
      .map(|assistant| state.assistants.state_schema(&assistant.assistant_id)),
  )
  .await;

  let mut schemas = Vec::with_capacity(latest.len());
  for (assistant, state_schema) in latest.iter().zip(state_schemas) {
    let report = reports
      .remove(&assistant.graph_id)
      .unwrap_or_else(|| FunctionReport::failure(format!("graph '{}' is not registered", assistant.graph_id)));
    schemas.push(Schema::graph(&assistant.graph_id, report, state_schema?));
  }

  Ok(Json(schemas))
}

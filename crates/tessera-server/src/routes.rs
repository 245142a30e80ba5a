use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers::{graph_schemas, health, run_task, task_schemas};
use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/task-schemas", get(task_schemas))
    .route("/task/{task_name}", post(run_task))
    .route("/graph-schemas", get(graph_schemas))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

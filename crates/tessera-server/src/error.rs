use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tessera_assistants::AssistantError;
use tessera_invoke::InvokeError;
use thiserror::Error;

/// Errors returned by handlers. Rendered as `{"detail": message}`.
#[derive(Debug, Error)]
pub enum ApiError {
  /// No task is registered under the name.
  #[error("Task '{0}' not found")]
  TaskNotFound(String),

  /// The task is registered but its callable could not be resolved.
  #[error("{0}")]
  Unresolvable(String),

  #[error("Missing required parameter: {0}")]
  MissingParameter(String),

  /// The task raised while running.
  #[error("Error executing task: {0}")]
  Execution(String),

  /// The request body was not a JSON object.
  #[error("{0}")]
  InvalidBody(String),

  /// The assistant API failed.
  #[error("assistant API error: {0}")]
  Upstream(#[from] AssistantError),

  /// A blocking job panicked or was cancelled.
  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::TaskNotFound(_) | Self::Unresolvable(_) => StatusCode::NOT_FOUND,
      Self::MissingParameter(_) => StatusCode::BAD_REQUEST,
      Self::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
      Self::Upstream(_) => StatusCode::BAD_GATEWAY,
      Self::Execution(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<InvokeError> for ApiError {
  fn from(err: InvokeError) -> Self {
    match err {
      InvokeError::NotFound { message } => Self::Unresolvable(message),
      InvokeError::MissingParameter { name } => Self::MissingParameter(name),
      InvokeError::ExecutionError { message } => Self::Execution(message),
    }
  }
}

impl From<tokio::task::JoinError> for ApiError {
  fn from(err: tokio::task::JoinError) -> Self {
    Self::Internal(err.to_string())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_invoke_errors_map_to_status() {
    let missing: ApiError = InvokeError::MissingParameter { name: "x".into() }.into();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(missing.to_string(), "Missing required parameter: x");

    let failed: ApiError = InvokeError::ExecutionError { message: "boom".into() }.into();
    assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(failed.to_string(), "Error executing task: boom");

    let unresolved: ApiError = InvokeError::NotFound { message: "no such file".into() }.into();
    assert_eq!(unresolved.status(), StatusCode::NOT_FOUND);
  }

  #[test]
  fn test_task_not_found_message() {
    assert_eq!(ApiError::TaskNotFound("add".into()).to_string(), "Task 'add' not found");
  }
}

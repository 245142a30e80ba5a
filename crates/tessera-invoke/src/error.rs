use thiserror::Error;

/// Errors that can occur while invoking a callable.
#[derive(Debug, Error)]
pub enum InvokeError {
  /// The locator could not be resolved to a callable.
  #[error("{message}")]
  NotFound { message: String },

  /// A parameter with no default was not supplied.
  #[error("Missing required parameter: {name}")]
  MissingParameter { name: String },

  /// The callable raised, or its arguments or result could not be converted.
  #[error("{message}")]
  ExecutionError { message: String },
}

impl InvokeError {
  pub(crate) fn execution(message: impl Into<String>) -> Self {
    Self::ExecutionError {
      message: message.into(),
    }
  }
}

use thiserror::Error;

/// Errors that can occur while talking to the assistant API.
#[derive(Debug, Error)]
pub enum AssistantError {
  /// The base URL could not be parsed.
  #[error("invalid assistant API url '{url}': {message}")]
  InvalidUrl { url: String, message: String },

  /// The request failed or the body could not be decoded.
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The API answered with a non-success status.
  #[error("assistant API returned {status} for {url}")]
  Status { status: u16, url: String },

  /// The response decoded but lacked an expected field.
  #[error("assistant API response from {url} has no '{field}'")]
  MissingField { url: String, field: String },
}

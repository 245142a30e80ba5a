use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// A registry variable did not hold the expected JSON object.
  #[error("invalid {var}: {message}")]
  InvalidRegistry { var: String, message: String },
}

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while inspecting a callable.
#[derive(Debug, Error)]
pub enum InspectError {
  /// The locator could not be resolved.
  #[error(transparent)]
  Resolve(#[from] tessera_resolver::ResolveError),

  /// The debug interface could not describe the function.
  #[error("failed to read function info: {0}")]
  Debug(#[from] mlua::Error),

  /// The file the function was defined in could not be read back.
  #[error("failed to read source {}: {message}", path.display())]
  Source { path: PathBuf, message: String },
}

use std::path::PathBuf;
use std::sync::Arc;

use tessera_assistants::AssistantDirectory;
use tessera_config::Registry;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
  pub registry: Arc<Registry>,
  pub assistants: Arc<dyn AssistantDirectory>,
  /// Relative module paths resolve against this directory, and reported
  /// source files are relative to it.
  pub cwd: PathBuf,
}

impl AppState {
  pub fn new(registry: Registry, assistants: Arc<dyn AssistantDirectory>, cwd: impl Into<PathBuf>) -> Self {
    Self {
      registry: Arc::new(registry),
      assistants,
      cwd: cwd.into(),
    }
  }
}

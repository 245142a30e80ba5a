use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while resolving a locator.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// The locator has no `:` separator or no symbol after it.
  #[error("invalid locator '{locator}': expected <module-path>:<symbol>")]
  InvalidLocator { locator: String },

  /// The module file could not be read, compiled or executed.
  #[error("failed to load module {}: {message}", path.display())]
  ModuleLoad { path: PathBuf, message: String },

  /// The module loaded but does not define the symbol.
  #[error("symbol '{symbol}' not found in {}", path.display())]
  SymbolNotFound { symbol: String, path: PathBuf },

  /// The symbol exists but cannot be called.
  #[error("symbol '{symbol}' is a {kind}, not a callable")]
  NotCallable { symbol: String, kind: String },

  /// The Lua state itself failed outside of user code.
  #[error("lua error: {0}")]
  Lua(#[from] mlua::Error),
}

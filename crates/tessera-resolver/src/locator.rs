use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ResolveError;

/// A `<module-path>:<symbol>` reference.
///
/// The split point is the last colon, so module paths may themselves contain
/// colons (`C:\jobs\mod.lua:run`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
  pub module_path: PathBuf,
  pub symbol: String,
}

impl Locator {
  pub fn parse(text: &str) -> Result<Self, ResolveError> {
    let invalid = || ResolveError::InvalidLocator {
      locator: text.to_string(),
    };

    let (path, symbol) = text.rsplit_once(':').ok_or_else(invalid)?;
    if symbol.is_empty() {
      return Err(invalid());
    }

    Ok(Self {
      module_path: PathBuf::from(path),
      symbol: symbol.to_string(),
    })
  }

  /// Join a relative module path onto `cwd`.
  ///
  /// Drive-letter and UNC paths count as absolute on every platform so a
  /// locator written for Windows is never rewritten into `cwd/C:\...`.
  pub fn absolutize(&self, cwd: &Path) -> Self {
    if is_absolute(&self.module_path) {
      return self.clone();
    }
    Self {
      module_path: cwd.join(&self.module_path),
      symbol: self.symbol.clone(),
    }
  }
}

fn is_absolute(path: &Path) -> bool {
  if path.is_absolute() {
    return true;
  }
  let text = path.to_string_lossy();
  if text.starts_with("\\\\") {
    return true;
  }
  let bytes = text.as_bytes();
  bytes.len() >= 3
    && bytes[0].is_ascii_alphabetic()
    && bytes[1] == b':'
    && matches!(bytes[2], b'\\' | b'/')
}

impl fmt::Display for Locator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.module_path.display(), self.symbol)
  }
}

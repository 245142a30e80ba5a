use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tessera_resolver::{ResolvedCallable, resolve_in};
use tessera_types::{Describer, TypeDescriptor};
use tracing::{instrument, warn};

use crate::error::InspectError;
use crate::signature::signature_of;

/// The externally visible description of one callable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionReport {
  pub name: Option<String>,
  pub docstring: Option<String>,
  /// Defining file, relative to the working directory.
  pub source_file: Option<String>,
  /// Parameter name → type, in declaration order.
  pub parameters: IndexMap<String, TypeDescriptor>,
  pub return_type: TypeDescriptor,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl FunctionReport {
  /// The empty report that stands in for a callable that could not be
  /// inspected.
  pub fn failure(message: impl Into<String>) -> Self {
    Self {
      name: None,
      docstring: None,
      source_file: None,
      parameters: IndexMap::new(),
      return_type: TypeDescriptor::Any,
      error: Some(message.into()),
    }
  }

  pub fn is_error(&self) -> bool {
    self.error.is_some()
  }
}

/// Resolve and inspect `locator`. Never fails; see [`FunctionReport::failure`].
#[instrument(skip(cwd))]
pub fn inspect(locator: &str, cwd: &Path) -> FunctionReport {
  match resolve_in(locator, cwd) {
    Ok(resolved) => inspect_callable(&resolved, cwd),
    Err(e) => {
      warn!(error = %e, "could not resolve callable");
      FunctionReport::failure(e.to_string())
    }
  }
}

/// Inspect an already resolved callable. Never fails.
pub fn inspect_callable(resolved: &ResolvedCallable, cwd: &Path) -> FunctionReport {
  build_report(resolved, cwd).unwrap_or_else(|e| {
    warn!(locator = %resolved.locator(), error = %e, "could not inspect callable");
    FunctionReport::failure(e.to_string())
  })
}

fn build_report(resolved: &ResolvedCallable, cwd: &Path) -> Result<FunctionReport, InspectError> {
  let signature = signature_of(resolved)?;
  let mut describer = Describer::new(&signature.classes).with_generics(signature.generics.iter().cloned());

  let parameters = signature
    .params
    .iter()
    .map(|p| (p.name.clone(), describer.describe(p.annotation.as_ref())))
    .collect();
  let return_type = describer.describe(signature.returns.as_ref());

  Ok(FunctionReport {
    name: Some(resolved.locator().symbol.clone()),
    docstring: signature.docstring.clone(),
    source_file: signature.source.as_deref().map(|path| relative_path(path, cwd)),
    parameters,
    return_type,
    error: None,
  })
}

/// `path` relative to `base`, climbing with `..` where the two diverge.
/// Both are normalized lexically first; symlinks are not followed.
///
/// Paths on different roots (another drive, or one relative and one
/// absolute) are returned unchanged.
pub fn relative_path(path: &Path, base: &Path) -> String {
  let (path, base) = (&normalize(path), &normalize(base));
  if let Ok(stripped) = path.strip_prefix(base) {
    return display(stripped);
  }

  let path_parts: Vec<Component> = path.components().collect();
  let base_parts: Vec<Component> = base.components().collect();
  let common = path_parts
    .iter()
    .zip(&base_parts)
    .take_while(|(a, b)| a == b)
    .count();

  let shares_root = common > 0 && matches!(path_parts[0], Component::Prefix(_) | Component::RootDir);
  if !shares_root {
    return path.display().to_string();
  }

  let mut relative = PathBuf::new();
  for _ in common..base_parts.len() {
    relative.push("..");
  }
  for part in &path_parts[common..] {
    relative.push(part.as_os_str());
  }
  display(&relative)
}

/// Drop `.` and fold `name/..` pairs. A `..` directly under the root stays
/// at the root.
fn normalize(path: &Path) -> PathBuf {
  let mut parts: Vec<Component> = Vec::new();
  for part in path.components() {
    match part {
      Component::CurDir => {}
      Component::ParentDir => match parts.last() {
        Some(Component::Normal(_)) => {
          parts.pop();
        }
        Some(Component::RootDir | Component::Prefix(_)) => {}
        _ => parts.push(part),
      },
      _ => parts.push(part),
    }
  }
  parts.iter().collect()
}

fn display(path: &Path) -> String {
  if path.as_os_str().is_empty() {
    ".".to_string()
  } else {
    path.display().to_string()
  }
}

use std::path::PathBuf;

use tessera_annotations::{FunctionDoc, parse_module};
use tessera_resolver::ResolvedCallable;
use tessera_types::{ClassTable, TypeExpr};
use tracing::{debug, instrument};

use crate::error::InspectError;

/// Name used for the variadic tail of a signature.
pub const VARARG: &str = "...";

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
  pub name: String,
  /// The `---@param` type, if one was written.
  pub annotation: Option<TypeExpr>,
  /// Marked `name?` or annotated with a nilable type; acts as a default.
  pub optional: bool,
  /// The `...` tail.
  pub vararg: bool,
}

impl Parameter {
  pub fn is_required(&self) -> bool {
    !self.optional && !self.vararg
  }
}

/// Everything known about a function's interface without calling it.
#[derive(Debug, Clone)]
pub struct Signature {
  pub params: Vec<Parameter>,
  pub returns: Option<TypeExpr>,
  /// `---@generic` names in scope for the annotations.
  pub generics: Vec<String>,
  pub docstring: Option<String>,
  pub source: Option<PathBuf>,
  pub line_defined: Option<usize>,
  /// Classes and aliases declared in the defining file.
  pub classes: ClassTable,
}

impl Signature {
  pub fn is_vararg(&self) -> bool {
    self.params.iter().any(|p| p.vararg)
  }

  /// Parameters a caller must supply.
  pub fn required_params(&self) -> impl Iterator<Item = &Parameter> {
    self.params.iter().filter(|p| p.is_required())
  }

  /// Named parameters in call order, without the `...` tail.
  pub fn positional(&self) -> impl Iterator<Item = &Parameter> {
    self.params.iter().filter(|p| !p.vararg)
  }
}

/// Read the signature of the function behind `resolved`.
///
/// A wrapped callable reports its original. A `__call` object reports the
/// metamethod minus its leading `self`.
#[instrument(skip_all, fields(locator = %resolved.locator()))]
pub fn signature_of(resolved: &ResolvedCallable) -> Result<Signature, InspectError> {
  let target = resolved.target();
  let info = resolved.host().debug_info(&target.function)?;

  let mut names = info.params;
  if target.binds_self && !names.is_empty() {
    names.remove(0);
  }

  let (doc, classes) = match (&info.source, info.line_defined) {
    (Some(path), Some(line)) => {
      let bytes = std::fs::read(path).map_err(|e| InspectError::Source {
        path: path.clone(),
        message: e.to_string(),
      })?;
      let source = String::from_utf8_lossy(&bytes);
      let doc = FunctionDoc::above(&source, line).unwrap_or_default();
      (doc, parse_module(&source))
    }
    _ => {
      debug!("function has no source file; no annotations");
      (FunctionDoc::default(), ClassTable::new())
    }
  };

  let mut params: Vec<Parameter> = names
    .into_iter()
    .map(|name| {
      let documented = doc.param(&name);
      Parameter {
        annotation: documented.map(|p| p.ty.clone()),
        optional: documented.is_some_and(|p| p.optional),
        vararg: false,
        name,
      }
    })
    .collect();

  if info.is_vararg {
    params.push(Parameter {
      name: VARARG.to_string(),
      annotation: doc.param(VARARG).map(|p| p.ty.clone()),
      optional: true,
      vararg: true,
    });
  }

  Ok(Signature {
    params,
    returns: doc.return_type(),
    generics: doc.generics,
    docstring: doc.description,
    source: info.source,
    line_defined: info.line_defined,
    classes,
  })
}

use std::path::Path;

use mlua::{Function, Table, Value};
use tracing::{debug, instrument};

use crate::error::ResolveError;
use crate::host::{LuaHost, lua_message};
use crate::locator::Locator;

/// The function whose signature describes a callable.
#[derive(Debug, Clone)]
pub struct Target {
  pub function: Function,
  /// The function is a `__call` metamethod: its first parameter receives the
  /// callable object itself and is not part of the public signature.
  pub binds_self: bool,
}

/// A live callable together with the Lua state that owns it.
pub struct ResolvedCallable {
  locator: Locator,
  callable: Value,
  original: Option<Value>,
  target: Target,
  host: LuaHost,
}

impl ResolvedCallable {
  /// The absolute locator that was loaded.
  pub fn locator(&self) -> &Locator {
    &self.locator
  }

  /// The value the symbol names. This is what gets called.
  pub fn callable(&self) -> &Value {
    &self.callable
  }

  /// The callable a wrapper exposes through `__wrapped`, if any.
  pub fn original(&self) -> Option<&Value> {
    self.original.as_ref()
  }

  /// The function to inspect: the original's when wrapped, else the
  /// callable's own.
  pub fn target(&self) -> &Target {
    &self.target
  }

  pub fn host(&self) -> &LuaHost {
    &self.host
  }

  /// Call the resolved value with positional arguments.
  pub fn call(&self, args: Vec<Value>) -> mlua::Result<Vec<Value>> {
    self.host.call(&self.callable, args)
  }
}

/// Resolve a locator against the process working directory.
pub fn resolve(locator: &str) -> Result<ResolvedCallable, ResolveError> {
  let cwd = std::env::current_dir().map_err(|e| ResolveError::ModuleLoad {
    path: ".".into(),
    message: e.to_string(),
  })?;
  resolve_in(locator, &cwd)
}

/// Resolve a locator, joining relative module paths onto `cwd`.
#[instrument(name = "resolve", skip(cwd))]
pub fn resolve_in(locator: &str, cwd: &Path) -> Result<ResolvedCallable, ResolveError> {
  let locator = Locator::parse(locator)?.absolutize(cwd);
  let host = LuaHost::new()?;

  let (exports, env) = load_module(&host, &locator.module_path)?;
  let callable = lookup(exports.as_ref(), &env, &locator)?;

  let kind = callable.type_name();
  let target = target_of(&host, &callable)?.ok_or_else(|| ResolveError::NotCallable {
    symbol: locator.symbol.clone(),
    kind: kind.to_string(),
  })?;

  let (original, target) = match unwrap_original(&host, &callable)? {
    Some((original, original_target)) => {
      debug!(symbol = %locator.symbol, "inspecting wrapped original");
      (Some(original), original_target)
    }
    None => (None, target),
  };

  Ok(ResolvedCallable {
    locator,
    callable,
    original,
    target,
    host,
  })
}

/// Execute the module file; returns what the chunk returned (when it is a
/// table) and the environment it ran in.
fn load_module(host: &LuaHost, path: &Path) -> Result<(Option<Table>, Table), ResolveError> {
  let load_error = |message: String| ResolveError::ModuleLoad {
    path: path.to_path_buf(),
    message,
  };

  let mut source = std::fs::read(path).map_err(|e| load_error(e.to_string()))?;
  strip_shebang(&mut source);
  if let Some(dir) = path.parent() {
    host.add_search_dir(dir)?;
  }

  let env = host.module_env()?;
  let returned: Value = host
    .lua()
    .load(source)
    .set_name(format!("@{}", path.display()))
    .set_environment(env.clone())
    .call(())
    .map_err(|e| load_error(lua_message(&e)))?;

  debug!(path = %path.display(), "module loaded");

  let exports = match returned {
    Value::Table(table) => Some(table),
    _ => None,
  };
  Ok((exports, env))
}

/// Blank a leading `#` line the way the standalone interpreter skips it.
/// The newline stays so reported line numbers match the file.
fn strip_shebang(source: &mut Vec<u8>) {
  if source.first() == Some(&b'#') {
    let end = source.iter().position(|&b| b == b'\n').unwrap_or(source.len());
    source.drain(..end);
  }
}

/// Look in the returned table first, then among the module's own globals.
/// Builtins reachable only through the fallback to `_G` are not symbols of
/// the module.
fn lookup(exports: Option<&Table>, env: &Table, locator: &Locator) -> Result<Value, ResolveError> {
  if let Some(exports) = exports {
    let value: Value = exports.raw_get(locator.symbol.as_str())?;
    if !value.is_nil() {
      return Ok(value);
    }
  }

  let value: Value = env.raw_get(locator.symbol.as_str())?;
  if value.is_nil() {
    return Err(ResolveError::SymbolNotFound {
      symbol: locator.symbol.clone(),
      path: locator.module_path.clone(),
    });
  }
  Ok(value)
}

fn target_of(host: &LuaHost, value: &Value) -> Result<Option<Target>, ResolveError> {
  if let Value::Function(function) = value {
    return Ok(Some(Target {
      function: function.clone(),
      binds_self: false,
    }));
  }
  Ok(host.call_metamethod(value)?.map(|function| Target {
    function,
    binds_self: true,
  }))
}

/// One layer of `__wrapped`: a wrapper object pointing at the callable it
/// decorates.
fn unwrap_original(host: &LuaHost, value: &Value) -> Result<Option<(Value, Target)>, ResolveError> {
  let Value::Table(table) = value else {
    return Ok(None);
  };
  let original: Value = table.raw_get("__wrapped")?;
  if original.is_nil() {
    return Ok(None);
  }
  Ok(target_of(host, &original)?.map(|target| (original, target)))
}

use std::path::Path;

use mlua::{DeserializeOptions, Lua, LuaSerdeExt, SerializeOptions};
use serde_json::{Map, Value};
use tessera_inspect::signature_of;
use tessera_resolver::{ResolvedCallable, lua_message, resolve_in};
use tracing::{debug, instrument};

use crate::error::InvokeError;

/// Resolve `locator` and call it with `arguments`.
#[instrument(skip(arguments, cwd), fields(args = arguments.len()))]
pub fn invoke(locator: &str, arguments: &Map<String, Value>, cwd: &Path) -> Result<Value, InvokeError> {
  let resolved = resolve_in(locator, cwd).map_err(|e| InvokeError::NotFound {
    message: e.to_string(),
  })?;
  invoke_resolved(&resolved, arguments)
}

/// Call an already resolved callable.
///
/// Arguments bind by name to the declared parameters (the original's when
/// wrapped). Missing optional parameters are `nil`. Keys that match no
/// parameter go to a vararg callable as one trailing table and are
/// otherwise dropped.
///
/// No return value becomes `null`; several become an array.
pub fn invoke_resolved(resolved: &ResolvedCallable, arguments: &Map<String, Value>) -> Result<Value, InvokeError> {
  let signature = signature_of(resolved).map_err(|e| InvokeError::execution(e.to_string()))?;

  if let Some(missing) = signature.required_params().find(|p| !arguments.contains_key(&p.name)) {
    return Err(InvokeError::MissingParameter {
      name: missing.name.clone(),
    });
  }

  let lua = resolved.host().lua();
  let mut args = Vec::new();
  for param in signature.positional() {
    let value = match arguments.get(&param.name) {
      Some(value) => to_lua(lua, value)?,
      None => mlua::Value::Nil,
    };
    args.push(value);
  }

  let extra: Map<String, Value> = arguments
    .iter()
    .filter(|(key, _)| !signature.positional().any(|p| &p.name == *key))
    .map(|(key, value)| (key.clone(), value.clone()))
    .collect();
  if !extra.is_empty() {
    if signature.is_vararg() {
      args.push(to_lua(lua, &Value::Object(extra))?);
    } else {
      debug!(
        keys = ?extra.keys().collect::<Vec<_>>(),
        "ignoring arguments with no matching parameter"
      );
    }
  }

  let results = resolved
    .call(args)
    .map_err(|e| InvokeError::execution(lua_message(&e)))?;

  let mut values = results
    .into_iter()
    .map(|value| from_lua(lua, value))
    .collect::<Result<Vec<_>, _>>()?;

  Ok(match values.len() {
    0 => Value::Null,
    1 => values.remove(0),
    _ => Value::Array(values),
  })
}

fn to_lua(lua: &Lua, value: &Value) -> Result<mlua::Value, InvokeError> {
  let options = SerializeOptions::new()
    .serialize_none_to_null(false)
    .serialize_unit_to_null(false);
  lua
    .to_value_with(value, options)
    .map_err(|e| InvokeError::execution(format!("invalid argument: {}", lua_message(&e))))
}

fn from_lua(lua: &Lua, value: mlua::Value) -> Result<Value, InvokeError> {
  let options = DeserializeOptions::new().deny_unsupported_types(false);
  lua
    .from_value_with(value, options)
    .map_err(|e| InvokeError::execution(format!("result is not JSON: {}", lua_message(&e))))
}

use std::path::{Path, PathBuf};

use mlua::{Function, Lua, LuaOptions, MultiValue, StdLib, Table, Value};

/// Runs before any user code. Captures the debug functions the host needs,
/// then removes `debug` from the globals user modules can see.
const PRELUDE: &str = r#"
local getinfo, getlocal, getmetatable = debug.getinfo, debug.getlocal, debug.getmetatable
debug = nil
if package then
  package.loaded.debug = nil
end

local host = {}

function host.describe(f)
  local info = getinfo(f, "Su")
  local params = {}
  for i = 1, info.nparams do
    params[i] = getlocal(f, i)
  end
  return info.source, info.linedefined, params, info.isvararg
end

function host.call_metamethod(value)
  local mt = getmetatable(value)
  if type(mt) == "table" then
    local call = rawget(mt, "__call")
    if type(call) == "function" then
      return call
    end
  end
  return nil
end

function host.invoke(f, ...)
  return f(...)
end

function host.module_env()
  return setmetatable({}, { __index = _G })
end

function host.add_search_dir(dir)
  if package then
    local sep = package.config:sub(1, 1)
    package.path = dir .. sep .. "?.lua;" .. package.path
  end
end

return host
"#;

/// What the debug interface reports about a function.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugInfo {
  /// The file the function was defined in, when it came from one.
  pub source: Option<PathBuf>,
  /// 1-based line of the `function` keyword.
  pub line_defined: Option<usize>,
  /// Named parameters, in declaration order.
  pub params: Vec<String>,
  pub is_vararg: bool,
}

/// A Lua 5.4 state prepared for loading one module.
pub struct LuaHost {
  describe: Function,
  call_metamethod: Function,
  invoke: Function,
  module_env: Function,
  add_search_dir: Function,
  lua: Lua,
}

impl LuaHost {
  pub fn new() -> mlua::Result<Self> {
    // SAFETY: `Lua::new_with` refuses `StdLib::DEBUG`, and parameter names
    // need `debug.getlocal`. The debug library is only reachable through the
    // functions the prelude captures; it is gone from the globals before user
    // code runs.
    let lua = unsafe { Lua::unsafe_new_with(StdLib::ALL_SAFE | StdLib::DEBUG, LuaOptions::default()) };
    let host: Table = lua.load(PRELUDE).set_name("=tessera").eval()?;

    Ok(Self {
      describe: host.get("describe")?,
      call_metamethod: host.get("call_metamethod")?,
      invoke: host.get("invoke")?,
      module_env: host.get("module_env")?,
      add_search_dir: host.get("add_search_dir")?,
      lua,
    })
  }

  pub fn lua(&self) -> &Lua {
    &self.lua
  }

  /// A fresh environment table that falls back to the globals.
  pub fn module_env(&self) -> mlua::Result<Table> {
    self.module_env.call(())
  }

  /// Let `require` find sibling modules of a loaded file.
  pub fn add_search_dir(&self, dir: &Path) -> mlua::Result<()> {
    self.add_search_dir.call(dir.to_string_lossy().into_owned())
  }

  pub fn debug_info(&self, function: &Function) -> mlua::Result<DebugInfo> {
    let (source, line_defined, params, is_vararg): (String, i64, Vec<String>, bool) =
      self.describe.call(function.clone())?;

    Ok(DebugInfo {
      source: source.strip_prefix('@').map(PathBuf::from),
      line_defined: usize::try_from(line_defined).ok().filter(|line| *line > 0),
      params,
      is_vararg,
    })
  }

  /// The `__call` metamethod of a table or userdata, read past any
  /// `__metatable` protection.
  pub fn call_metamethod(&self, value: &Value) -> mlua::Result<Option<Function>> {
    match value {
      Value::Table(_) | Value::UserData(_) => self.call_metamethod.call(value.clone()),
      _ => Ok(None),
    }
  }

  /// Call any callable value (function or `__call` object).
  pub fn call(&self, callable: &Value, args: Vec<Value>) -> mlua::Result<Vec<Value>> {
    let args: MultiValue = std::iter::once(callable.clone()).chain(args).collect();
    let results: MultiValue = self.invoke.call(args)?;
    Ok(results.into_iter().collect())
  }
}

/// The message of a Lua error without mlua's wrapping or the traceback.
pub fn lua_message(error: &mlua::Error) -> String {
  let text = match error {
    mlua::Error::RuntimeError(message) => message.clone(),
    mlua::Error::SyntaxError { message, .. } => message.clone(),
    mlua::Error::CallbackError { cause, .. } => return lua_message(cause),
    other => other.to_string(),
  };
  match text.find("\nstack traceback:") {
    Some(end) => text[..end].to_string(),
    None => text,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_debug_is_hidden_from_globals() {
    let host = LuaHost::new().unwrap();
    let debug: Value = host.lua().globals().get("debug").unwrap();
    assert!(debug.is_nil());
  }

  #[test]
  fn test_debug_info_reads_params() {
    let host = LuaHost::new().unwrap();
    let f: Function = host
      .lua()
      .load("return function(a, b, ...) return a end")
      .set_name("@/tmp/mod.lua")
      .eval()
      .unwrap();

    let info = host.debug_info(&f).unwrap();
    assert_eq!(info.params, vec!["a".to_string(), "b".to_string()]);
    assert!(info.is_vararg);
    assert_eq!(info.source, Some(PathBuf::from("/tmp/mod.lua")));
    assert_eq!(info.line_defined, Some(1));
  }

  #[test]
  fn test_call_metamethod_ignores_protection() {
    let host = LuaHost::new().unwrap();
    let value: Value = host
      .lua()
      .load(
        "return setmetatable({}, { __call = function(self, x) return x end, __metatable = false })",
      )
      .eval()
      .unwrap();

    let call = host.call_metamethod(&value).unwrap();
    assert!(call.is_some());

    let results = host.call(&value, vec![Value::Integer(7)]).unwrap();
    assert_eq!(results, vec![Value::Integer(7)]);
  }

  #[test]
  fn test_lua_message_strips_traceback() {
    let host = LuaHost::new().unwrap();
    let err = host
      .lua()
      .load("error('boom')")
      .set_name("=job")
      .exec()
      .unwrap_err();
    let message = lua_message(&err);
    assert!(message.contains("boom"));
    assert!(!message.contains("stack traceback"));
  }
}

use std::fs;
use std::path::Path;

use serde_json::{Map, Value, json};
use tessera_invoke::{InvokeError, invoke};

const TASKS: &str = r#"
local M = {}

---@param a integer
---@param b? integer
function M.add(a, b)
  return a + (b or 0)
end

---@param x integer
function M.guarded(x)
  local f = io.open(MARKER, "w")
  f:write("called")
  f:close()
  return x
end

---@param payload any
function M.store(payload)
  local f = io.open(MARKER, "w")
  f:write("called")
  f:close()
  return payload
end

---@param payload any?
function M.peek(payload)
  return payload == nil
end

function M.fail(reason)
  error("task failed: " .. reason)
end

function M.pair()
  return 1, "two"
end

function M.nothing()
end

---@param name string
function M.options(name, ...)
  local extra = ...
  return { name = name, extra = extra }
end

function M.echo(value)
  return value
end

local function original(title)
  return "original " .. title
end

M.wrapped = setmetatable({ __wrapped = original }, {
  __call = function(self, ...)
    return "wrapped " .. original(...)
  end,
})

return M
"#;

fn fixture() -> tempfile::TempDir {
  let dir = tempfile::tempdir().unwrap();
  let marker = dir.path().join("called.txt");
  let source = format!("MARKER = {:?}\n{}", marker.display().to_string(), TASKS);
  fs::write(dir.path().join("tasks.lua"), source).unwrap();
  dir
}

fn args(value: Value) -> Map<String, Value> {
  match value {
    Value::Object(map) => map,
    _ => panic!("arguments must be an object"),
  }
}

fn call(dir: &Path, symbol: &str, arguments: Value) -> Result<Value, InvokeError> {
  invoke(&format!("tasks.lua:{symbol}"), &args(arguments), dir)
}

#[test]
fn test_binds_arguments_by_name() {
  let dir = fixture();
  assert_eq!(call(dir.path(), "add", json!({"b": 2, "a": 40})).unwrap(), json!(42));
  assert_eq!(call(dir.path(), "add", json!({"a": 1})).unwrap(), json!(1));
}

#[test]
fn test_missing_required_parameter_never_calls() {
  let dir = fixture();
  let err = call(dir.path(), "guarded", json!({})).unwrap_err();

  assert!(matches!(err, InvokeError::MissingParameter { ref name } if name == "x"));
  assert_eq!(err.to_string(), "Missing required parameter: x");
  assert!(!dir.path().join("called.txt").exists());

  assert_eq!(call(dir.path(), "guarded", json!({"x": 3})).unwrap(), json!(3));
  assert!(dir.path().join("called.txt").exists());
}

#[test]
fn test_any_parameter_is_still_required() {
  let dir = fixture();
  let err = call(dir.path(), "store", json!({})).unwrap_err();

  assert!(matches!(err, InvokeError::MissingParameter { ref name } if name == "payload"));
  assert!(!dir.path().join("called.txt").exists());
  assert_eq!(call(dir.path(), "store", json!({"payload": {"k": 1}})).unwrap(), json!({"k": 1}));
  assert_eq!(call(dir.path(), "peek", json!({})).unwrap(), json!(true));
}

#[test]
fn test_execution_error_carries_message() {
  let dir = fixture();
  let err = call(dir.path(), "fail", json!({"reason": "disk full"})).unwrap_err();

  match err {
    InvokeError::ExecutionError { message } => assert!(message.contains("task failed: disk full")),
    other => panic!("unexpected error: {other}"),
  }

  // A failing call leaves nothing behind for the next one.
  assert_eq!(call(dir.path(), "add", json!({"a": 1, "b": 1})).unwrap(), json!(2));
}

#[test]
fn test_unresolvable_locator_is_not_found() {
  let dir = fixture();
  let err = call(dir.path(), "missing", json!({})).unwrap_err();
  assert!(matches!(err, InvokeError::NotFound { .. }));

  let err = invoke("absent.lua:add", &Map::new(), dir.path()).unwrap_err();
  assert!(matches!(err, InvokeError::NotFound { .. }));
}

#[test]
fn test_return_shapes() {
  let dir = fixture();
  assert_eq!(call(dir.path(), "pair", json!({})).unwrap(), json!([1, "two"]));
  assert_eq!(call(dir.path(), "nothing", json!({})).unwrap(), Value::Null);
}

#[test]
fn test_json_values_round_trip_through_lua() {
  let dir = fixture();
  let value = json!({"tags": ["a", "b"], "count": 3, "ratio": 0.5, "ok": true});
  assert_eq!(call(dir.path(), "echo", json!({"value": value.clone()})).unwrap(), value);
  assert_eq!(call(dir.path(), "echo", json!({"value": null})).unwrap(), Value::Null);
}

#[test]
fn test_extra_arguments_go_to_vararg_table() {
  let dir = fixture();
  let result = call(dir.path(), "options", json!({"name": "n", "verbose": true})).unwrap();
  assert_eq!(result, json!({"name": "n", "extra": {"verbose": true}}));
}

#[test]
fn test_extra_arguments_ignored_without_vararg() {
  let dir = fixture();
  assert_eq!(call(dir.path(), "add", json!({"a": 2, "c": 9})).unwrap(), json!(2));
}

#[test]
fn test_wrapped_validates_original_and_calls_wrapper() {
  let dir = fixture();
  let err = call(dir.path(), "wrapped", json!({})).unwrap_err();
  assert!(matches!(err, InvokeError::MissingParameter { ref name } if name == "title"));

  assert_eq!(
    call(dir.path(), "wrapped", json!({"title": "t"})).unwrap(),
    json!("wrapped original t")
  );
}

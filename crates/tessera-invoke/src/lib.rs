//! Tessera Invoke
//!
//! Calls a resolved callable with a JSON object of named arguments.
//!
//! Lua has no keyword arguments, so names are bound to the declared
//! positional parameters. Required parameters are checked before anything
//! runs; a callable that raises never takes the caller down with it.

mod error;
mod invoke;

pub use error::InvokeError;
pub use invoke::{invoke, invoke_resolved};

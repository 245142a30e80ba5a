//! Tessera Resolver
//!
//! Turns a `module-path:symbol` locator into a live Lua callable.
//!
//! Every resolution gets its own [`LuaHost`]: the module file is read, its
//! top-level chunk is executed in a fresh environment, and the symbol is
//! looked up in the table the chunk returns or, failing that, among the
//! globals the chunk defined. Nothing is cached, so each call re-runs the
//! module's top-level code.

mod error;
mod host;
mod locator;
mod resolve;

pub use error::ResolveError;
pub use host::{DebugInfo, LuaHost, lua_message};
pub use locator::Locator;
pub use resolve::{ResolvedCallable, Target, resolve, resolve_in};

//! Tessera Inspect
//!
//! Describes a resolved callable without running it: parameter names come
//! from the Lua debug interface, types and the docstring from the `---@`
//! annotations above the function's definition.
//!
//! [`inspect`] never fails. Any problem along the way is folded into a
//! [`FunctionReport`] whose `error` is set, so a listing of many callables
//! survives one broken entry.

mod error;
mod report;
mod signature;

pub use error::InspectError;
pub use report::{FunctionReport, inspect, inspect_callable, relative_path};
pub use signature::{Parameter, Signature, signature_of};

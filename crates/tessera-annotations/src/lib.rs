//! Tessera Annotations
//!
//! Reads LuaLS-style `---@` doc comments out of Lua source text.
//!
//! Two views are offered:
//! - [`parse_module`] scans a whole file for `---@class`/`---@field` blocks and
//!   `---@alias` declarations and returns them as a [`ClassTable`].
//! - [`FunctionDoc::above`] reads the comment block that sits directly above a
//!   function definition: its description, `@param`, `@return` and
//!   `@generic` tags.

mod function;
mod lines;
mod module;

pub use function::{FunctionDoc, ParamDoc};
pub use module::parse_module;
pub use tessera_types::ClassTable;

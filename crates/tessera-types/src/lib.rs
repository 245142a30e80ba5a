//! Tessera Types
//!
//! This crate turns LuaLS-style type annotations into a stable,
//! language-agnostic JSON type tree.
//!
//! The flow is:
//! 1. [`parse_type`] turns annotation text (`table<string, integer[]>`) into a
//!    [`TypeExpr`]. Parsing is total: text the grammar rejects becomes
//!    [`TypeExpr::Unparsed`].
//! 2. A [`ClassTable`] collects the `---@class` and `---@alias` declarations of
//!    a module.
//! 3. [`describe`] (or a configured [`Describer`]) walks a `TypeExpr` against
//!    the class table and produces a [`TypeDescriptor`].
//!
//! Nothing here executes code or touches the filesystem.

mod class;
mod describe;
mod descriptor;
mod expr;
mod parser;

pub use class::{ClassDef, ClassTable, FieldDef};
pub use describe::{Describer, describe};
pub use descriptor::TypeDescriptor;
pub use expr::{Literal, TypeExpr};
pub use parser::parse_type;

//! Tessera Config
//!
//! The task and graph registries a server is started with. Both arrive as
//! JSON in the environment:
//!
//! ```text
//! TASKS='{"summarize": {"source_file": "jobs/text.lua"}}'
//! LANGSERVE_GRAPHS='{"chat": "graphs/chat.lua:graph"}'
//! ```
//!
//! They are read once at startup and shared read-only afterwards.

mod error;
mod registry;

pub use error::ConfigError;
pub use registry::{GRAPHS_VAR, GraphRegistry, Registry, TASKS_VAR, TaskEntry, TaskRegistry};

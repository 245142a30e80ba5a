//! Tessera Server
//!
//! The HTTP surface:
//!
//! ```text
//! GET  /health             - liveness
//! GET  /task-schemas       - one schema per registered task
//! POST /task/{task_name}   - run a task with a JSON object of arguments
//! GET  /graph-schemas      - registered graphs with their assistant state schema
//! ```
//!
//! Lua work is blocking and runs on the blocking pool; each request loads
//! its modules into a Lua state of its own.

mod error;
mod handlers;
mod routes;
mod schema;
mod server;
mod state;

pub use error::ApiError;
pub use routes::router;
pub use schema::{Schema, SchemaKind, StateSnapshot};
pub use server::serve;
pub use state::AppState;

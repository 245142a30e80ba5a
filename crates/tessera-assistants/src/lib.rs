//! Tessera Assistants
//!
//! Graphs are not executed here. Their state schemas are computed by an
//! assistant API and fetched over HTTP:
//!
//! - `POST {base}/assistants/search` lists every assistant
//! - `GET {base}/assistants/{id}/schemas` returns one assistant's schemas
//!
//! [`AssistantDirectory`] is the seam the server depends on;
//! [`HttpAssistantDirectory`] is the real client.

mod directory;
mod error;
mod http;

pub use directory::{Assistant, AssistantDirectory, latest_per_graph};
pub use error::AssistantError;
pub use http::HttpAssistantDirectory;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::{Value, json};
use tracing::{debug, instrument};
use url::Url;

use crate::directory::{Assistant, AssistantDirectory};
use crate::error::AssistantError;

/// [`AssistantDirectory`] backed by the assistant HTTP API.
#[derive(Debug, Clone)]
pub struct HttpAssistantDirectory {
  client: Client,
  base: Url,
}

impl HttpAssistantDirectory {
  /// Create a client for the API rooted at `base` (`http://host:port`).
  pub fn new(base: &str) -> Result<Self, AssistantError> {
    Self::with_client(Client::new(), base)
  }

  pub fn with_client(client: Client, base: &str) -> Result<Self, AssistantError> {
    let base = Url::parse(base).map_err(|e| AssistantError::InvalidUrl {
      url: base.to_string(),
      message: e.to_string(),
    })?;
    Ok(Self { client, base })
  }

  /// `base` with `segments` appended, each percent-encoded as one segment.
  fn endpoint(&self, segments: &[&str]) -> Result<Url, AssistantError> {
    let mut url = self.base.clone();
    url
      .path_segments_mut()
      .map_err(|()| AssistantError::InvalidUrl {
        url: self.base.to_string(),
        message: "cannot be a base".to_string(),
      })?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }
}

fn check_status(response: Response) -> Result<Response, AssistantError> {
  let status = response.status();
  if !status.is_success() {
    return Err(AssistantError::Status {
      status: status.as_u16(),
      url: response.url().to_string(),
    });
  }
  Ok(response)
}

#[async_trait]
impl AssistantDirectory for HttpAssistantDirectory {
  #[instrument(skip(self), fields(base = %self.base))]
  async fn search(&self) -> Result<Vec<Assistant>, AssistantError> {
    let url = self.endpoint(&["assistants", "search"])?;
    let response = self.client.post(url).json(&json!({})).send().await?;
    let assistants: Vec<Assistant> = check_status(response)?.json().await?;
    debug!(count = assistants.len(), "assistants listed");
    Ok(assistants)
  }

  #[instrument(skip(self), fields(base = %self.base))]
  async fn state_schema(&self, assistant_id: &str) -> Result<Value, AssistantError> {
    let url = self.endpoint(&["assistants", assistant_id, "schemas"])?;
    let response = self.client.get(url.clone()).send().await?;
    let mut body: Value = check_status(response)?.json().await?;

    body
      .get_mut("state_schema")
      .map(Value::take)
      .ok_or_else(|| AssistantError::MissingField {
        url: url.to_string(),
        field: "state_schema".to_string(),
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_endpoint_joins_base() {
    let directory = HttpAssistantDirectory::new("http://localhost:2024/").unwrap();
    assert_eq!(
      directory.endpoint(&["assistants", "search"]).unwrap().as_str(),
      "http://localhost:2024/assistants/search"
    );

    let directory = HttpAssistantDirectory::new("http://localhost:2024/api").unwrap();
    assert_eq!(
      directory.endpoint(&["assistants", "search"]).unwrap().as_str(),
      "http://localhost:2024/api/assistants/search"
    );
  }

  #[test]
  fn test_endpoint_encodes_segments() {
    let directory = HttpAssistantDirectory::new("http://localhost:2024").unwrap();
    assert_eq!(
      directory.endpoint(&["assistants", "a/b c?", "schemas"]).unwrap().as_str(),
      "http://localhost:2024/assistants/a%2Fb%20c%3F/schemas"
    );
  }

  #[test]
  fn test_opaque_base_has_no_endpoints() {
    let directory = HttpAssistantDirectory::new("mailto:ops@example.com").unwrap();
    let err = directory.endpoint(&["assistants", "search"]).unwrap_err();
    assert!(matches!(err, AssistantError::InvalidUrl { .. }));
  }

  #[test]
  fn test_rejects_invalid_base() {
    let err = HttpAssistantDirectory::new("not a url").unwrap_err();
    assert!(matches!(err, AssistantError::InvalidUrl { .. }));
  }
}

use serde_json::json;
use tessera_assistants::{AssistantDirectory, AssistantError, HttpAssistantDirectory};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_search_posts_empty_query() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/assistants/search"))
    .and(body_json(json!({})))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      {"assistant_id": "a1", "graph_id": "chat", "updated_at": "2024-01-01T00:00:00Z", "name": "Chat"},
      {"assistant_id": "a2", "graph_id": "search", "updated_at": "2024-02-01T00:00:00Z"},
    ])))
    .expect(1)
    .mount(&server)
    .await;

  let directory = HttpAssistantDirectory::new(&server.uri()).unwrap();
  let assistants = directory.search().await.unwrap();

  assert_eq!(assistants.len(), 2);
  assert_eq!(assistants[0].graph_id, "chat");
  assert_eq!(assistants[1].assistant_id, "a2");
}

#[tokio::test]
async fn test_state_schema_extracts_field() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/assistants/a1/schemas"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "graph_id": "chat",
      "input_schema": {},
      "state_schema": {"title": "State", "type": "object"},
    })))
    .mount(&server)
    .await;

  let directory = HttpAssistantDirectory::new(&server.uri()).unwrap();
  let schema = directory.state_schema("a1").await.unwrap();
  assert_eq!(schema, json!({"title": "State", "type": "object"}));
}

#[tokio::test]
async fn test_missing_state_schema() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/assistants/a1/schemas"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"graph_id": "chat"})))
    .mount(&server)
    .await;

  let directory = HttpAssistantDirectory::new(&server.uri()).unwrap();
  let err = directory.state_schema("a1").await.unwrap_err();
  assert!(matches!(err, AssistantError::MissingField { ref field, .. } if field == "state_schema"));
}

#[tokio::test]
async fn test_error_status() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/assistants/search"))
    .respond_with(ResponseTemplate::new(503))
    .mount(&server)
    .await;

  let directory = HttpAssistantDirectory::new(&server.uri()).unwrap();
  let err = directory.search().await.unwrap_err();
  assert!(matches!(err, AssistantError::Status { status: 503, .. }));
}

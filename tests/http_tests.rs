//! Tests against a real HTTP server using wiremock.

use std::time::Duration;

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ollama_ndjson::types::generate::GenerateRequest;
use ollama_ndjson::{Error, OllamaClient};

fn client_for(base_url: impl Into<String>) -> OllamaClient {
    OllamaClient::builder()
        .base_url(base_url)
        .build()
        .expect("client should build")
}

#[tokio::test]
async fn list_models_returns_parsed_body() {
    let mock_server = MockServer::start().await;
    let body = json!({"models": [{"name": "llama3.2:3b", "digest": "a80c4f17acd5"}]});

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let models = client_for(mock_server.uri()).list_models().await.unwrap();
    assert_eq!(models, body);
}

#[tokio::test]
async fn base_address_path_prefix_is_kept() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ollama/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(format!("{}/ollama/", mock_server.uri()));
    assert_eq!(client.list_models().await.unwrap(), json!({"models": []}));
}

#[tokio::test]
async fn list_models_non_json_body_is_tagged_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Ollama is running"))
        .mount(&mock_server)
        .await;

    let err = client_for(mock_server.uri()).list_models().await.unwrap_err();
    assert!(matches!(err, Error::ListModels(inner) if matches!(*inner, Error::JsonParse(_))));
}

#[tokio::test]
async fn list_models_unreachable_host_is_tagged_failure() {
    // nothing listens on port 1
    let err = client_for("http://127.0.0.1:1")
        .list_models()
        .await
        .unwrap_err();

    match err {
        Error::ListModels(inner) => assert!(matches!(*inner, Error::Transport(_))),
        other => panic!("expected ListModels, got {other:?}"),
    }
}

#[tokio::test]
async fn generate_posts_json_and_decodes_ndjson_body() {
    let mock_server = MockServer::start().await;
    let ndjson = concat!(
        r#"{"model":"llama3.2","response":"Hello","done":false}"#,
        "\n",
        r#"{"model":"llama3.2","response":", world","done":false}"#,
        "\n\n",
        r#"{"model":"llama3.2","response":"","done":true,"done_reason":"stop"}"#,
        "\n",
    );

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "model": "llama3.2",
            "prompt": "Say hello",
            "stream": true,
            "options": {"temperature": 0.0}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ndjson, "application/x-ndjson"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = GenerateRequest::new("llama3.2", "Say hello")
        .stream(true)
        .options(json!({"temperature": 0.0}));

    let mut records = Vec::new();
    client_for(mock_server.uri())
        .generate_with(request, CancellationToken::new(), |r: Value| {
            records.push(r)
        })
        .await
        .unwrap();

    let text: String = records
        .iter()
        .filter_map(|r| r["response"].as_str())
        .collect();
    assert_eq!(records.len(), 3);
    assert_eq!(text, "Hello, world");
    assert_eq!(records[2]["done"], json!(true));
}

#[tokio::test]
async fn generate_error_status_carries_server_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "model 'nope' not found"})),
        )
        .mount(&mock_server)
        .await;

    let result = client_for(mock_server.uri())
        .generate(GenerateRequest::new("nope", "hi"), CancellationToken::new())
        .await;

    match result {
        Err(Error::Server(message)) => {
            assert!(message.starts_with("404"), "{message}");
            assert!(message.contains("model 'nope' not found"), "{message}");
        }
        Err(other) => panic!("expected Server error, got {other:?}"),
        Ok(_) => panic!("expected an error"),
    }
}

#[tokio::test]
async fn generate_cancelled_while_server_is_slow() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("{\"response\":\"late\"}\n", "application/x-ndjson")
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&mock_server)
        .await;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        }
    });

    let client = client_for(mock_server.uri());
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        client.generate(GenerateRequest::new("m", "p"), cancel),
    )
    .await
    .expect("cancellation should abort the request");

    assert!(matches!(result, Err(Error::Cancelled)));
}

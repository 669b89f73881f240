use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use ragchat::chat::{ChatService, ChatSettings};
use ragchat::config::ServerConfig;
use ragchat::server::build_router;
use ragchat_core::embedding::Embedder;
use ragchat_core::search::RetrievalParams;
use ragchat_core::session::InMemorySessionStore;
use ragchat_core::{Chunk, Index};

/// One axis per keyword; sleeps when asked to.
struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn model_name(&self) -> &str {
        "keywords"
    }
    fn dims(&self) -> usize {
        3
    }
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        if text.contains("slow") {
            tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        }
        if text.contains("explode") {
            anyhow::bail!("model crashed");
        }
        let has = |w: &str| if text.contains(w) { 1.0 } else { 0.0 };
        Ok(vec![has("refund"), has("shipping"), has("warranty")])
    }
}

fn chunk(id: &str, title: &str, content: &str, embedding: Vec<f32>) -> Chunk {
    Chunk {
        chunk_id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        embedding,
    }
}

async fn spawn_server(max_history_pairs: usize) -> String {
    let index = Index::new(vec![
        chunk(
            "refunds_chunk_1",
            "Refund Policy",
            "Refunds are issued within 14 days.",
            vec![1.0, 0.0, 0.0],
        ),
        chunk(
            "shipping_chunk_1",
            "Shipping",
            "Shipping is free over 50 dollars.",
            vec![0.0, 1.0, 0.0],
        ),
    ])
    .unwrap();

    let chat = ChatService::new(
        Arc::new(index),
        Arc::new(KeywordEmbedder),
        Arc::new(InMemorySessionStore::new(max_history_pairs)),
        ChatSettings {
            retrieval: RetrievalParams {
                top_k: 3,
                threshold: 0.6,
            },
            max_history_pairs,
            temperature: 0.2,
            fallback_message: "I do not know.".to_string(),
        },
    );
    let server = ServerConfig {
        bind: "127.0.0.1:0".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 1,
    };
    let app = build_router(chat, &server).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn post_chat(base: &str, body: Value) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(format!("{}/api/chat", base))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn test_root_reports_running() {
    let base = spawn_server(5).await;
    let body: Value = reqwest::get(format!("{}/", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "status": "Backend running" }));
}

#[tokio::test]
async fn test_health_reports_chunk_count() {
    let base = spawn_server(5).await;
    let body: Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["chunks"], 2);
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_chat_answers_from_best_chunk() {
    let base = spawn_server(5).await;
    let (status, body) = post_chat(
        &base,
        json!({ "message": "how do refunds work?", "sessionId": "s1" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["answer"], "Refunds are issued within 14 days.");
    assert_eq!(body["sessionId"], "s1");
    assert_eq!(body["historySize"], 2);
    assert_eq!(body["sources"][0]["chunk_id"], "refunds_chunk_1");
    assert_eq!(body["sources"][0]["title"], "Refund Policy");
}

#[tokio::test]
async fn test_chat_falls_back_when_nothing_matches() {
    let base = spawn_server(5).await;
    let (status, body) = post_chat(
        &base,
        json!({ "message": "what about the warranty?", "sessionId": "s1" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["answer"], "I do not know.");
    assert_eq!(body["sources"], json!([]));
}

#[tokio::test]
async fn test_chat_rejects_empty_message() {
    let base = spawn_server(5).await;
    let (status, body) = post_chat(&base, json!({ "message": "   ", "sessionId": "s1" })).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_chat_uses_session_history() {
    let base = spawn_server(1).await;
    post_chat(&base, json!({ "message": "shipping", "sessionId": "s1" })).await;
    let (_, body) = post_chat(&base, json!({ "message": "how much?", "sessionId": "s1" })).await;
    // "how much?" alone matches nothing; the previous turn carries it.
    assert_eq!(body["answer"], "Shipping is free over 50 dollars.");
    assert_eq!(body["historySize"], 2);

    let (_, other) = post_chat(&base, json!({ "message": "how much?", "sessionId": "s2" })).await;
    assert_eq!(other["answer"], "I do not know.");
    assert_eq!(other["historySize"], 2);
}

#[tokio::test]
async fn test_chat_times_out() {
    let base = spawn_server(5).await;
    let (status, body) = post_chat(&base, json!({ "message": "slow refund", "sessionId": "s1" })).await;
    assert_eq!(status, 504);
    assert_eq!(body["error"]["code"], "timeout");
}

#[tokio::test]
async fn test_chat_internal_error_is_generic() {
    let base = spawn_server(5).await;
    let (status, body) = post_chat(&base, json!({ "message": "explode", "sessionId": "s1" })).await;
    assert_eq!(status, 500);
    assert_eq!(body["error"]["code"], "internal");
    assert_eq!(body["error"]["message"], "System error. Please try again later.");
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let base = spawn_server(5).await;
    let resp = reqwest::Client::new()
        .get(format!("{}/health", base))
        .header("Origin", "http://localhost:5173")
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );
    assert_eq!(
        resp.headers()
            .get("access-control-allow-credentials")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );

    let other = reqwest::Client::new()
        .get(format!("{}/health", base))
        .header("Origin", "http://evil.example")
        .send()
        .await
        .unwrap();
    assert!(other.headers().get("access-control-allow-origin").is_none());
}

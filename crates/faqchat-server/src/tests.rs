//! Router tests for `POST /chat` and `GET /health`.

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use faqchat_core::{
  outcome::FALLBACK_ANSWER,
  preference::PROFESSION_KEY,
  provider::{SimilaritySearch, TextGeneration},
  store::ChatStore,
};
use faqchat_index::{Embedder, SqliteVectorIndex};
use faqchat_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{
  AppState,
  pipeline::ChatSettings,
  router,
  testing::{MemoryStore, StubGenerator, StubIndex},
  warmup::{WarmupOutcome, WarmupPolicy, warm_up},
};

fn settings() -> ChatSettings {
  ChatSettings {
    retrieval_timeout_secs: 1,
    generation_timeout_secs: 1,
    ..ChatSettings::default()
  }
}

async fn post_chat<S, I, G>(state: AppState<S, I, G>, body: Value) -> (StatusCode, Value)
where
  S: ChatStore + 'static,
  I: SimilaritySearch + 'static,
  G: TextGeneration + 'static,
{
  let req = Request::builder()
    .method("POST")
    .uri("/chat")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(body.to_string()))
    .unwrap();
  let resp = router(state).oneshot(req).await.unwrap();
  read_json(resp).await
}

async fn read_json(resp: Response) -> (StatusCode, Value) {
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
  (status, serde_json::from_slice(&bytes).unwrap())
}

// ── POST /chat ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_user_gets_generator_answer_and_one_row() {
  let state = AppState::new(
    MemoryStore::default(),
    StubIndex::default(),
    StubGenerator::answering("Hello! How can I help?"),
    settings(),
  );

  let (status, body) =
    post_chat(state.clone(), json!({ "user_id": "u1", "message": "hello" })).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "answer": "Hello! How can I help?" }));

  let rows = state.store.exchanges_for("u1");
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].question, "hello");
  assert_eq!(rows[0].answer, "Hello! How can I help?");

  // Empty history, no FAQs, no profession: system message + live message.
  let prompt = state.generator.last_prompt().unwrap();
  assert_eq!(prompt.messages.len(), 2);
}

#[tokio::test]
async fn index_failure_still_returns_200() {
  let state = AppState::new(
    MemoryStore::default(),
    StubIndex::failing(),
    StubGenerator::answering("fine"),
    settings(),
  );

  let (status, body) =
    post_chat(state, json!({ "user_id": "u1", "message": "hello" })).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["answer"], "fine");
}

#[tokio::test]
async fn generation_failure_returns_and_persists_fallback() {
  let state = AppState::new(
    MemoryStore::default(),
    StubIndex::default(),
    StubGenerator::failing(),
    settings(),
  );

  let (status, body) =
    post_chat(state.clone(), json!({ "user_id": "u1", "message": "hello" })).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["answer"], FALLBACK_ANSWER);
  assert_eq!(state.store.exchanges_for("u1")[0].answer, FALLBACK_ANSWER);
}

#[tokio::test]
async fn empty_message_is_answered_and_stored() {
  let state = AppState::new(
    MemoryStore::default(),
    StubIndex::default(),
    StubGenerator::answering("Could you say more?"),
    settings(),
  );

  let (status, body) =
    post_chat(state.clone(), json!({ "user_id": "u1", "message": "" })).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["answer"], "Could you say more?");
  let rows = state.store.exchanges_for("u1");
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].question, "");
}

#[tokio::test]
async fn empty_user_id_is_answered_and_stored() {
  let state = AppState::new(
    MemoryStore::default(),
    StubIndex::default(),
    StubGenerator::answering("hi"),
    settings(),
  );

  let (status, body) =
    post_chat(state.clone(), json!({ "user_id": "", "message": "hello" })).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["answer"], "hi");
  assert_eq!(state.store.exchanges_for("").len(), 1);
}

#[tokio::test]
async fn store_write_failure_is_500() {
  let state = AppState::new(
    MemoryStore::failing_writes(),
    StubIndex::default(),
    StubGenerator::answering("hi"),
    settings(),
  );

  let (status, body) =
    post_chat(state, json!({ "user_id": "u1", "message": "hello" })).await;

  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert!(body["error"].as_str().unwrap().contains("disk full"));
}

#[tokio::test]
async fn missing_field_is_client_error() {
  let state = AppState::new(
    MemoryStore::default(),
    StubIndex::default(),
    StubGenerator::answering("unused"),
    settings(),
  );
  let req = Request::builder()
    .method("POST")
    .uri("/chat")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(r#"{"user_id":"u1"}"#))
    .unwrap();

  let resp = router(state).oneshot(req).await.unwrap();
  assert!(resp.status().is_client_error());
}

// ── GET /health ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_is_ok() {
  let state = AppState::new(
    MemoryStore::default(),
    StubIndex::default(),
    StubGenerator::answering("unused"),
    settings(),
  );
  let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

  let (status, body) = read_json(router(state).oneshot(req).await.unwrap()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "status": "ok" }));
}

// ── SQLite backends end to end ────────────────────────────────────────────────

/// Vectors of word-initial letter counts; good enough to rank short FAQs.
struct InitialsEmbedder;

impl Embedder for InitialsEmbedder {
  async fn embed_batch(&self, texts: &[String]) -> faqchat_index::Result<Vec<Vec<f32>>> {
    Ok(
      texts
        .iter()
        .map(|t| {
          let mut v = vec![0.0f32; 26];
          for word in t.split_whitespace() {
            if let Some(c) = word.chars().next().filter(char::is_ascii_alphabetic) {
              v[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
            }
          }
          v
        })
        .collect(),
    )
  }
}

#[tokio::test]
async fn sqlite_backends_full_request() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store.add_faq("How do I send an invoice", "Use the billing tab.").await.unwrap();
  store.add_faq("Where are my payouts", "Payouts arrive weekly.").await.unwrap();
  store.set_preference("u1", PROFESSION_KEY, "translator").await.unwrap();
  store
    .record_exchange(faqchat_core::exchange::NewExchange::new("u1", "hi", "hello"))
    .await
    .unwrap();

  let index = SqliteVectorIndex::open_in_memory(InitialsEmbedder).await.unwrap();
  let outcome = warm_up(&store, &index, WarmupPolicy::IfEmpty).await.unwrap();
  assert_eq!(outcome, WarmupOutcome::Rebuilt { entries: 2 });

  let state = AppState::new(store, index, StubGenerator::answering("Weekly."), settings());
  let (status, body) = post_chat(
    state.clone(),
    json!({ "user_id": "u1", "message": "when do payouts arrive" }),
  )
  .await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["answer"], "Weekly.");

  let prompt = state.generator.last_prompt().unwrap();
  let system = &prompt.messages[0].content;
  assert!(system.contains("The user is a Freelance translator."));
  assert!(system.contains("Where are my payouts"));
  assert_eq!(prompt.messages[1].content, "hi");
  assert_eq!(prompt.messages[2].content, "hello");

  assert_eq!(state.store.exchange_count("u1").await.unwrap(), 2);
}

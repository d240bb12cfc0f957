//! Handler for `POST /chat`.

use axum::{Json, extract::State};
use faqchat_core::{
  exchange::ChatInput,
  provider::{SimilaritySearch, TextGeneration},
  store::ChatStore,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError, pipeline};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
  pub user_id: String,
  pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
  pub answer: String,
}

/// `POST /chat`: 200 with some answer, or 500 when the exchange cannot be
/// stored.
pub async fn handler<S, I, G>(
  State(state): State<AppState<S, I, G>>,
  Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError>
where
  S: ChatStore,
  I: SimilaritySearch,
  G: TextGeneration,
{
  let input = ChatInput::new(body.user_id, body.message);

  let reply = pipeline::respond(
    state.store.as_ref(),
    state.index.as_ref(),
    state.generator.as_ref(),
    &state.settings,
    &input,
  )
  .await?;

  Ok(Json(ChatResponse { answer: reply.answer }))
}

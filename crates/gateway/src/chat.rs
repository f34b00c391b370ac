//! `POST /api/chat` — run the agent over a conversation and stream events.

use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{
        Json,
        sse::{Event as SseEvent, Sse},
    },
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use toolchat_agent::AgentStreamEvent;
use toolchat_core::ui::{UiMessage, convert_to_model_messages};
use tracing::{info, warn};

use crate::{ErrorResponse, SharedState};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<UiMessage>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Validate the body, then stream the run as SSE.
///
/// The run lives on its own task: a client that goes away stops receiving
/// events but the run continues until it finishes or the time budget ends.
pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected chat request");
        bad_request(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    if payload.messages.is_empty() {
        return Err(bad_request("messages must not be empty"));
    }

    let history = convert_to_model_messages(&payload.messages);
    info!(messages = history.len(), "Chat request");

    let (tx, rx) = mpsc::channel::<AgentStreamEvent>(128);
    let agent = state.agent.clone();
    let budget = state.max_duration;

    tokio::spawn(async move {
        let timeout_tx = tx.clone();
        if tokio::time::timeout(budget, agent.run(history, tx))
            .await
            .is_err()
        {
            warn!(budget_secs = budget.as_secs(), "Chat run exceeded time budget");
            let _ = timeout_tx
                .send(AgentStreamEvent::Error {
                    message: format!(
                        "Request exceeded the {}s time limit",
                        budget.as_secs()
                    ),
                })
                .await;
        }
    });

    let stream = ReceiverStream::new(rx).map(|event| {
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok(SseEvent::default().event(event.event_type()).data(data))
    });

    Ok(Sse::new(stream))
}

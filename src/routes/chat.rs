use std::convert::Infallible;

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json,
    },
};
use futures::stream::{self, Stream, StreamExt};

use crate::{
    dto::portal_dto::{ChatRequest, ChatResponse},
    error::{Error, Result},
    services::ai_service::{ChatChunk, AI_FAILURE_MESSAGE},
    utils::validation::validate,
    AppState,
};

const DONE_MARKER: &str = "[DONE]";

#[axum::debug_handler]
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse> {
    validate(&payload)?;
    let response = state.ai.complete(&payload.message).await.map_err(|e| {
        tracing::warn!(error = %e, "chat completion failed");
        Error::Upstream(AI_FAILURE_MESSAGE.into())
    })?;
    Ok(Json(ChatResponse { response }))
}

/// Streams the reply as server-sent events, one `data:` per token, always
/// closed by `data: [DONE]`.
#[axum::debug_handler]
pub async fn chat_stream(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    validate(&payload)?;
    let events = state
        .ai
        .stream_reply(payload.message)
        .flat_map(|chunk| stream::iter(chunk_events(chunk)))
        .map(Ok::<Event, Infallible>);
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn chunk_events(chunk: ChatChunk) -> Vec<Event> {
    match chunk {
        ChatChunk::Token(token) => vec![Event::default().data(token)],
        ChatChunk::Done => vec![Event::default().data(DONE_MARKER)],
        ChatChunk::Failed(reason) => {
            tracing::warn!(reason = %reason, "chat stream failed");
            vec![
                Event::default().event("error").data(AI_FAILURE_MESSAGE),
                Event::default().data(DONE_MARKER),
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_emits_error_then_done() {
        assert_eq!(chunk_events(ChatChunk::Failed("timeout".into())).len(), 2);
        assert_eq!(chunk_events(ChatChunk::Token("hi".into())).len(), 1);
        assert_eq!(chunk_events(ChatChunk::Done).len(), 1);
    }
}

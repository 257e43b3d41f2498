//! Chat assistant backed by an OpenAI-compatible `chat/completions` endpoint.

use std::time::Duration;

use bytes::{Buf, BytesMut};
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::Client;
use serde_json::{json, Value as JsonValue};

use crate::error::{Error, Result};

pub const AI_FAILURE_MESSAGE: &str = "Error generating response from AI.";

const SYSTEM_PROMPT: &str = "You are the assistant of a university placement cell. Help students \
    with placement drives, interview preparation, resumes and career questions. Keep answers \
    short and practical.";

/// One item of a streamed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatChunk {
    Token(String),
    Done,
    Failed(String),
}

#[derive(Clone)]
pub struct AIService {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl AIService {
    pub fn new(client: Client, api_key: Option<String>, model: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn payload(&self, message: &str, stream: bool) -> JsonValue {
        json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": message}
            ],
            "stream": stream
        })
    }

    async fn send(&self, message: &str, stream: bool) -> Result<reqwest::Response> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Upstream("AI assistant is not configured.".into()))?;

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&self.payload(message, stream));
        if !stream {
            request = request.timeout(Duration::from_secs(120));
        }
        let res = request.send().await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %text, "AI completion request rejected");
            return Err(Error::Upstream(AI_FAILURE_MESSAGE.into()));
        }
        Ok(res)
    }

    /// Single reply for `message`.
    pub async fn complete(&self, message: &str) -> Result<String> {
        let res = self.send(message, false).await?;
        let body: JsonValue = res.json().await?;
        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                tracing::warn!("AI completion response had no content");
                Error::Upstream(AI_FAILURE_MESSAGE.into())
            })
    }

    /// Token stream for `message`, always ending in exactly one `Done` or
    /// `Failed`. Dropping the stream abandons the upstream request.
    pub fn stream_reply(&self, message: String) -> BoxStream<'static, ChatChunk> {
        let service = self.clone();
        stream::once(async move { service.send(&message, true).await })
            .flat_map(|res| match res {
                Ok(response) => sse_chunks(response),
                Err(e) => {
                    tracing::warn!(error = %e, "AI stream could not start");
                    stream::iter(vec![ChatChunk::Failed(AI_FAILURE_MESSAGE.into())]).boxed()
                }
            })
            .boxed()
    }
}

/// A decoded line of the upstream event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    Token(String),
    Done,
    Skip,
}

/// Interprets one line of an OpenAI streaming response.
pub fn parse_sse_line(line: &str) -> SseLine {
    let line = line.trim_end_matches('\r');
    let Some(data) = line.strip_prefix("data:") else {
        return SseLine::Skip;
    };
    let data = data.trim_start();
    if data == "[DONE]" {
        return SseLine::Done;
    }
    serde_json::from_str::<JsonValue>(data)
        .ok()
        .and_then(|v| {
            v.get("choices")?
                .get(0)?
                .get("delta")?
                .get("content")?
                .as_str()
                .map(str::to_string)
        })
        .filter(|t| !t.is_empty())
        .map(SseLine::Token)
        .unwrap_or(SseLine::Skip)
}

struct SseState {
    body: BoxStream<'static, reqwest::Result<bytes::Bytes>>,
    buf: BytesMut,
    pending: std::collections::VecDeque<ChatChunk>,
    finished: bool,
}

/// Splits the response body on newlines. Lines are only decoded once
/// complete, so multi-byte characters split across reads stay intact.
fn sse_chunks(response: reqwest::Response) -> BoxStream<'static, ChatChunk> {
    let state = SseState {
        body: response.bytes_stream().boxed(),
        buf: BytesMut::new(),
        pending: Default::default(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(chunk) = state.pending.pop_front() {
                if matches!(chunk, ChatChunk::Done | ChatChunk::Failed(_)) {
                    state.finished = true;
                    state.pending.clear();
                }
                return Some((chunk, state));
            }
            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(bytes)) => {
                    state.buf.extend_from_slice(&bytes);
                    while let Some(pos) = state.buf.iter().position(|b| *b == b'\n') {
                        let line = state.buf.split_to(pos + 1);
                        let text = String::from_utf8_lossy(&line[..pos]);
                        match parse_sse_line(&text) {
                            SseLine::Token(t) => state.pending.push_back(ChatChunk::Token(t)),
                            SseLine::Done => {
                                state.pending.push_back(ChatChunk::Done);
                                break;
                            }
                            SseLine::Skip => {}
                        }
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "AI stream interrupted");
                    state
                        .pending
                        .push_back(ChatChunk::Failed(AI_FAILURE_MESSAGE.into()));
                }
                None => {
                    // Upstream closed without the end marker; flush what is left.
                    let rest = String::from_utf8_lossy(state.buf.chunk()).to_string();
                    state.buf.clear();
                    if let SseLine::Token(t) = parse_sse_line(&rest) {
                        state.pending.push_back(ChatChunk::Token(t));
                    }
                    state.pending.push_back(ChatChunk::Done);
                }
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_deltas_become_tokens() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hel"}}]}"#;
        assert_eq!(parse_sse_line(line), SseLine::Token("Hel".into()));
    }

    #[test]
    fn done_marker_is_recognised() {
        assert_eq!(parse_sse_line("data: [DONE]"), SseLine::Done);
        assert_eq!(parse_sse_line("data:[DONE]\r"), SseLine::Done);
    }

    #[test]
    fn role_only_and_blank_lines_are_skipped() {
        assert_eq!(parse_sse_line(""), SseLine::Skip);
        assert_eq!(parse_sse_line(": keep-alive"), SseLine::Skip);
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#),
            SseLine::Skip
        );
        assert_eq!(parse_sse_line("data: not json"), SseLine::Skip);
    }

    #[tokio::test]
    async fn unconfigured_assistant_fails_upstream() {
        let service = AIService::new(
            Client::new(),
            None,
            "gpt-4o-mini".into(),
            "http://127.0.0.1:9".into(),
        );
        let err = service.complete("hi").await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));

        let chunks: Vec<ChatChunk> = service.stream_reply("hi".into()).collect().await;
        assert_eq!(chunks, vec![ChatChunk::Failed(AI_FAILURE_MESSAGE.into())]);
    }
}

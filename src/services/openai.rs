//! OpenAI-compatible chat completions client.
//!
//! Only streaming requests are issued. The response body is a server-sent
//! event stream of `data: {chunk}` events terminated by `data: [DONE]`.

use crate::{Error, Result};
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::pin::pin;

/// Completion client configuration.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub base_url: String,
    pub proxy: Option<String>,
    pub model: String,
}

/// A chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Chat completions request payload.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
}

/// One streamed chunk.
#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// A piece of a streamed answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Answer text.
    Content(String),
    /// Refusal text.
    Refusal(String),
    /// The service reported an error inside the stream.
    Error(String),
    /// The stream is drained.
    Done,
}

/// Turn one SSE payload into fragments.
pub fn decode_payload(payload: &str) -> Result<Vec<Fragment>> {
    if payload == "[DONE]" {
        return Ok(vec![Fragment::Done]);
    }

    let chunk: ChatChunk = serde_json::from_str(payload)?;
    if let Some(error) = chunk.error {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Ok(vec![Fragment::Error(message)]);
    }

    let mut fragments = Vec::new();
    if let Some(delta) = chunk.choices.into_iter().next().and_then(|c| c.delta) {
        if let Some(content) = delta.content.filter(|c| !c.is_empty()) {
            fragments.push(Fragment::Content(content));
        }
        if let Some(refusal) = delta.refusal.filter(|r| !r.is_empty()) {
            fragments.push(Fragment::Refusal(refusal));
        }
    }
    Ok(fragments)
}

/// Chat completions client.
pub struct CompletionClient {
    config: CompletionConfig,
    client: reqwest::Client,
}

impl CompletionClient {
    /// Create a new client. No request is made until a stream is opened.
    pub fn new(config: CompletionConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        let client = builder.build()?;

        Ok(Self { config, client })
    }

    /// Configured model name.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Build a streaming request for the configured model.
    pub fn request(&self, system: String, user: String, response_format: Option<Value>) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            stream: true,
            response_format,
        }
    }

    /// Send a request and hand every fragment to `on_fragment` as it arrives.
    ///
    /// The last fragment is always [`Fragment::Done`], sent on `[DONE]` or
    /// when the body ends. Returning an error from the callback stops the
    /// stream.
    pub async fn stream_chat<F>(&self, request: &ChatRequest, on_fragment: F) -> Result<()>
    where
        F: FnMut(Fragment) -> Result<()>,
    {
        let url = self.endpoint();
        tracing::debug!("POST {} (model {})", url, request.model);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        drain_events(resp.bytes_stream(), on_fragment).await
    }
}

/// Decode an SSE byte stream and hand its fragments to `on_fragment`.
///
/// Multi-line `data:` fields of one event arrive joined by the event parser
/// and are decoded as a single payload.
async fn drain_events<S, B, E, F>(body: S, mut on_fragment: F) -> Result<()>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
    F: FnMut(Fragment) -> Result<()>,
{
    let mut events = pin!(body.eventsource());

    while let Some(event) = events.next().await {
        let event = event.map_err(|e| Error::StreamFailed(e.to_string()))?;
        if event.data.is_empty() {
            continue;
        }
        for fragment in decode_payload(&event.data)? {
            let done = fragment == Fragment::Done;
            on_fragment(fragment)?;
            if done {
                return Ok(());
            }
        }
    }

    tracing::debug!("Stream ended without [DONE]");
    on_fragment(Fragment::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use serde_json::json;
    use std::convert::Infallible;

    fn body(chunks: &[&'static str]) -> impl Stream<Item = std::result::Result<&'static [u8], Infallible>> {
        let chunks: Vec<_> = chunks.iter().map(|c| Ok(c.as_bytes())).collect();
        stream::iter(chunks)
    }

    async fn collect(chunks: &[&'static str]) -> Result<Vec<Fragment>> {
        let mut fragments = Vec::new();
        drain_events(body(chunks), |fragment| {
            fragments.push(fragment);
            Ok(())
        })
        .await?;
        Ok(fragments)
    }

    #[tokio::test]
    async fn test_events_split_across_chunks() {
        let fragments = collect(&[
            "data: {\"choices\":[{\"delta\":{\"con",
            "tent\":\"hi\"}}]}\n\ndata: [DONE]\n\n",
        ])
        .await
        .unwrap();
        assert_eq!(fragments, vec![Fragment::Content("hi".to_string()), Fragment::Done]);
    }

    #[tokio::test]
    async fn test_multi_line_data_is_one_payload() {
        let fragments = collect(&[
            "data: {\"choices\":[{\"delta\":\ndata: {\"content\":\"hi\"}}]}\n\n",
            "data: [DONE]\n\n",
        ])
        .await
        .unwrap();
        assert_eq!(fragments, vec![Fragment::Content("hi".to_string()), Fragment::Done]);
    }

    #[tokio::test]
    async fn test_comments_and_event_names_are_ignored() {
        let fragments = collect(&[
            ": keep-alive\r\n\r\nevent: message\r\ndata: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\r\n\r\n",
        ])
        .await
        .unwrap();
        assert_eq!(fragments, vec![Fragment::Content("x".to_string()), Fragment::Done]);
    }

    #[tokio::test]
    async fn test_events_after_done_are_dropped() {
        let fragments = collect(&[
            "data: [DONE]\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n\n",
        ])
        .await
        .unwrap();
        assert_eq!(fragments, vec![Fragment::Done]);
    }

    #[tokio::test]
    async fn test_malformed_event_fails_the_stream() {
        assert!(collect(&["data: {not json\n\n"]).await.is_err());
    }

    #[test]
    fn test_decode_content_chunk() {
        let payload = r#"{"id":"1","choices":[{"index":0,"delta":{"role":"assistant","content":"{\"files\""}}]}"#;
        assert_eq!(
            decode_payload(payload).unwrap(),
            vec![Fragment::Content("{\"files\"".to_string())]
        );
    }

    #[test]
    fn test_decode_refusal_chunk() {
        let payload = r#"{"choices":[{"delta":{"content":null,"refusal":"I can't"}}]}"#;
        assert_eq!(
            decode_payload(payload).unwrap(),
            vec![Fragment::Refusal("I can't".to_string())]
        );
    }

    #[test]
    fn test_decode_empty_and_final_chunks() {
        assert!(decode_payload(r#"{"choices":[]}"#).unwrap().is_empty());
        assert!(decode_payload(r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#)
            .unwrap()
            .is_empty());
        assert_eq!(decode_payload("[DONE]").unwrap(), vec![Fragment::Done]);
    }

    #[test]
    fn test_decode_error_chunk() {
        let payload = r#"{"error":{"message":"rate limited","type":"requests"}}"#;
        assert_eq!(
            decode_payload(payload).unwrap(),
            vec![Fragment::Error("rate limited".to_string())]
        );
    }

    #[test]
    fn test_decode_malformed_chunk() {
        assert!(decode_payload("{not json").is_err());
    }

    #[test]
    fn test_request_body() {
        let client = CompletionClient::new(CompletionConfig {
            api_key: "key".to_string(),
            base_url: "https://api.example.com/v1/".to_string(),
            proxy: None,
            model: "gpt-4o".to_string(),
        })
        .unwrap();

        assert_eq!(client.endpoint(), "https://api.example.com/v1/chat/completions");

        let request = client.request("sys".to_string(), "usr".to_string(), None);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "usr"}
                ],
                "stream": true
            })
        );
    }
}

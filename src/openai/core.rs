use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use futures::stream::BoxStream;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionChunkChoice {
    #[serde(default)]
    delta: Delta,
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamErrorBody {
    message: String,
}

// Providers add their own metadata (`x_groq`, `usage`,
// `system_fingerprint`) which is ignored
#[derive(Debug, Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<CompletionChunkChoice>,
    #[serde(default)]
    error: Option<StreamErrorBody>,
}

/// One `data:` payload of the server sent event stream.
#[derive(Debug, PartialEq)]
pub enum StreamData {
    /// A chunk with or without a text delta
    Delta(Option<String>),
    Done,
}

/// Parse the payload of a single `data:` line into the text delta it
/// carries.
pub fn parse_stream_data(data: &str) -> Result<StreamData, Error> {
    if data == "[DONE]" {
        return Ok(StreamData::Done);
    }

    let chunk = serde_json::from_str::<CompletionChunk>(data).inspect_err(|e| {
        tracing::error!("Parsing completion chunk failed for {}\nError:{}", data, e)
    })?;

    if let Some(err) = chunk.error {
        return Err(anyhow!("Completion stream error: {}", err.message));
    }

    // Empty content strings are treated the same as a missing delta
    let content = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty());

    Ok(StreamData::Delta(content))
}

/// Find the end of the first complete event in `buffer`. Returns the
/// position of the blank line and the length of the separator.
fn find_event_end(buffer: &[u8]) -> Option<(usize, usize)> {
    (0..buffer.len()).find_map(|i| {
        let rest = &buffer[i..];
        if rest.starts_with(b"\r\n\r\n") {
            Some((i, 4))
        } else if rest.starts_with(b"\n\n") {
            Some((i, 2))
        } else {
            None
        }
    })
}

/// Request a streamed chat completion from an OpenAI compatible API
/// and return a stream of the text deltas in the order they arrive.
pub fn completion_stream(
    messages: &[Message],
    api_hostname: &str,
    api_key: &str,
    model: &str,
) -> BoxStream<'static, Result<String, Error>> {
    let payload = json!({
        "model": model,
        "messages": messages,
        "stream": true,
    });
    let url = format!("{}/v1/chat/completions", api_hostname.trim_end_matches("/"));
    let api_key = api_key.to_string();

    Box::pin(async_stream::try_stream! {
        let response = reqwest::Client::new()
            .post(url)
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(60 * 5))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let response = if status.is_success() {
            response
        } else {
            let body = response.text().await.unwrap_or_default();
            Err::<reqwest::Response, Error>(anyhow!(
                "Completion request failed with status {}: {}",
                status,
                body
            ))?
        };

        let mut stream = response.bytes_stream();

        // Bytes are buffered until a full event is received since SSE
        // events (and multi-byte characters) can be split across
        // frames
        let mut buffer: Vec<u8> = Vec::new();

        'outer: while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            buffer.extend_from_slice(&chunk);

            while let Some((event_end, separator)) = find_event_end(&buffer) {
                let event: Vec<u8> = buffer.drain(..event_end + separator).collect();
                let event = std::str::from_utf8(&event[..event_end])?;

                for line in event.lines() {
                    let Some(data) = line.trim().strip_prefix("data:") else {
                        continue;
                    };
                    let data = data.trim();

                    // Data can sometimes be empty
                    if data.is_empty() {
                        continue;
                    }

                    match parse_stream_data(data)? {
                        StreamData::Done => break 'outer,
                        StreamData::Delta(Some(content)) => yield content,
                        StreamData::Delta(None) => {}
                    }
                }
            }
        }
    })
}

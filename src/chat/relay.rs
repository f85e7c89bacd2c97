use futures_util::StreamExt;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::openai::{CompletionProvider, DeltaStream, Message};

/// Events sent to whoever is rendering a response as it streams in.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    Delta { content: String },
    Done { content: String },
    Error { message: String },
}

#[derive(Debug, Error)]
pub enum ChatError {
    /// The completion call failed. `partial` holds whatever text was
    /// already relayed before the failure.
    #[error("Technical error: {source}")]
    Completion {
        partial: String,
        source: anyhow::Error,
    },
}

impl ChatError {
    pub fn partial(&self) -> &str {
        match self {
            ChatError::Completion { partial, .. } => partial,
        }
    }
}

/// Consume the stream of deltas in arrival order, forwarding each one
/// to `tx` and returning the concatenated text.
pub async fn relay(
    mut stream: DeltaStream,
    tx: &mpsc::UnboundedSender<ChatEvent>,
) -> Result<String, ChatError> {
    let mut content = String::new();

    while let Some(delta) = stream.next().await {
        match delta {
            Ok(delta) => {
                content.push_str(&delta);
                // The receiver going away (e.g. a client disconnect)
                // doesn't stop the response from being collected
                let _ = tx.send(ChatEvent::Delta { content: delta });
            }
            Err(source) => {
                tracing::error!("Completion stream failed: {}", source);
                return Err(ChatError::Completion {
                    partial: content,
                    source,
                });
            }
        }
    }

    Ok(content)
}

/// Request the next assistant response for `messages` and relay it.
pub async fn run_turn(
    provider: &dyn CompletionProvider,
    messages: &[Message],
    tx: &mpsc::UnboundedSender<ChatEvent>,
) -> Result<String, ChatError> {
    relay(provider.stream(messages), tx).await
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use futures::stream;

    use super::*;

    fn deltas(items: Vec<anyhow::Result<String>>) -> DeltaStream {
        Box::pin(stream::iter(items))
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ChatEvent>) -> Vec<ChatEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_relay_concatenates_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stream = deltas(vec![
            Ok("Rotate".to_string()),
            Ok(" your".to_string()),
            Ok(" keys".to_string()),
        ]);

        let content = relay(stream, &tx).await.unwrap();
        assert_eq!(content, "Rotate your keys");

        let relayed: String = drain(&mut rx)
            .into_iter()
            .map(|event| match event {
                ChatEvent::Delta { content } => content,
                other => panic!("Unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(relayed, content);
    }

    #[tokio::test]
    async fn test_relay_empty_stream() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let content = relay(deltas(vec![]), &tx).await.unwrap();
        assert_eq!(content, "");
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_relay_error_keeps_partial() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stream = deltas(vec![
            Ok("Hel".to_string()),
            Ok("lo".to_string()),
            Err(anyhow!("connection reset")),
            Ok("ignored".to_string()),
        ]);

        let err = relay(stream, &tx).await.unwrap_err();
        assert_eq!(err.partial(), "Hello");
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(
            drain(&mut rx),
            vec![
                ChatEvent::Delta {
                    content: "Hel".to_string()
                },
                ChatEvent::Delta {
                    content: "lo".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_relay_continues_when_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let stream = deltas(vec![Ok("a".to_string()), Ok("b".to_string())]);
        assert_eq!(relay(stream, &tx).await.unwrap(), "ab");
    }

    #[test]
    fn test_chat_event_serialization() {
        let event = ChatEvent::Delta {
            content: "hi".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"type":"delta","content":"hi"}"#
        );
        let event = ChatEvent::Error {
            message: "boom".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"type":"error","message":"boom"}"#
        );
    }
}

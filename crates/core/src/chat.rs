//! Support chat with a canned fallback.
//!
//! The assistant is best-effort: any backend failure degrades to a fixed
//! reply and is never surfaced to the caller.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::metrics;
use crate::sync::Backend;

/// Reply used when the assistant cannot be reached.
pub const FALLBACK_REPLY: &str = "Thank you for your message. Our support team will get back to you shortly. In the meantime, you can create a support ticket for detailed assistance.";

/// Reply used when the assistant answers with an empty message.
pub const EMPTY_REPLY: &str = "I understand your concern. Let me help you with that.";

/// A chat question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

/// A chat answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatReply {
    pub response: String,
    /// True if `response` is the canned fallback.
    pub fallback: bool,
}

impl ChatReply {
    fn fallback() -> Self {
        metrics::CHAT_REPLIES.with_label_values(&["fallback"]).inc();
        Self {
            response: FALLBACK_REPLY.to_string(),
            fallback: true,
        }
    }
}

/// Ask the assistant, falling back to the canned reply on any failure.
///
/// `backend` is `None` when no backend is configured.
pub async fn ask(backend: Option<&dyn Backend>, query: &str) -> ChatReply {
    let query = query.trim();
    let Some(backend) = backend else {
        debug!("No chat backend configured, using fallback");
        return ChatReply::fallback();
    };
    if query.is_empty() {
        return ChatReply::fallback();
    }

    match backend.chat(query).await {
        Ok(response) => {
            metrics::CHAT_REPLIES.with_label_values(&["assistant"]).inc();
            let response = if response.trim().is_empty() {
                EMPTY_REPLY.to_string()
            } else {
                response
            };
            ChatReply {
                response,
                fallback: false,
            }
        }
        Err(e) => {
            warn!(backend = backend.name(), "Chat request failed, using fallback: {}", e);
            ChatReply::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SyncError;
    use crate::testing::{MockBackend, MOCK_CHAT_REPLY};

    #[tokio::test]
    async fn test_assistant_reply() {
        let backend = MockBackend::new();
        let reply = ask(Some(&backend), "My phone won't charge").await;

        assert_eq!(reply.response, MOCK_CHAT_REPLY);
        assert!(!reply.fallback);
        assert_eq!(backend.chat_queries().await, vec!["My phone won't charge"]);
    }

    #[tokio::test]
    async fn test_backend_error_uses_fallback() {
        let backend = MockBackend::new();
        backend.set_next_error(SyncError::Timeout).await;

        let reply = ask(Some(&backend), "Hello").await;
        assert_eq!(reply.response, FALLBACK_REPLY);
        assert!(reply.fallback);
    }

    #[tokio::test]
    async fn test_empty_assistant_answer() {
        let backend = MockBackend::new();
        backend.set_chat_reply("").await;

        let reply = ask(Some(&backend), "Hello").await;
        assert_eq!(reply.response, EMPTY_REPLY);
        assert!(!reply.fallback);
    }

    #[tokio::test]
    async fn test_no_backend_or_blank_query() {
        assert!(ask(None, "Hello").await.fallback);

        let backend = MockBackend::new();
        assert!(ask(Some(&backend), "   ").await.fallback);
        assert!(backend.chat_queries().await.is_empty());
    }
}

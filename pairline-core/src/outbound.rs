//! Outbound text messages
//!
//! Validates a send request against the session and the caller's input,
//! normalizes the destination into a chat id and hands it to the adapter.
//! Nothing is retried; a failed send is reported to the caller as is.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::adapter::{SentMessage, SessionAdapter};
use crate::error::SendError;
use crate::session::SessionStore;

/// Suffix that turns a phone number into a direct chat id
pub const CHAT_ID_SUFFIX: &str = "@c.us";

/// Send request as received from a caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessageRequest {
    /// Destination phone number or chat id
    #[serde(default)]
    pub number: Option<String>,
    /// Message text
    #[serde(default)]
    pub message: Option<String>,
}

impl OutboundMessageRequest {
    pub fn new(number: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            number: Some(number.into()),
            message: Some(message.into()),
        }
    }
}

/// Append the chat id suffix unless the destination already carries it
pub fn normalize_destination(number: &str) -> String {
    let number = number.trim();
    if number.contains(CHAT_ID_SUFFIX) {
        number.to_string()
    } else {
        format!("{}{}", number, CHAT_ID_SUFFIX)
    }
}

/// Validate and deliver one outbound message
///
/// Readiness is checked before the request body, and the adapter is not
/// touched unless both pass. With `timeout` set, a send that does not
/// complete in time fails; the adapter call itself is not cancelled
/// upstream.
pub async fn send_message(
    store: &SessionStore,
    adapter: &dyn SessionAdapter,
    request: OutboundMessageRequest,
    timeout: Option<Duration>,
) -> Result<SentMessage, SendError> {
    if !store.is_ready().await {
        return Err(SendError::NotReady);
    }

    let (number, message) = match (request.number, request.message) {
        (Some(number), Some(message)) if !number.trim().is_empty() && !message.is_empty() => {
            (number, message)
        }
        _ => {
            return Err(SendError::InvalidRequest(
                "number and message are required".to_string(),
            ));
        }
    };

    let chat_id = normalize_destination(&number);
    let send = adapter.send_message(&chat_id, &message);
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, send)
            .await
            .map_err(|_| SendError::Timeout(limit))?,
        None => send.await,
    };

    match result {
        Ok(sent) => {
            info!(chat_id = %chat_id, message_id = %sent.id, "Message sent");
            Ok(sent)
        }
        Err(e) => {
            error!(chat_id = %chat_id, "Failed to send message: {}", e);
            Err(SendError::Failed(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MockAdapter;
    use crate::error::ErrorKind;
    use crate::session::LifecycleEvent;

    async fn ready_store() -> SessionStore {
        let store = SessionStore::new();
        store.apply(LifecycleEvent::Ready(None)).await.unwrap();
        store
    }

    // ==================== Normalization Tests ====================

    #[test]
    fn normalize_appends_suffix() {
        assert_eq!(normalize_destination("5551234567"), "5551234567@c.us");
    }

    #[test]
    fn normalize_keeps_existing_suffix() {
        assert_eq!(normalize_destination("5551234567@c.us"), "5551234567@c.us");
    }

    #[test]
    fn normalize_trims_whitespace() {
        assert_eq!(normalize_destination(" 5551234567 "), "5551234567@c.us");
    }

    // ==================== Send Tests ====================

    #[tokio::test]
    async fn not_ready_never_invokes_adapter() {
        let store = SessionStore::new();
        let adapter = MockAdapter::new();

        for state in [
            LifecycleEvent::PairingCode("ABC".into()),
            LifecycleEvent::Authenticated,
            LifecycleEvent::Disconnected("LOGOUT".into()),
            LifecycleEvent::AuthFailed("bad".into()),
        ] {
            store.apply(state).await.unwrap();
            let result = send_message(
                &store,
                &adapter,
                OutboundMessageRequest::new("5551234567", "hi"),
                None,
            )
            .await;
            assert!(matches!(result, Err(SendError::NotReady)));
        }

        assert_eq!(adapter.send_count(), 0);
    }

    #[tokio::test]
    async fn not_ready_wins_over_invalid_request() {
        let store = SessionStore::new();
        let adapter = MockAdapter::new();

        let result = send_message(&store, &adapter, OutboundMessageRequest::default(), None).await;

        assert_eq!(result.unwrap_err().kind(), ErrorKind::NotReady);
    }

    #[tokio::test]
    async fn missing_fields_are_invalid() {
        let store = ready_store().await;
        let adapter = MockAdapter::new();

        let cases = vec![
            OutboundMessageRequest::default(),
            OutboundMessageRequest {
                number: Some("5551234567".into()),
                message: None,
            },
            OutboundMessageRequest::new("", "hi"),
            OutboundMessageRequest::new("5551234567", ""),
        ];

        for request in cases {
            let result = send_message(&store, &adapter, request, None).await;
            assert!(matches!(result, Err(SendError::InvalidRequest(_))));
        }
        assert_eq!(adapter.send_count(), 0);
    }

    #[tokio::test]
    async fn ready_send_normalizes_and_returns_id() {
        let store = ready_store().await;
        let adapter = MockAdapter::new();

        let sent = send_message(
            &store,
            &adapter,
            OutboundMessageRequest::new("5551234567", "hi"),
            None,
        )
        .await
        .unwrap();

        assert_eq!(
            adapter.sent_messages(),
            vec![("5551234567@c.us".to_string(), "hi".to_string())]
        );
        assert!(!sent.id.is_empty());
    }

    #[tokio::test]
    async fn adapter_failure_is_send_failure() {
        let store = ready_store().await;
        let adapter = MockAdapter::new();
        adapter.queue_send_failure("chat not found");

        let result = send_message(
            &store,
            &adapter,
            OutboundMessageRequest::new("5551234567", "hi"),
            None,
        )
        .await;

        let error = result.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::SendFailure);
        assert!(error.to_string().contains("chat not found"));
        assert_eq!(adapter.send_count(), 1);
    }

    #[tokio::test]
    async fn slow_send_times_out_when_bounded() {
        let store = ready_store().await;
        let adapter = MockAdapter::new();
        adapter.set_send_delay(Duration::from_millis(200));

        let result = send_message(
            &store,
            &adapter,
            OutboundMessageRequest::new("5551234567", "hi"),
            Some(Duration::from_millis(20)),
        )
        .await;

        assert!(matches!(result, Err(SendError::Timeout(_))));
    }

    #[test]
    fn request_deserializes_with_missing_fields() {
        let request: OutboundMessageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, OutboundMessageRequest::default());
    }
}

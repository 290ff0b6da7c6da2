//! WebSocket test client for the real-time channel
//!
//! Note: Some methods may appear unused because they're only used in specific
//! test files and clippy checks each test independently.

use std::net::SocketAddr;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Low-level WebSocket connection
pub struct WsConnection {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

#[allow(dead_code)]
impl WsConnection {
    /// Connect to the real-time endpoint
    pub async fn connect(addr: SocketAddr) -> Self {
        let url = format!("ws://{}/ws", addr);
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("Failed to connect");
        let (sink, stream) = ws.split();
        Self { sink, stream }
    }

    /// Send raw text message
    pub async fn send_raw(&mut self, msg: &str) {
        self.sink
            .send(Message::Text(msg.to_string().into()))
            .await
            .unwrap();
    }

    /// Receive raw text message
    pub async fn recv_raw(&mut self) -> String {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return text.to_string(),
                Some(Ok(_)) => continue,
                Some(Err(e)) => panic!("WebSocket error: {}", e),
                None => panic!("WebSocket closed"),
            }
        }
    }

    /// Receive with timeout, returns None if timeout
    pub async fn recv_timeout(&mut self, duration: Duration) -> Option<String> {
        tokio::time::timeout(duration, self.recv_raw()).await.ok()
    }

    pub async fn close(mut self) {
        let _ = self.sink.send(Message::Close(None)).await;
    }
}

/// High-level client that understands `{event, data}` frames
pub struct TestClient {
    pub conn: WsConnection,
}

#[allow(dead_code)]
impl TestClient {
    /// Connect and consume the initial `status` frame
    pub async fn connect(addr: SocketAddr) -> (Self, Value) {
        let mut client = Self::connect_raw(addr).await;
        let status = client.expect_event("status").await;
        (client, status)
    }

    /// Connect without consuming anything
    pub async fn connect_raw(addr: SocketAddr) -> Self {
        Self {
            conn: WsConnection::connect(addr).await,
        }
    }

    /// Receive the next frame as `(event, data)`
    pub async fn recv(&mut self) -> (String, Value) {
        let text = self
            .conn
            .recv_timeout(Duration::from_secs(2))
            .await
            .expect("Timed out waiting for event");
        let frame: Value = serde_json::from_str(&text).expect("Failed to parse JSON");
        let event = frame["event"]
            .as_str()
            .expect("frame has no event name")
            .to_string();
        (event, frame["data"].clone())
    }

    /// Receive the next frame and assert its event name, returning its data
    pub async fn expect_event(&mut self, name: &str) -> Value {
        let (event, data) = self.recv().await;
        assert_eq!(event, name, "Expected {} but got {} ({})", name, event, data);
        data
    }

    /// Assert no message received within duration
    pub async fn expect_no_message(&mut self, duration: Duration) {
        assert!(
            self.conn.recv_timeout(duration).await.is_none(),
            "Expected no message but received one"
        );
    }
}

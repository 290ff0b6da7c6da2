//! Automation bridge adapter
//!
//! The bridge is a sidecar process that owns the automated browser session.
//! Control calls go over its HTTP API; lifecycle events arrive on a
//! WebSocket at `{url}/session/events` as `{ "event": ..., "data": ... }`
//! text frames.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::config::BridgeConfig;
use super::traits::{AdapterEvent, SentMessage, SessionAdapter};
use crate::error::{AdapterError, ErrorKind};

/// Header carrying the bridge API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reason reported when the event stream ends without a `destroy`
pub const CONNECTION_LOST_REASON: &str = "bridge connection lost";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const EVENT_CHANNEL_CAPACITY: usize = 64;
const MAX_ERROR_BODY: usize = 500;

type EventStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Deserialize)]
struct StateResponse {
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: MessageId,
}

/// Bridges either return a plain id or the engine's serialized id object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageId {
    Plain(String),
    Serialized {
        #[serde(rename = "_serialized")]
        serialized: String,
    },
}

impl MessageId {
    fn into_string(self) -> String {
        match self {
            MessageId::Plain(id) => id,
            MessageId::Serialized { serialized } => serialized,
        }
    }
}

/// Event stream reader started by one `initialize`
struct EventListener {
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

/// SessionAdapter backed by an automation bridge
///
/// The adapter can be initialized again after `destroy`; each initialization
/// opens a new event stream.
pub struct BridgeAdapter {
    config: BridgeConfig,
    http: Client,
    tx: broadcast::Sender<AdapterEvent>,
    listener: Mutex<Option<EventListener>>,
}

impl BridgeAdapter {
    /// Create an adapter for the bridge described by `config`
    ///
    /// Nothing is contacted until [`initialize`](SessionAdapter::initialize).
    pub fn new(config: BridgeConfig) -> Result<Self, AdapterError> {
        Url::parse(&config.url).map_err(|e| {
            AdapterError::Config(format!("invalid bridge url '{}': {}", config.url, e))
        })?;

        let http = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            config,
            http,
            tx,
            listener: Mutex::new(None),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.url.trim_end_matches('/'), path)
    }

    /// Event stream URL: the HTTP endpoint with a ws/wss scheme
    fn events_url(&self) -> Result<Url, AdapterError> {
        let mut url = Url::parse(&self.endpoint("session/events"))
            .map_err(|e| AdapterError::Config(e.to_string()))?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme).map_err(|_| {
            AdapterError::Config(format!(
                "cannot derive event stream url from '{}'",
                self.config.url
            ))
        })?;
        Ok(url)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.endpoint(path));
        match &self.config.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }

    async fn connect_events(&self) -> Result<EventListener, AdapterError> {
        let url = self.events_url()?;
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| AdapterError::Connect(e.to_string()))?;
        if let Some(key) = &self.config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| AdapterError::Config(format!("invalid api key: {}", e)))?;
            request.headers_mut().insert(API_KEY_HEADER, value);
        }

        let (stream, _response) = connect_async(request)
            .await
            .map_err(|e| AdapterError::Connect(e.to_string()))?;
        info!(url = %url, "Connected to bridge event stream");

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(forward_events(stream, self.tx.clone(), shutdown.clone()));
        Ok(EventListener { shutdown, handle })
    }

    async fn start_session(&self) -> Result<(), AdapterError> {
        let body = json!({
            "clientId": self.config.client_id,
            "dataPath": self.config.data_path.to_string_lossy(),
            "headless": self.config.headless,
            "args": self.config.browser_args,
        });

        let response = self
            .request(Method::POST, "session")
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Stop forwarding events; a stream ending after this is not a disconnect
    fn stop_listener(&self) {
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(listener) = listener {
            listener.shutdown.cancel();
            debug!(
                finished = listener.handle.is_finished(),
                "Bridge event listener stopped"
            );
        }
    }
}

#[async_trait]
impl SessionAdapter for BridgeAdapter {
    async fn initialize(&self) -> Result<(), AdapterError> {
        self.stop_listener();
        let listener = self.connect_events().await?;
        *self.listener.lock().unwrap_or_else(|e| e.into_inner()) = Some(listener);

        if let Err(e) = self.start_session().await {
            self.stop_listener();
            return Err(e);
        }

        info!(client_id = %self.config.client_id, "Bridge session started");
        Ok(())
    }

    async fn destroy(&self) -> Result<(), AdapterError> {
        self.stop_listener();

        let response = self.request(Method::DELETE, "session").send().await?;
        check_status(response).await?;

        info!(client_id = %self.config.client_id, "Bridge session destroyed");
        Ok(())
    }

    async fn get_state(&self) -> Result<String, AdapterError> {
        let response = self.request(Method::GET, "session/state").send().await?;
        let body: StateResponse = check_status(response).await?.json().await?;
        body.state
            .ok_or_else(|| AdapterError::Protocol("bridge reported no session state".to_string()))
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<SentMessage, AdapterError> {
        let response = self
            .request(Method::POST, "session/messages")
            .json(&json!({ "chatId": chat_id, "text": text }))
            .send()
            .await?;
        let body: SendResponse = check_status(response).await?.json().await?;

        Ok(SentMessage {
            id: body.id.into_string(),
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<AdapterEvent> {
        self.tx.subscribe()
    }
}

/// Turn a non-2xx response into `AdapterError::Rejected`
async fn check_status(response: Response) -> Result<Response, AdapterError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AdapterError::Rejected {
        status: status.as_u16(),
        body: body.chars().take(MAX_ERROR_BODY).collect(),
    })
}

/// Read bridge frames until shutdown or until the stream ends
async fn forward_events(
    mut stream: EventStream,
    tx: broadcast::Sender<AdapterEvent>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => forward_frame(text.as_str(), &tx),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("Bridge event stream error: {}", e);
                    break;
                }
            }
        }
    }

    if !shutdown.is_cancelled() {
        warn!("Bridge event stream ended unexpectedly");
        let _ = tx.send(AdapterEvent::Disconnected(
            CONNECTION_LOST_REASON.to_string(),
        ));
    }
}

fn forward_frame(text: &str, tx: &broadcast::Sender<AdapterEvent>) {
    match serde_json::from_str::<AdapterEvent>(text) {
        Ok(event) => {
            debug!(?event, "Bridge event");
            // No receivers only means nothing is listening yet
            let _ = tx.send(event);
        }
        Err(e) => warn!(
            kind = %ErrorKind::AdapterFault,
            "Dropping unrecognised bridge frame: {}", e
        ),
    }
}

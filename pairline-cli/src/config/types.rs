use std::path::PathBuf;
use std::time::Duration;

use pairline_core::BridgeConfig;
use pairline_core::adapter::config::{DEFAULT_BRIDGE_URL, DEFAULT_BROWSER_ARGS, DEFAULT_CLIENT_ID};
use serde::{Deserialize, Serialize};

/// Default port for the pairline server
pub const DEFAULT_PORT: u16 = 3000;

/// Default host for the pairline server
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPairlineConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub adapter: RawAdapterConfig,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Adapter config as stored in TOML
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawAdapterConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub client_id: Option<String>,
    pub headless: Option<bool>,
    pub browser_args: Option<Vec<String>>,
    pub data_path: Option<PathBuf>,
    pub send_timeout_secs: Option<u64>,
    pub identity_timeout_secs: Option<u64>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PairlineConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub adapter: AdapterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port for the pairline server
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdapterConfig {
    /// Base URL of the automation bridge
    pub url: String,

    /// Sent as `x-api-key` on every bridge request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Identifier the bridge stores the linked session under
    pub client_id: String,

    /// Run the automated browser without a window
    pub headless: bool,

    /// Extra browser launch arguments
    pub browser_args: Vec<String>,

    /// Where the bridge persists the session; defaults to the data dir
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,

    /// Upper bound on a single outbound send
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_timeout_secs: Option<u64>,

    /// How long `ready` waits for the session identity; 10s when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_timeout_secs: Option<u64>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BRIDGE_URL.to_string(),
            api_key: None,
            client_id: DEFAULT_CLIENT_ID.to_string(),
            headless: true,
            browser_args: DEFAULT_BROWSER_ARGS.iter().map(|s| s.to_string()).collect(),
            data_path: None,
            send_timeout_secs: None,
            identity_timeout_secs: None,
        }
    }
}

impl PairlineConfig {
    /// Bridge settings for the session adapter
    pub fn bridge_config(&self) -> BridgeConfig {
        let mut bridge = BridgeConfig::new(self.adapter.url.clone());
        bridge.api_key = self.adapter.api_key.clone();
        bridge.client_id = self.adapter.client_id.clone();
        bridge.headless = self.adapter.headless;
        bridge.browser_args = self.adapter.browser_args.clone();
        if let Some(path) = &self.adapter.data_path {
            bridge.data_path = path.clone();
        }
        bridge
    }

    /// Settings for the HTTP/WebSocket server
    pub fn server_config(&self) -> pairline_server::ServerConfig {
        let mut server = pairline_server::ServerConfig::new(&self.server.host, self.server.port);
        server.send_timeout = self.adapter.send_timeout_secs.map(Duration::from_secs);
        if let Some(secs) = self.adapter.identity_timeout_secs {
            server.identity_timeout = Duration::from_secs(secs);
        }
        server
    }
}

//! Bridge adapter configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default bridge base URL
pub const DEFAULT_BRIDGE_URL: &str = "http://127.0.0.1:3100";

/// Default identifier under which the bridge persists the linked session
pub const DEFAULT_CLIENT_ID: &str = "whatsapp-web-server";

/// Browser flags suited to running headless inside containers
pub const DEFAULT_BROWSER_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--no-first-run",
    "--no-zygote",
    "--disable-gpu",
];

/// Connection and browser settings for the automation bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Base URL of the bridge HTTP API
    pub url: String,
    /// Sent as `x-api-key` when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Identifier of the persisted session
    pub client_id: String,
    /// Run the browser without a window
    pub headless: bool,
    /// Extra browser command-line flags
    pub browser_args: Vec<String>,
    /// Where the bridge keeps session data
    pub data_path: PathBuf,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BRIDGE_URL.to_string(),
            api_key: None,
            client_id: DEFAULT_CLIENT_ID.to_string(),
            headless: true,
            browser_args: DEFAULT_BROWSER_ARGS.iter().map(|s| s.to_string()).collect(),
            data_path: pairline_paths::session_dir(),
        }
    }
}

impl BridgeConfig {
    /// Create a config for the bridge at `url` with default browser settings
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

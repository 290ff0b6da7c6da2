//! pairline serve command
//!
//! Runs the gateway in the foreground: connects the bridge adapter, then
//! serves the HTTP API, the `/ws` event channel and the landing page until
//! interrupted.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use pairline_core::BridgeAdapter;
use pairline_server::PairlineServer;
use tracing::info;

use crate::config::{ConfigLoader, PairlineConfig};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Base URL of the automation bridge
    #[arg(long)]
    pub bridge_url: Option<String>,
}

impl ServeArgs {
    /// Command-line flags take precedence over every config layer
    fn apply(&self, config: &mut PairlineConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = &self.bridge_url {
            config.adapter.url = url.clone();
        }
    }
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let mut config = ConfigLoader::load()?;
    args.apply(&mut config);

    let bridge = config.bridge_config();
    info!(
        bridge = %bridge.url,
        client_id = %bridge.client_id,
        "Starting pairline server on {}:{}",
        config.server.host,
        config.server.port
    );

    let adapter = BridgeAdapter::new(bridge).context("Invalid bridge configuration")?;
    let server = PairlineServer::new(config.server_config(), Arc::new(adapter));
    server.run().await?;

    Ok(())
}

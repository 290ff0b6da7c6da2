//! pairline status command

use anyhow::Result;
use clap::Args;
use pairline_core::SessionSnapshot;

use crate::client::ApiClient;
use crate::config::ConfigLoader;

/// Arguments for the status command
#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Server URL (defaults to the configured local port)
    #[arg(long)]
    pub url: Option<String>,
}

/// Build a client for `--url`, or the configured local server
pub fn client_for(url: Option<String>) -> Result<ApiClient> {
    match url {
        Some(url) => Ok(ApiClient::new(url)),
        None => Ok(ApiClient::local(ConfigLoader::load()?.server.port)),
    }
}

pub async fn run(args: StatusArgs) -> Result<()> {
    let client = client_for(args.url)?;
    let snapshot = client.status().await?;
    print!("{}", render(client.base_url(), &snapshot));
    Ok(())
}

fn render(base_url: &str, snapshot: &SessionSnapshot) -> String {
    let state = if snapshot.is_ready {
        "ready"
    } else if snapshot.has_qr {
        "waiting for QR scan"
    } else {
        "not ready"
    };

    let mut out = format!("Server:     {}\nSession:    {}\n", base_url, state);
    if let Some(info) = &snapshot.client_info {
        out.push_str(&format!(
            "Connection: {} (since {})\n",
            info.state,
            info.timestamp.to_rfc3339()
        ));
    }
    out
}

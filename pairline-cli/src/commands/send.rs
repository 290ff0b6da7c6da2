//! pairline send command

use anyhow::Result;
use clap::Args;

use super::status::client_for;

/// Arguments for the send command
#[derive(Debug, Args)]
pub struct SendArgs {
    /// Destination phone number (or full chat id)
    pub number: String,

    /// Message text
    pub message: String,

    /// Server URL (defaults to the configured local port)
    #[arg(long)]
    pub url: Option<String>,
}

pub async fn run(args: SendArgs) -> Result<()> {
    let client = client_for(args.url)?;
    let message_id = client.send_message(&args.number, &args.message).await?;
    println!("Sent {}", message_id);
    Ok(())
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod client;
mod commands;
mod config;

#[derive(Parser)]
#[command(name = "pairline", about = "Messaging session gateway with QR pairing")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Send a text message through a running server
    Send(commands::send::SendArgs),
    /// Run the pairline server
    Serve(commands::serve::ServeArgs),
    /// Show the session status of a running server
    Status(commands::status::StatusArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Config(args) => commands::config::run(args),
        Commands::Send(args) => commands::send::run(args).await,
        Commands::Serve(args) => commands::serve::run(args).await,
        Commands::Status(args) => commands::status::run(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::parse_from([
            "pairline",
            "serve",
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--bridge-url",
            "http://bridge:3100",
        ]);

        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.host.as_deref(), Some("127.0.0.1"));
                assert_eq!(args.port, Some(8080));
                assert_eq!(args.bridge_url.as_deref(), Some("http://bridge:3100"));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_send_positionals() {
        let cli = Cli::parse_from(["pairline", "-v", "send", "5551234567", "hello there"]);

        assert!(cli.verbose);
        match cli.command {
            Commands::Send(args) => {
                assert_eq!(args.number, "5551234567");
                assert_eq!(args.message, "hello there");
                assert!(args.url.is_none());
            }
            _ => panic!("expected send"),
        }
    }

    #[test]
    fn test_parse_status_url() {
        let cli = Cli::parse_from(["pairline", "status", "--url", "http://remote:3000"]);

        match cli.command {
            Commands::Status(args) => {
                assert_eq!(args.url.as_deref(), Some("http://remote:3000"));
            }
            _ => panic!("expected status"),
        }
    }

    #[test]
    fn test_send_requires_message() {
        let result = Cli::try_parse_from(["pairline", "send", "5551234567"]);
        assert!(result.is_err());
    }
}

//! # Punchcard Server
//!
//! Main entry point for the Punchcard realtime sync service.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! punchcard-server
//!
//! # Run with custom configuration file
//! punchcard-server --config /path/to/config.yaml
//!
//! # Run with environment variable overrides
//! PUNCHCARD_SERVER_WS_PORT=9090 punchcard-server
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use punchcard_server::{PunchcardServer, ServerConfig};

/// Punchcard realtime sync server
#[derive(Parser, Debug)]
#[command(name = "punchcard-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Override listener host
    #[arg(long, env = "PUNCHCARD_SERVER_HOST")]
    host: Option<String>,

    /// Override WebSocket port
    #[arg(long, env = "PUNCHCARD_SERVER_WS_PORT")]
    ws_port: Option<u16>,

    /// Override broadcast-trigger port
    #[arg(long, env = "PUNCHCARD_SERVER_TRIGGER_PORT")]
    trigger_port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if args.validate {
        println!("Configuration is valid");
        return;
    }

    match run_server(config).await {
        Ok(()) => {
            info!("Punchcard server stopped");
        }
        Err(e) => {
            error!("Server error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Loads configuration from file and applies overrides.
fn load_config(args: &Args) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = if args.config.exists() {
        PunchcardServer::load_config(&args.config)?
    } else {
        eprintln!(
            "Configuration file not found: {}, using defaults",
            args.config.display()
        );
        let mut config = ServerConfig::default();
        config.apply_env_overrides();
        config
    };

    // Command-line flags win over file and environment.
    if let Some(host) = &args.host {
        config.punchcard.server.host.clone_from(host);
    }
    if let Some(port) = args.ws_port {
        config.punchcard.server.ws_port = port;
    }
    if let Some(port) = args.trigger_port {
        config.punchcard.server.trigger_port = port;
    }
    if args.debug {
        config.punchcard.logging.level = "debug".to_string();
    }

    config.validate()?;
    Ok(config)
}

/// Creates and runs the server.
async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut server = PunchcardServer::new(config);

    server.initialize().await?;
    server.run().await?;

    Ok(())
}

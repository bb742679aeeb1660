//! Biblio Web Server
//!
//! A secured REST API over an in-memory library catalog.

use clap::Parser;
use biblio_web::server::BiblioServerBuilder;
use biblio_web::{init_logging, WebConfig};

/// Biblio Web Server - a secured in-memory library catalog API
#[derive(Parser)]
#[command(name = "biblio-web")]
#[command(about = "REST API for the biblio library catalog")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable development mode
    #[arg(long)]
    dev: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    init_logging();

    // Environment first, command line overrides
    let mut config = WebConfig::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    config.dev_mode = config.dev_mode || args.dev;

    let server = BiblioServerBuilder::new()
        .host(config.host.clone())
        .port(config.port)
        .dev_mode(config.dev_mode)
        .build()?;

    server.start().await?;

    Ok(())
}

//! Biblio Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebResult};
use axum::serve;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main biblio web server
pub struct BiblioServer {
    config: WebConfig,
    state: AppState,
}

impl BiblioServer {
    /// Create a new server, seeding users and generating the signing key.
    pub fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone())?;
        Ok(Self { config, state })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("🚀 Starting Biblio Web Server");
        info!("📍 Server address: http://{}", address);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address).await?;

        info!("✅ Server listening on http://{}", address);

        if let Err(e) = serve(listener, app).await {
            error!("❌ Server error: {}", e);
            return Err(e.into());
        }

        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Builder for BiblioServer
pub struct BiblioServerBuilder {
    config: WebConfig,
}

impl BiblioServerBuilder {
    pub fn new() -> Self {
        Self {
            config: WebConfig::default(),
        }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable development mode
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    /// Build the server
    pub fn build(self) -> WebResult<BiblioServer> {
        BiblioServer::new(self.config)
    }
}

impl Default for BiblioServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

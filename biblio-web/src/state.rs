//! Application state with a defined lifecycle
//!
//! The credential store, the process signing key and the catalog are
//! constructed once at startup and handed to the router by handle, never
//! through static globals. Seeding failure (no OS entropy) is fatal here; the same
//! error at request time only rejects that request.

use crate::model::Library;
use crate::{WebConfig, WebError, WebResult};
use biblio_auth::{CredentialStore, TokenService};
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: WebConfig,
    /// User database backing both authentication schemes
    pub store: Arc<CredentialStore>,
    /// Bearer token issuer/verifier holding the process signing key
    pub tokens: Arc<TokenService>,
    /// The in-memory author catalog
    pub library: Arc<Library>,
}

impl AppState {
    /// Create the state, seeding demo users and generating the signing key.
    pub fn new(config: WebConfig) -> WebResult<Self> {
        let store = CredentialStore::with_seed_users()
            .map_err(|e| WebError::Security(format!("Failed to seed credential store: {}", e)))?;
        let tokens = TokenService::new()
            .map_err(|e| WebError::Security(format!("Failed to create signing key: {}", e)))?;

        info!("Application state initialized ({} users)", store.len());

        Ok(Self {
            config,
            store: Arc::new(store),
            tokens: Arc::new(tokens),
            library: Arc::new(Library::new()),
        })
    }
}

//! Admin session gate

use crate::api::CafeApi;
use crate::error::{ClientError, Result};
use crate::storage::KeyValueStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Store key holding the admin token
pub const TOKEN_KEY: &str = "token";

/// Keeps the admin token and gates admin operations on its presence
///
/// The token is not checked locally; an expired one surfaces as a 401 from
/// the server.
#[derive(Debug, Clone)]
pub struct AuthGate {
    api: Arc<dyn CafeApi>,
    store: Arc<dyn KeyValueStore>,
}

impl AuthGate {
    /// Create a gate persisting its token in `store`
    #[must_use]
    pub fn new(api: Arc<dyn CafeApi>, store: Arc<dyn KeyValueStore>) -> Self {
        Self { api, store }
    }

    /// Log in with the admin password and remember the token
    ///
    /// # Errors
    ///
    /// Returns the server rejection or a storage error.
    pub async fn login(&self, password: &str) -> Result<()> {
        let token = self.api.login(password).await?;
        self.store.set(TOKEN_KEY, &token)?;
        info!("Logged in");
        Ok(())
    }

    /// Forget the token, then tell the server; the server call may fail
    ///
    /// # Errors
    ///
    /// Returns a storage error if the token cannot be removed.
    pub async fn logout(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)?;
        if let Err(e) = self.api.logout().await {
            warn!("Logout request failed: {}", e);
        }
        info!("Logged out");
        Ok(())
    }

    /// Stored token, if any
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// True when a token is stored
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Token for an admin call
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unauthenticated`] when nobody is logged in.
    pub fn require_admin(&self) -> Result<String> {
        self.token().ok_or(ClientError::Unauthenticated)
    }
}

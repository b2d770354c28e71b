//! Service principal authentication against the identity provider.
//!
//! The provisioning run authenticates exactly once, non-interactively, with a
//! tenant id, client id and client secret. The resulting [`AccessToken`] is
//! handed to the resource manager client and never refreshed.
//!
//! The token exchange is delegated to `azure_identity`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rg_provision::identity::{Authenticator, ServicePrincipal, ServicePrincipalLogin};
//!
//! let login = ServicePrincipalLogin::new(&config.azure, &config.http)?;
//! let principal = ServicePrincipal::new("tenant", "client", "secret");
//! let token = login.login_silent(&principal).await?;
//! ```

mod client_secret;

pub use client_secret::ServicePrincipalLogin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

use crate::error::Result;

/// The identity used for a non-interactive login.
///
/// The subscription id is deliberately not part of the principal: it only
/// matters once a management client is bound.
#[derive(Clone, PartialEq, Eq)]
pub struct ServicePrincipal {
    /// Directory (tenant) id
    pub tenant_id: String,
    /// Application (client) id
    pub client_id: String,
    /// Client secret
    pub secret: String,
}

impl ServicePrincipal {
    /// Create a new service principal.
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for ServicePrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServicePrincipal")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// A bearer token issued by the identity provider.
#[derive(Clone)]
pub struct AccessToken {
    token: String,
    token_type: String,
    expires_on: DateTime<Utc>,
}

impl AccessToken {
    /// Create a bearer token that expires at `expires_on`.
    pub fn new(token: impl Into<String>, expires_on: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            token_type: "Bearer".to_string(),
            expires_on,
        }
    }

    /// Override the token type reported by the identity provider.
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = token_type.into();
        self
    }

    /// The raw token value.
    pub fn secret(&self) -> &str {
        &self.token
    }

    /// The token type (normally `Bearer`).
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// When the token stops being accepted.
    pub fn expires_on(&self) -> DateTime<Utc> {
        self.expires_on
    }

    /// Whether the token has already expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_on
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.token)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Exchanges a service principal for an access token.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Perform the non-interactive login.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`](crate::error::Error::Authentication)
    /// if the identity provider rejects the principal or cannot be reached.
    async fn login_silent(&self, principal: &ServicePrincipal) -> Result<AccessToken>;
}

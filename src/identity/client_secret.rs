//! Client-secret login through the Azure identity SDK.

use async_trait::async_trait;
use azure_core::auth::TokenCredential;
use azure_core::HttpClient;
use azure_identity::ClientSecretCredential;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use super::{AccessToken, Authenticator, ServicePrincipal};
use crate::config::{AzureSettings, HttpSettings};
use crate::error::{Error, Result};

/// Authenticates a service principal with its client secret.
///
/// The token exchange itself is performed by
/// [`azure_identity::ClientSecretCredential`]; this type only supplies the
/// cloud, the scope and the transport.
#[derive(Debug, Clone)]
pub struct ServicePrincipalLogin {
    http_client: Arc<dyn HttpClient>,
    authority_host: Url,
    scope: String,
}

impl ServicePrincipalLogin {
    /// Create a login for the configured cloud.
    ///
    /// The requested scope is the resource manager's `/.default` scope, so the
    /// token is usable for every management call in the run.
    pub fn new(azure: &AzureSettings, http: &HttpSettings) -> Result<Self> {
        Self::with_http_client(http.build_client()?, azure)
    }

    /// Create a login that reuses an existing transport.
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, azure: &AzureSettings) -> Result<Self> {
        Ok(Self {
            http_client,
            authority_host: azure.authority_host_url()?,
            scope: azure.token_scope(),
        })
    }

    /// Scope requested for every token.
    pub fn scope(&self) -> &str {
        &self.scope
    }
}

#[async_trait]
impl Authenticator for ServicePrincipalLogin {
    async fn login_silent(&self, principal: &ServicePrincipal) -> Result<AccessToken> {
        debug!(
            authority = %self.authority_host,
            client_id = %principal.client_id,
            "requesting access token"
        );

        let credential = ClientSecretCredential::new(
            Arc::clone(&self.http_client),
            self.authority_host.clone(),
            principal.tenant_id.clone(),
            principal.client_id.clone(),
            principal.secret.clone(),
        );

        let issued = TokenCredential::get_token(&credential, &[self.scope.as_str()])
            .await
            .map_err(|e| Error::authentication(&principal.tenant_id, describe(&e)))?;

        let expires_on = DateTime::<Utc>::from_timestamp(issued.expires_on.unix_timestamp(), 0)
            .unwrap_or_else(Utc::now);
        let token = AccessToken::new(issued.token.secret(), expires_on);

        info!(
            tenant = %principal.tenant_id,
            expires_on = %token.expires_on(),
            "obtained access token"
        );

        Ok(token)
    }
}

/// Render an error with its source chain on one line.
fn describe(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

//! Configuration for a provisioning run.
//!
//! The only external configuration is the four `AZURE_*` environment
//! variables, captured once at the entry point as [`Credentials`]. There are
//! no configuration files and no overrides: the group name, region and vault
//! name are fixed constants of the workflow.
//!
//! [`RunConfig`] holds the remaining settings (cloud endpoints, HTTP
//! transport, opt-in cleanup) as plain values with public-cloud defaults.
//! The binary always uses the defaults; tests point the endpoints at local
//! mock servers.

use azure_core::{ExponentialRetryOptions, HttpClient, RetryOptions};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, ErrorContext, Result};
use crate::identity::ServicePrincipal;

/// Tenant id variable.
pub const TENANT_ID_VAR: &str = "AZURE_TENANT_ID";
/// Client id variable.
pub const CLIENT_ID_VAR: &str = "AZURE_CLIENT_ID";
/// Client secret variable.
pub const SECRET_VAR: &str = "AZURE_SECRET";
/// Subscription id variable.
pub const SUBSCRIPTION_ID_VAR: &str = "AZURE_SUBSCRIPTION_ID";

/// Default identity provider.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
/// Default resource manager endpoint.
pub const DEFAULT_RESOURCE_MANAGER_URL: &str = "https://management.azure.com";

// ============================================================================
// Credentials
// ============================================================================

/// Raw credential values as found in the environment.
///
/// Every field is optional here; [`Credentials::validate`] decides whether a
/// run may proceed.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// `AZURE_TENANT_ID`
    pub tenant_id: Option<String>,
    /// `AZURE_CLIENT_ID`
    pub client_id: Option<String>,
    /// `AZURE_SECRET`
    pub secret: Option<String>,
    /// `AZURE_SUBSCRIPTION_ID`
    pub subscription_id: Option<String>,
}

impl Credentials {
    /// Read the four credential variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the four credential variables through an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            tenant_id: lookup(TENANT_ID_VAR),
            client_id: lookup(CLIENT_ID_VAR),
            secret: lookup(SECRET_VAR),
            subscription_id: lookup(SUBSCRIPTION_ID_VAR),
        }
    }

    /// Names of the variables that are absent or empty, in a fixed order.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (TENANT_ID_VAR, &self.tenant_id),
            (CLIENT_ID_VAR, &self.client_id),
            (SECRET_VAR, &self.secret),
            (SUBSCRIPTION_ID_VAR, &self.subscription_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
        .map(|(name, _)| name)
        .collect()
    }

    /// Split validated credentials into the login principal and subscription.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredentials`] naming every absent or empty
    /// variable.
    pub fn validate(&self) -> Result<(ServicePrincipal, String)> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(Error::MissingCredentials { missing });
        }

        let value = |field: &Option<String>| field.clone().unwrap_or_default();
        Ok((
            ServicePrincipal::new(
                value(&self.tenant_id),
                value(&self.client_id),
                value(&self.secret),
            ),
            value(&self.subscription_id),
        ))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("subscription_id", &self.subscription_id)
            .finish()
    }
}

// ============================================================================
// Run configuration
// ============================================================================

/// Non-secret settings for a provisioning run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Cloud endpoints
    pub azure: AzureSettings,

    /// HTTP transport settings
    pub http: HttpSettings,

    /// Workflow behaviour
    pub workflow: WorkflowSettings,
}

impl RunConfig {
    /// Check that endpoints parse and the transport settings are usable.
    pub fn validate(&self) -> Result<()> {
        self.azure.validate()?;

        if self.http.timeout_secs == 0 {
            return Err(Error::invalid_config(
                "http.timeout_secs",
                "must be greater than zero",
            ));
        }

        Ok(())
    }
}

/// Cloud endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureSettings {
    /// Identity provider base URL
    pub authority_host: String,

    /// Resource manager base URL
    pub resource_manager_url: String,
}

impl Default for AzureSettings {
    fn default() -> Self {
        Self {
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            resource_manager_url: DEFAULT_RESOURCE_MANAGER_URL.to_string(),
        }
    }
}

impl AzureSettings {
    /// Scope covering every resource manager operation.
    pub fn token_scope(&self) -> String {
        format!("{}/.default", self.resource_manager_url.trim_end_matches('/'))
    }

    /// Parsed identity provider URL.
    pub fn authority_host_url(&self) -> Result<url::Url> {
        base_url("azure.authority_host", &self.authority_host)
    }

    /// Parsed resource manager URL.
    pub fn resource_manager_base_url(&self) -> Result<url::Url> {
        base_url("azure.resource_manager_url", &self.resource_manager_url)
    }

    fn validate(&self) -> Result<()> {
        self.authority_host_url()?;
        self.resource_manager_base_url()?;
        Ok(())
    }
}

/// HTTP transport settings shared by the identity and management clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Transport-level retries for throttled or failed management calls;
    /// zero disables them
    pub max_retries: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            max_retries: 3,
        }
    }
}

impl HttpSettings {
    /// Build the HTTP transport used for every outbound call.
    pub fn build_client(&self) -> Result<Arc<dyn HttpClient>> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .pool_max_idle_per_host(0)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Arc::new(client))
    }

    /// Retry policy handed to the management pipeline.
    pub fn retry_options(&self) -> RetryOptions {
        if self.max_retries == 0 {
            RetryOptions::none()
        } else {
            RetryOptions::exponential(
                ExponentialRetryOptions::default().max_retries(self.max_retries),
            )
        }
    }
}

/// Opt-in workflow behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowSettings {
    /// Delete the group if a step after its creation fails
    pub cleanup_on_failure: bool,
}

fn base_url(key: &str, value: &str) -> Result<url::Url> {
    let parsed =
        url::Url::parse(value).map_err(|e| Error::invalid_config(key, format!("'{}': {}", value, e)))?;
    if parsed.cannot_be_a_base() {
        return Err(Error::invalid_config(key, format!("'{}' is not a base URL", value)));
    }
    Ok(parsed)
}

//! Error types for rg-provision.
//!
//! This module defines the error type shared by the identity client, the
//! resource manager client and the provisioning runner.

use thiserror::Error;

/// Result type alias for rg-provision operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for rg-provision.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// One or more required credential variables are absent or empty.
    #[error("Missing required credentials: {}", .missing.join(", "))]
    MissingCredentials {
        /// Names of the environment variables that were missing
        missing: Vec<&'static str>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidConfig {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // Remote Errors
    // ========================================================================
    /// The identity provider rejected the service principal.
    #[error("Authentication failed for tenant '{tenant}': {message}")]
    Authentication {
        /// Tenant the token was requested from
        tenant: String,
        /// Error message
        message: String,
    },

    /// The resource manager returned a non-success status.
    #[error("{operation} failed with HTTP {status}{}: {message}", .code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default())]
    Api {
        /// Operation that was being performed
        operation: String,
        /// HTTP status code
        status: u16,
        /// Provider error code, when the body carried one
        code: Option<String>,
        /// Error message
        message: String,
    },

    /// The management pipeline failed without an HTTP error status.
    #[error("{operation} failed: {source}")]
    Remote {
        /// Operation that was being performed
        operation: String,
        /// Transport, decoding or polling failure
        #[source]
        source: azure_core::Error,
    },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // Other Errors
    // ========================================================================
    /// Generic error with source.
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
        /// Source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Creates a new authentication error.
    pub fn authentication(tenant: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Authentication {
            tenant: tenant.into(),
            message: message.into(),
        }
    }

    /// Creates a new API error.
    pub fn api(
        operation: impl Into<String>,
        status: u16,
        code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Api {
            operation: operation.into(),
            status,
            code,
            message: message.into(),
        }
    }

    /// Creates a new invalid configuration error.
    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error was detected before any network call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::MissingCredentials { .. }
                | Error::Config(_)
                | Error::InvalidConfig { .. }
        )
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Api { .. } | Error::Remote { .. } => 2,
            Error::Authentication { .. } => 3,
            Error::Config(_) | Error::InvalidConfig { .. } => 4,
            _ => 1,
        }
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Adds context with a closure that is only evaluated on error.
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Other {
            message: message.into(),
            source: Some(Box::new(e)),
        })
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| Error::Other {
            message: f().into(),
            source: Some(Box::new(e)),
        })
    }
}

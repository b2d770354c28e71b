//! # rg-provision - Resource Group Provisioning Walkthrough
//!
//! rg-provision drives a fixed sequence of resource manager calls against a
//! cloud subscription: it logs in as a service principal, creates and tags a
//! resource group, creates a Key Vault through the generic resource API,
//! exports the group's template and finally deletes the group.
//!
//! ## Core Concepts
//!
//! - **Credentials**: tenant, client, secret and subscription read from the environment
//! - **Authenticator**: exchanges a service principal for an access token
//! - **ResourceManager**: the management operations, bound to one subscription
//! - **ProvisioningRunner**: executes the steps in order and prints progress
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      CLI Interface                        │
//! │               (clap-based argument parsing)               │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                   ProvisioningRunner                      │
//! │        (sequential steps, OutputSink / InputSource)       │
//! └──────────────────────────────────────────────────────────┘
//!               │                              │
//!               ▼                              ▼
//! ┌─────────────────────────┐    ┌─────────────────────────────┐
//! │     Authenticator       │    │  ClientBinder → Resource-   │
//! │   (azure_identity)      │    │  Manager (azure_mgmt_resources)│
//! └─────────────────────────┘    └─────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use rg_provision::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = RunConfig::default();
//!     let login = ServicePrincipalLogin::new(&config.azure, &config.http)?;
//!     let endpoint = ArmEndpoint::new(&config.azure, &config.http)?;
//!
//!     let runner = ProvisioningRunner::new(Arc::new(login), Arc::new(endpoint))
//!         .with_settings(config.workflow);
//!
//!     runner
//!         .run(&Credentials::from_env(), &mut ConsoleSink::default(), &mut StdinSource)
//!         .await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    // Error handling
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::{Credentials, RunConfig, WorkflowSettings};

    // Identity
    pub use crate::identity::{AccessToken, Authenticator, ServicePrincipal, ServicePrincipalLogin};

    // Resource manager
    pub use crate::arm::{ArmEndpoint, ClientBinder, ResourceManager};

    // Workflow
    pub use crate::workflow::{
        ConsoleSink, InputSource, OutputSink, ProvisioningRunner, RunOutcome, RunReport,
        StdinSource, MISSING_CREDENTIALS_MESSAGE,
    };
}

/// Error types and result aliases for rg-provision operations.
pub mod error;

/// Credentials and run settings.
///
/// The four `AZURE_*` environment variables are the only external input.
pub mod config;

/// Service principal login.
pub mod identity;

/// Resource manager client and payload models.
pub mod arm;

/// The provisioning workflow and its console capabilities.
pub mod workflow;

pub use error::{Error, Result};

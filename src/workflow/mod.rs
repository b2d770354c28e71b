//! The scripted provisioning workflow.
//!
//! [`ProvisioningRunner`] walks a fixed sequence of management calls:
//!
//! 1. Validate credentials
//! 2. Log in
//! 3. Bind a client to the subscription
//! 4. List resource groups
//! 5. Create the sample group
//! 6. Tag it
//! 7. List resource groups again
//! 8. Create a Key Vault through the generic resource API
//! 9. List resources in the group
//! 10. Export the group template
//! 11. Wait for one line of input
//! 12. Delete the group
//!
//! Every call is awaited before the next one starts.

mod console;
mod runner;

pub use console::{BufferSink, ConsoleSink, InputSource, OutputSink, StdinSource};
pub use runner::ProvisioningRunner;

use serde::Serialize;
use serde_json::Value;

/// Resource group created and deleted by the run.
pub const GROUP_NAME: &str = "sample-dotnet-group-mgmt";
/// Region for the group and vault.
pub const LOCATION: &str = "westus";
/// Name of the Key Vault resource.
pub const VAULT_NAME: &str = "azureSampleVault";

/// Provider namespace of the vault.
pub const KEY_VAULT_NAMESPACE: &str = "Microsoft.KeyVault";
/// Resource type of the vault within its namespace.
pub const VAULT_RESOURCE_TYPE: &str = "vaults";
/// API version used for the vault PUT.
pub const VAULT_API_VERSION: &str = "2015-06-01";

/// Tag applied in the second create-or-update.
pub const TAG_KEY: &str = "Hello";
/// Value of [`TAG_KEY`].
pub const TAG_VALUE: &str = "World";

/// Printed instead of running when any credential is missing.
pub const MISSING_CREDENTIALS_MESSAGE: &str = "Please provide ENV vars for AZURE_TENANT_ID, AZURE_CLIENT_ID, AZURE_SECRET and AZURE_SUBSCRIPTION_ID.";

/// How a run ended without error.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Credentials were incomplete; nothing was contacted.
    MissingCredentials {
        /// Variables that were absent or empty
        missing: Vec<&'static str>,
    },
    /// Every step ran, including the final delete.
    Completed(RunReport),
}

impl RunOutcome {
    /// The report of a completed run.
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            RunOutcome::Completed(report) => Some(report),
            RunOutcome::MissingCredentials { .. } => None,
        }
    }
}

/// What a completed run observed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    /// Group name used
    pub group_name: String,
    /// Provider id of the tagged group
    pub group_id: Option<String>,
    /// Provider id of the vault
    pub vault_id: Option<String>,
    /// Groups listed before creation
    pub groups_before: usize,
    /// Groups listed after tagging
    pub groups_after: usize,
    /// Resources listed inside the group
    pub resources_in_group: usize,
    /// Exported template document
    pub template: Option<Value>,
}

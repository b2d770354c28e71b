//! Resource manager client.
//!
//! [`ResourceManager`] is the set of management operations the provisioning
//! run needs. [`ResourceManagementClient`] implements it over HTTP; tests
//! substitute recording mocks.
//!
//! A client is produced by a [`ClientBinder`] once a token is available, so
//! nothing in this module is usable before login.

mod client;
mod models;

pub use client::{ArmEndpoint, ResourceManagementClient};
pub use models::{
    ErrorDetail, ExportTemplateRequest, GenericResource, KeyVaultProperties, KeyVaultSku,
    ResourceCoordinates, ResourceGroup, ResourceGroupExportResult, ResourceGroupProperties,
    ResourceProperties, Tags,
};

use async_trait::async_trait;

use crate::error::Result;
use crate::identity::AccessToken;

/// Management operations scoped to one subscription.
#[async_trait]
pub trait ResourceManager: Send + Sync {
    /// List every resource group in the subscription, following paging.
    async fn list_resource_groups(&self) -> Result<Vec<ResourceGroup>>;

    /// Create a group, or update it if it already exists.
    ///
    /// The request carries the full group (location and tags), so the result
    /// is the same whether the provider merges or replaces.
    async fn create_or_update_resource_group(
        &self,
        name: &str,
        group: &ResourceGroup,
    ) -> Result<ResourceGroup>;

    /// Create or update an arbitrary resource by its coordinates.
    async fn create_or_update_resource(
        &self,
        coordinates: &ResourceCoordinates,
        resource: &GenericResource,
    ) -> Result<GenericResource>;

    /// List every resource inside a group, following paging.
    async fn list_resources(&self, group: &str) -> Result<Vec<GenericResource>>;

    /// Export a template describing the selected resources of a group.
    async fn export_template(
        &self,
        group: &str,
        request: &ExportTemplateRequest,
    ) -> Result<ResourceGroupExportResult>;

    /// Request deletion of a group and everything in it.
    ///
    /// Returns once the provider has accepted the request; completion is not
    /// awaited.
    async fn delete_resource_group(&self, name: &str) -> Result<()>;
}

/// Produces a [`ResourceManager`] from a token and subscription id.
pub trait ClientBinder: Send + Sync {
    /// Bind a client. Binding performs no I/O.
    fn bind(&self, token: AccessToken, subscription_id: &str) -> Box<dyn ResourceManager>;
}

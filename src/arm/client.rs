//! [`ResourceManager`] backed by the `azure_mgmt_resources` SDK client.
//!
//! Transport, retries, paging and long-running export polling all happen in
//! the SDK pipeline. This module converts between the crate's wire models and
//! the SDK models and maps pipeline failures onto [`Error`].

use async_trait::async_trait;
use azure_core::auth::{AccessToken as SdkToken, TokenCredential};
use azure_core::error::ErrorKind;
use azure_core::headers::CLIENT_REQUEST_ID;
use azure_core::{ClientOptions, Context, HttpClient, Policy, PolicyResult, Request, RetryOptions, TransportOptions};
use azure_mgmt_resources::models as sdk;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use super::models::{
    ExportTemplateRequest, GenericResource, ResourceCoordinates, ResourceGroup,
    ResourceGroupExportResult,
};
use super::{ClientBinder, ResourceManager};
use crate::config::{AzureSettings, HttpSettings};
use crate::error::{Error, Result};
use crate::identity::AccessToken;

/// Everything needed to bind a client except the token and subscription.
#[derive(Debug, Clone)]
pub struct ArmEndpoint {
    http_client: Arc<dyn HttpClient>,
    base_url: Url,
    scope: String,
    retry: RetryOptions,
}

impl ArmEndpoint {
    /// Create an endpoint from settings, building a fresh transport.
    pub fn new(azure: &AzureSettings, http: &HttpSettings) -> Result<Self> {
        Self::with_http_client(http.build_client()?, azure, http)
    }

    /// Create an endpoint that reuses an existing transport.
    pub fn with_http_client(
        http_client: Arc<dyn HttpClient>,
        azure: &AzureSettings,
        http: &HttpSettings,
    ) -> Result<Self> {
        Ok(Self {
            http_client,
            base_url: azure.resource_manager_base_url()?,
            scope: azure.token_scope(),
            retry: http.retry_options(),
        })
    }

    /// Pipeline options shared by every SDK client built from this endpoint.
    fn options(&self) -> ClientOptions {
        let mut options = ClientOptions::new(TransportOptions::new(Arc::clone(&self.http_client)))
            .retry(self.retry.clone());
        options
            .per_call_policies_mut()
            .push(Arc::new(ClientRequestIdPolicy));
        options
    }

    /// An SDK client rooted at `endpoint`.
    fn sdk_client(&self, endpoint: Url, credential: Arc<dyn TokenCredential>) -> azure_mgmt_resources::Client {
        azure_mgmt_resources::Client::new(endpoint, credential, vec![self.scope.clone()], self.options())
    }
}

impl ClientBinder for ArmEndpoint {
    fn bind(&self, token: AccessToken, subscription_id: &str) -> Box<dyn ResourceManager> {
        let credential: Arc<dyn TokenCredential> = Arc::new(BoundToken(token));
        let client = self.sdk_client(self.base_url.clone(), Arc::clone(&credential));
        Box::new(ResourceManagementClient {
            endpoint: self.clone(),
            credential,
            client,
            subscription_id: subscription_id.to_string(),
        })
    }
}

/// Stamps every request with a fresh `x-ms-client-request-id`.
#[derive(Debug)]
struct ClientRequestIdPolicy;

#[async_trait]
impl Policy for ClientRequestIdPolicy {
    async fn send(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: &[Arc<dyn Policy>],
    ) -> PolicyResult {
        let request_id = Uuid::new_v4().to_string();
        debug!(method = %request.method(), url = %request.url(), %request_id, "sending request");
        request.insert_header(CLIENT_REQUEST_ID, request_id);
        next[0].send(ctx, request, &next[1..]).await
    }
}

/// Hands the SDK the token obtained at login; it is never refreshed.
struct BoundToken(AccessToken);

impl std::fmt::Debug for BoundToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BoundToken").field(&self.0).finish()
    }
}

#[async_trait]
impl TokenCredential for BoundToken {
    async fn get_token(&self, _scopes: &[&str]) -> azure_core::Result<SdkToken> {
        let expires_on = OffsetDateTime::from_unix_timestamp(self.0.expires_on().timestamp())
            .map_err(|e| azure_core::Error::full(ErrorKind::Credential, e, "token expiry out of range"))?;
        Ok(SdkToken::new(self.0.secret().to_string(), expires_on))
    }

    async fn clear_cache(&self) -> azure_core::Result<()> {
        Ok(())
    }
}

/// A resource manager client bound to one subscription and one token.
pub struct ResourceManagementClient {
    endpoint: ArmEndpoint,
    credential: Arc<dyn TokenCredential>,
    client: azure_mgmt_resources::Client,
    subscription_id: String,
}

impl ResourceManagementClient {
    /// The subscription this client operates on.
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// An SDK client whose requests carry `api_version` instead of the
    /// package default.
    fn pinned_client(&self, api_version: &str) -> azure_mgmt_resources::Client {
        let mut endpoint = self.endpoint.base_url.clone();
        endpoint
            .query_pairs_mut()
            .append_pair(azure_core::query_param::API_VERSION, api_version);
        self.endpoint.sdk_client(endpoint, Arc::clone(&self.credential))
    }
}

#[async_trait]
impl ResourceManager for ResourceManagementClient {
    async fn list_resource_groups(&self) -> Result<Vec<ResourceGroup>> {
        let operation = "list resource groups";
        let mut pages = self
            .client
            .resource_groups_client()
            .list(&self.subscription_id)
            .into_stream();

        let mut groups = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| api_error(operation, e))?;
            for group in &page.value {
                groups.push(convert(group)?);
            }
        }
        debug!(count = groups.len(), "listed resource groups");
        Ok(groups)
    }

    async fn create_or_update_resource_group(
        &self,
        name: &str,
        group: &ResourceGroup,
    ) -> Result<ResourceGroup> {
        let body: sdk::ResourceGroup = convert(group)?;
        let created = self
            .client
            .resource_groups_client()
            .create_or_update(name, body, &self.subscription_id)
            .await
            .map_err(|e| api_error("create resource group", e))?;
        let created: ResourceGroup = convert(&created)?;
        info!(group = %name, location = %created.location, "resource group written");
        Ok(created)
    }

    async fn create_or_update_resource(
        &self,
        coordinates: &ResourceCoordinates,
        resource: &GenericResource,
    ) -> Result<GenericResource> {
        let operation = "create resource";
        let body: sdk::GenericResource = convert(resource)?;
        let response = self
            .pinned_client(&coordinates.api_version)
            .resources_client()
            .create_or_update(
                &coordinates.resource_group,
                &coordinates.provider_namespace,
                coordinates.parent_resource_path.trim_matches('/'),
                &coordinates.resource_type,
                &coordinates.resource_name,
                body,
                &self.subscription_id,
            )
            .send()
            .await
            .map_err(|e| api_error(operation, e))?;
        let created = response
            .into_body()
            .await
            .map_err(|e| api_error(operation, e))?;

        info!(
            namespace = %coordinates.provider_namespace,
            resource_type = %coordinates.resource_type,
            name = %coordinates.resource_name,
            "resource written"
        );
        convert(&created)
    }

    async fn list_resources(&self, group: &str) -> Result<Vec<GenericResource>> {
        let operation = "list resources";
        let mut pages = self
            .client
            .resources_client()
            .list_by_resource_group(group, &self.subscription_id)
            .into_stream();

        let mut resources = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| api_error(operation, e))?;
            for expanded in &page.value {
                resources.push(convert(&expanded.generic_resource)?);
            }
        }
        Ok(resources)
    }

    async fn export_template(
        &self,
        group: &str,
        request: &ExportTemplateRequest,
    ) -> Result<ResourceGroupExportResult> {
        let body: sdk::ExportTemplateRequest = convert(request)?;
        let exported = self
            .client
            .resource_groups_client()
            .export_template(&self.subscription_id, group, body)
            .await
            .map_err(|e| api_error("export template", e))?;
        let result: ResourceGroupExportResult = convert(&exported)?;

        if let Some(detail) = &result.error {
            warn!(
                group = %group,
                code = ?detail.code,
                message = ?detail.message,
                "template export reported errors"
            );
        }
        Ok(result)
    }

    async fn delete_resource_group(&self, name: &str) -> Result<()> {
        let response = self
            .client
            .resource_groups_client()
            .delete(name, &self.subscription_id)
            .send()
            .await
            .map_err(|e| api_error("delete resource group", e))?;
        info!(
            group = %name,
            status = response.as_raw_response().status() as u16,
            "resource group delete requested"
        );
        Ok(())
    }
}

impl std::fmt::Debug for ResourceManagementClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManagementClient")
            .field("base_url", &self.endpoint.base_url.as_str())
            .field("subscription_id", &self.subscription_id)
            .field("credential", &self.credential)
            .finish()
    }
}

/// Re-shape a payload between the crate's models and the SDK's.
///
/// Both sides serialize to the same resource manager wire format.
fn convert<T: Serialize, U: DeserializeOwned>(value: &T) -> Result<U> {
    Ok(serde_json::from_value(serde_json::to_value(value)?)?)
}

/// Map a pipeline failure onto [`Error`].
///
/// Failures with an HTTP status become [`Error::Api`] carrying the provider's
/// error code and message; everything else is [`Error::Remote`].
fn api_error(operation: &str, error: azure_core::Error) -> Error {
    let status = match error.kind() {
        ErrorKind::HttpResponse { status, .. } => *status as u16,
        _ => {
            return Error::Remote {
                operation: operation.to_string(),
                source: error,
            }
        }
    };

    match error.as_http_error() {
        Some(http) => Error::api(
            operation,
            status,
            http.error_code().map(str::to_string),
            http.error_message()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string()),
        ),
        None => {
            let code = match error.kind() {
                ErrorKind::HttpResponse { error_code, .. } => error_code.clone(),
                _ => None,
            };
            Error::api(operation, status, code, error.to_string())
        }
    }
}

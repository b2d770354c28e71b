//! Shared test utilities for the rg-provision test suite.
//!
//! This module provides:
//! - A recording [`MockCloud`] shared by mock collaborators
//! - Mock implementations of `Authenticator`, `ClientBinder` and `ResourceManager`
//! - A scripted `InputSource` that records when the confirmation gate is reached
//! - Credential fixtures
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::json;

use rg_provision::arm::{
    ClientBinder, ExportTemplateRequest, GenericResource, ResourceCoordinates, ResourceGroup,
    ResourceGroupExportResult, ResourceManager,
};
use rg_provision::config::Credentials;
use rg_provision::error::{Error, Result};
use rg_provision::identity::{AccessToken, Authenticator, ServicePrincipal};
use rg_provision::workflow::{InputSource, ProvisioningRunner};

pub const TENANT: &str = "tenant-0000";
pub const CLIENT: &str = "client-1111";
pub const SECRET: &str = "secret-2222";
pub const SUBSCRIPTION: &str = "sub-3333";
pub const TOKEN: &str = "mock-token";

// ============================================================================
// Call log
// ============================================================================

/// One observed collaborator interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Login(ServicePrincipal),
    ListGroups,
    CreateGroup {
        name: String,
        body: ResourceGroup,
    },
    CreateResource {
        coordinates: ResourceCoordinates,
        body: GenericResource,
    },
    ListResources(String),
    ExportTemplate {
        group: String,
        request: ExportTemplateRequest,
    },
    InputGate,
    DeleteGroup(String),
}

impl Call {
    /// Short name used for sequence assertions and failure injection.
    pub fn kind(&self) -> &'static str {
        match self {
            Call::Login(_) => "login",
            Call::ListGroups => "list_groups",
            Call::CreateGroup { .. } => "create_group",
            Call::CreateResource { .. } => "create_resource",
            Call::ListResources(_) => "list_resources",
            Call::ExportTemplate { .. } => "export_template",
            Call::InputGate => "input",
            Call::DeleteGroup(_) => "delete_group",
        }
    }
}

// ============================================================================
// MockCloud
// ============================================================================

/// In-memory stand-in for the identity provider and resource manager.
///
/// Every mock created from the same cloud appends to one ordered call log.
///
/// # Example
///
/// ```rust,ignore
/// let cloud = MockCloud::new();
/// cloud.fail_on("create_resource", 1);
/// let runner = cloud.runner();
/// ```
#[derive(Debug, Default)]
pub struct MockCloud {
    calls: Mutex<Vec<Call>>,
    login_count: AtomicU32,
    failures: RwLock<Vec<(&'static str, usize)>>,
    existing_groups: RwLock<Vec<ResourceGroup>>,
    created_group: RwLock<Option<ResourceGroup>>,
    bound: RwLock<Option<(String, String)>>,
}

impl MockCloud {
    /// Create a cloud with two pre-existing groups.
    pub fn new() -> Arc<Self> {
        let cloud = Self::default();
        *cloud.existing_groups.write() = vec![
            group_fixture("networking-rg", "eastus"),
            group_fixture("web-rg", "westeurope"),
        ];
        Arc::new(cloud)
    }

    /// Fail the `occurrence`-th (1-based) call of `kind`. May be called
    /// repeatedly to inject several failures.
    pub fn fail_on(&self, kind: &'static str, occurrence: usize) {
        self.failures.write().push((kind, occurrence));
    }

    /// Every call observed so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Just the kinds of every call, in order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.calls.lock().iter().map(Call::kind).collect()
    }

    /// Number of login attempts.
    pub fn login_count(&self) -> u32 {
        self.login_count.load(Ordering::SeqCst)
    }

    /// Token secret and subscription passed to the binder, if bound.
    pub fn bound(&self) -> Option<(String, String)> {
        self.bound.read().clone()
    }

    /// Bodies of every create-or-update group call.
    pub fn group_bodies(&self) -> Vec<ResourceGroup> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::CreateGroup { body, .. } => Some(body.clone()),
                _ => None,
            })
            .collect()
    }

    /// Build a runner wired to this cloud with default settings.
    pub fn runner(self: &Arc<Self>) -> ProvisioningRunner {
        ProvisioningRunner::new(
            Arc::new(MockAuthenticator::new(Arc::clone(self))),
            Arc::new(MockBinder::new(Arc::clone(self))),
        )
    }

    /// Build an input source that records into this cloud.
    pub fn input(self: &Arc<Self>) -> ScriptedInput {
        ScriptedInput::new(Arc::clone(self), ["\n"])
    }

    fn record(&self, call: Call) -> Result<()> {
        let kind = call.kind();
        let mut calls = self.calls.lock();
        calls.push(call);
        let seen = calls.iter().filter(|c| c.kind() == kind).count();
        drop(calls);

        let injected = self
            .failures
            .read()
            .iter()
            .any(|&(failing, occurrence)| failing == kind && occurrence == seen);
        if injected {
            return Err(Error::api(
                kind,
                500,
                Some("InternalServerError".to_string()),
                "injected failure",
            ));
        }
        Ok(())
    }

    fn group_id(name: &str) -> String {
        format!("/subscriptions/{}/resourceGroups/{}", SUBSCRIPTION, name)
    }
}

fn group_fixture(name: &str, location: &str) -> ResourceGroup {
    ResourceGroup {
        id: Some(MockCloud::group_id(name)),
        name: Some(name.to_string()),
        ..ResourceGroup::new(location)
    }
}

// ============================================================================
// Mock collaborators
// ============================================================================

/// Authenticator that records the principal and returns a fixed token.
#[derive(Debug)]
pub struct MockAuthenticator {
    cloud: Arc<MockCloud>,
}

impl MockAuthenticator {
    pub fn new(cloud: Arc<MockCloud>) -> Self {
        Self { cloud }
    }
}

#[async_trait]
impl Authenticator for MockAuthenticator {
    async fn login_silent(&self, principal: &ServicePrincipal) -> Result<AccessToken> {
        self.cloud.login_count.fetch_add(1, Ordering::SeqCst);
        self.cloud
            .record(Call::Login(principal.clone()))
            .map_err(|_| Error::authentication(&principal.tenant_id, "invalid_client"))?;
        Ok(AccessToken::new(
            TOKEN,
            chrono::Utc::now() + chrono::Duration::hours(1),
        ))
    }
}

/// Binder that hands out [`MockResourceManager`]s.
#[derive(Debug)]
pub struct MockBinder {
    cloud: Arc<MockCloud>,
}

impl MockBinder {
    pub fn new(cloud: Arc<MockCloud>) -> Self {
        Self { cloud }
    }
}

impl ClientBinder for MockBinder {
    fn bind(&self, token: AccessToken, subscription_id: &str) -> Box<dyn ResourceManager> {
        *self.cloud.bound.write() = Some((token.secret().to_string(), subscription_id.to_string()));
        Box::new(MockResourceManager {
            cloud: Arc::clone(&self.cloud),
        })
    }
}

/// Resource manager that records calls and echoes plausible responses.
#[derive(Debug)]
pub struct MockResourceManager {
    cloud: Arc<MockCloud>,
}

#[async_trait]
impl ResourceManager for MockResourceManager {
    async fn list_resource_groups(&self) -> Result<Vec<ResourceGroup>> {
        self.cloud.record(Call::ListGroups)?;
        let mut groups = self.cloud.existing_groups.read().clone();
        if let Some(created) = self.cloud.created_group.read().clone() {
            groups.push(created);
        }
        Ok(groups)
    }

    async fn create_or_update_resource_group(
        &self,
        name: &str,
        group: &ResourceGroup,
    ) -> Result<ResourceGroup> {
        self.cloud.record(Call::CreateGroup {
            name: name.to_string(),
            body: group.clone(),
        })?;
        let created = ResourceGroup {
            id: Some(MockCloud::group_id(name)),
            name: Some(name.to_string()),
            ..group.clone()
        };
        *self.cloud.created_group.write() = Some(created.clone());
        Ok(created)
    }

    async fn create_or_update_resource(
        &self,
        coordinates: &ResourceCoordinates,
        resource: &GenericResource,
    ) -> Result<GenericResource> {
        self.cloud.record(Call::CreateResource {
            coordinates: coordinates.clone(),
            body: resource.clone(),
        })?;
        Ok(GenericResource {
            id: Some(coordinates.path(SUBSCRIPTION)),
            name: Some(coordinates.resource_name.clone()),
            resource_type: Some(format!(
                "{}/{}",
                coordinates.provider_namespace, coordinates.resource_type
            )),
            ..resource.clone()
        })
    }

    async fn list_resources(&self, group: &str) -> Result<Vec<GenericResource>> {
        self.cloud.record(Call::ListResources(group.to_string()))?;
        Ok(vec![GenericResource {
            id: Some(format!(
                "{}/providers/Microsoft.KeyVault/vaults/azureSampleVault",
                MockCloud::group_id(group)
            )),
            name: Some("azureSampleVault".to_string()),
            ..GenericResource::default()
        }])
    }

    async fn export_template(
        &self,
        group: &str,
        request: &ExportTemplateRequest,
    ) -> Result<ResourceGroupExportResult> {
        self.cloud.record(Call::ExportTemplate {
            group: group.to_string(),
            request: request.clone(),
        })?;
        Ok(ResourceGroupExportResult {
            template: Some(json!({
                "contentVersion": "1.0.0.0",
                "resources": [{"type": "Microsoft.KeyVault/vaults"}]
            })),
            error: None,
        })
    }

    async fn delete_resource_group(&self, name: &str) -> Result<()> {
        self.cloud.record(Call::DeleteGroup(name.to_string()))
    }
}

/// Input source that replays scripted lines and records each read.
#[derive(Debug)]
pub struct ScriptedInput {
    cloud: Arc<MockCloud>,
    lines: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(cloud: Arc<MockCloud>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cloud,
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn read_line(&mut self) -> Result<String> {
        self.cloud.record(Call::InputGate)?;
        Ok(self.lines.pop_front().unwrap_or_default())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Credentials with all four values present.
pub fn full_credentials() -> Credentials {
    Credentials {
        tenant_id: Some(TENANT.to_string()),
        client_id: Some(CLIENT.to_string()),
        secret: Some(SECRET.to_string()),
        subscription_id: Some(SUBSCRIPTION.to_string()),
    }
}

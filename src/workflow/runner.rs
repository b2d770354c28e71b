//! Sequential execution of the provisioning steps.

use std::sync::Arc;
use tracing::{info, warn};

use super::console::{InputSource, OutputSink};
use super::{
    RunOutcome, RunReport, GROUP_NAME, KEY_VAULT_NAMESPACE, LOCATION, MISSING_CREDENTIALS_MESSAGE,
    TAG_KEY, TAG_VALUE, VAULT_API_VERSION, VAULT_NAME, VAULT_RESOURCE_TYPE,
};
use crate::arm::{
    ClientBinder, ExportTemplateRequest, GenericResource, KeyVaultProperties, ResourceCoordinates,
    ResourceGroup, ResourceManager,
};
use crate::config::{Credentials, WorkflowSettings};
use crate::error::{Error, Result};
use crate::identity::Authenticator;

/// Runs the provisioning steps against injected collaborators.
pub struct ProvisioningRunner {
    authenticator: Arc<dyn Authenticator>,
    binder: Arc<dyn ClientBinder>,
    settings: WorkflowSettings,
}

impl ProvisioningRunner {
    /// Create a runner with the default workflow settings.
    pub fn new(authenticator: Arc<dyn Authenticator>, binder: Arc<dyn ClientBinder>) -> Self {
        Self {
            authenticator,
            binder,
            settings: WorkflowSettings::default(),
        }
    }

    /// Replace the workflow settings.
    pub fn with_settings(mut self, settings: WorkflowSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Current workflow settings.
    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    /// Execute the whole workflow once.
    ///
    /// Incomplete credentials are not an error: the instructional message is
    /// written to `out` and [`RunOutcome::MissingCredentials`] is returned
    /// before anything is contacted.
    ///
    /// # Errors
    ///
    /// The first failing step aborts the run and its error is returned
    /// unchanged. Resources created before the failure stay behind unless
    /// `cleanup_on_failure` is set.
    pub async fn run(
        &self,
        credentials: &Credentials,
        out: &mut dyn OutputSink,
        input: &mut dyn InputSource,
    ) -> Result<RunOutcome> {
        let (principal, subscription_id) = match credentials.validate() {
            Ok(validated) => validated,
            Err(Error::MissingCredentials { missing }) => {
                info!(?missing, "credentials incomplete; nothing to do");
                out.line(MISSING_CREDENTIALS_MESSAGE)?;
                return Ok(RunOutcome::MissingCredentials { missing });
            }
            Err(e) => return Err(e),
        };

        let token = self.authenticator.login_silent(&principal).await?;
        let client = self.binder.bind(token, &subscription_id);
        info!(subscription = %subscription_id, "management client bound");

        let group_name = GROUP_NAME;
        let location = LOCATION;
        let mut report = RunReport {
            group_name: group_name.to_string(),
            ..RunReport::default()
        };

        report.groups_before = list_groups(client.as_ref(), out).await?;

        out.heading(&format!(
            "Creating resource group named {} in {}",
            group_name, location
        ))?;
        let group = ResourceGroup::new(location);
        client
            .create_or_update_resource_group(group_name, &group)
            .await?;
        out.blank()?;

        let provisioned = self
            .provision(client.as_ref(), group, &principal.tenant_id, out, input, &mut report)
            .await;

        if let Err(err) = provisioned {
            if self.settings.cleanup_on_failure {
                warn!(group = %group_name, error = %err, "step failed; deleting resource group");
                if let Err(cleanup) = client.delete_resource_group(group_name).await {
                    warn!(group = %group_name, error = %cleanup, "cleanup delete failed");
                }
            }
            return Err(err);
        }

        out.heading(&format!(
            "deleting resource group {} and all resources within it",
            group_name
        ))?;
        client.delete_resource_group(group_name).await?;
        info!(group = %group_name, "run complete");

        Ok(RunOutcome::Completed(report))
    }

    /// Steps between group creation and deletion.
    async fn provision(
        &self,
        client: &dyn ResourceManager,
        group: ResourceGroup,
        tenant_id: &str,
        out: &mut dyn OutputSink,
        input: &mut dyn InputSource,
        report: &mut RunReport,
    ) -> Result<()> {
        let group_name = GROUP_NAME;

        out.heading("Adding tags to the resource group")?;
        let tagged = group.with_tag(TAG_KEY, TAG_VALUE);
        let tagged = client
            .create_or_update_resource_group(group_name, &tagged)
            .await?;
        report.group_id = tagged.id;
        out.blank()?;

        report.groups_after = list_groups(client, out).await?;

        out.heading("Create a Key Vault resource with a generic PUT")?;
        let coordinates = ResourceCoordinates {
            resource_group: group_name.to_string(),
            provider_namespace: KEY_VAULT_NAMESPACE.to_string(),
            parent_resource_path: String::new(),
            resource_type: VAULT_RESOURCE_TYPE.to_string(),
            resource_name: VAULT_NAME.to_string(),
            api_version: VAULT_API_VERSION.to_string(),
        };
        let vault = GenericResource::new(
            LOCATION,
            KeyVaultProperties::standard(tenant_id).into(),
        );
        let vault = client.create_or_update_resource(&coordinates, &vault).await?;
        out.line(&format!(
            "\tKey Vault Name: {} and Id: {}",
            vault.name.as_deref().unwrap_or_default(),
            vault.id.as_deref().unwrap_or_default()
        ))?;
        report.vault_id = vault.id;
        out.blank()?;

        out.heading(&format!("Listing resources within group {}", group_name))?;
        let resources = client.list_resources(group_name).await?;
        for resource in &resources {
            out.line(&name_and_id(resource.name.as_deref(), resource.id.as_deref()))?;
        }
        report.resources_in_group = resources.len();
        out.blank()?;

        out.heading(&format!(
            "Exporting the resource group template for {}",
            group_name
        ))?;
        out.blank()?;
        let exported = client
            .export_template(group_name, &ExportTemplateRequest::all_resources())
            .await?;
        let rendered = match &exported.template {
            Some(template) => serde_json::to_string_pretty(template)?,
            None => String::new(),
        };
        out.line(&rendered)?;
        report.template = exported.template;
        out.blank()?;

        out.heading("Press any key to continue and delete the sample resources")?;
        input.read_line()?;
        out.blank()?;

        Ok(())
    }
}

/// Print every group under a heading and return how many there were.
async fn list_groups(client: &dyn ResourceManager, out: &mut dyn OutputSink) -> Result<usize> {
    out.heading("Listing resource groups:")?;
    let groups = client.list_resource_groups().await?;
    for group in &groups {
        out.line(&name_and_id(group.name.as_deref(), group.id.as_deref()))?;
    }
    out.blank()?;
    Ok(groups.len())
}

fn name_and_id(name: Option<&str>, id: Option<&str>) -> String {
    format!(
        "\tName: {}, Id: {}",
        name.unwrap_or_default(),
        id.unwrap_or_default()
    )
}

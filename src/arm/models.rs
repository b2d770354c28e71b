//! Request and response payloads for the resource manager API.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// String tags attached to a resource or group.
pub type Tags = IndexMap<String, String>;

// ============================================================================
// Resource groups
// ============================================================================

/// A resource group as sent to and returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    /// Provider-assigned resource id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Group name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Region
    pub location: String,

    /// Tags; omitted from the request when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,

    /// Id of the resource that manages this group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<String>,

    /// Read-only provider properties
    #[serde(default, skip_serializing)]
    pub properties: Option<ResourceGroupProperties>,
}

impl ResourceGroup {
    /// A request body for a group in `location` with no tags.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    /// Replace the tag set.
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Add a single tag, creating the tag set if needed.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags
            .get_or_insert_with(Tags::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Read-only resource group properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupProperties {
    /// Provisioning state, e.g. `Succeeded` or `Deleting`
    #[serde(default)]
    pub provisioning_state: Option<String>,
}

// ============================================================================
// Generic resources
// ============================================================================

/// Coordinates of a resource addressed through the generic resource API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCoordinates {
    /// Containing resource group
    pub resource_group: String,
    /// Provider namespace, e.g. `Microsoft.KeyVault`
    pub provider_namespace: String,
    /// Parent resource path; empty for top-level resources
    pub parent_resource_path: String,
    /// Resource type within the namespace, e.g. `vaults`
    pub resource_type: String,
    /// Resource name
    pub resource_name: String,
    /// API version pinned for this resource type
    pub api_version: String,
}

impl ResourceCoordinates {
    /// Path of the resource below the subscription, without query string.
    pub fn path(&self, subscription_id: &str) -> String {
        let mut path = format!(
            "/subscriptions/{}/resourcegroups/{}/providers/{}",
            subscription_id, self.resource_group, self.provider_namespace
        );
        let parent = self.parent_resource_path.trim_matches('/');
        if !parent.is_empty() {
            path.push('/');
            path.push_str(parent);
        }
        path.push('/');
        path.push_str(&self.resource_type);
        path.push('/');
        path.push_str(&self.resource_name);
        path
    }
}

/// A resource expressed without a typed model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericResource {
    /// Provider-assigned resource id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Resource name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Fully qualified resource type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    /// Region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,

    /// Resource-specific properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ResourceProperties>,
}

impl GenericResource {
    /// A request body in `location` carrying `properties`.
    pub fn new(location: impl Into<String>, properties: ResourceProperties) -> Self {
        Self {
            location: Some(location.into()),
            properties: Some(properties),
            ..Self::default()
        }
    }
}

/// Property bag of a generic resource.
///
/// Requests can use a typed schema; responses always come back as
/// [`ResourceProperties::Raw`] so no provider field is lost.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceProperties {
    /// Key Vault properties
    KeyVault(KeyVaultProperties),
    /// Arbitrary JSON object
    Raw(Map<String, Value>),
}

impl<'de> Deserialize<'de> for ResourceProperties {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Map::deserialize(deserializer).map(ResourceProperties::Raw)
    }
}

impl ResourceProperties {
    /// The properties as a JSON object.
    pub fn to_map(&self) -> Map<String, Value> {
        match self {
            ResourceProperties::Raw(map) => map.clone(),
            ResourceProperties::KeyVault(props) => match serde_json::to_value(props) {
                Ok(Value::Object(map)) => map,
                _ => Map::new(),
            },
        }
    }

    /// Interpret the properties as Key Vault properties.
    pub fn as_key_vault(&self) -> Option<KeyVaultProperties> {
        match self {
            ResourceProperties::KeyVault(props) => Some(props.clone()),
            ResourceProperties::Raw(map) => {
                serde_json::from_value(Value::Object(map.clone())).ok()
            }
        }
    }
}

impl From<KeyVaultProperties> for ResourceProperties {
    fn from(props: KeyVaultProperties) -> Self {
        ResourceProperties::KeyVault(props)
    }
}

impl From<Map<String, Value>> for ResourceProperties {
    fn from(map: Map<String, Value>) -> Self {
        ResourceProperties::Raw(map)
    }
}

/// Properties of a `Microsoft.KeyVault/vaults` resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyVaultProperties {
    /// Tenant used to authenticate requests to the vault
    pub tenant_id: String,
    /// Pricing tier
    pub sku: KeyVaultSku,
    /// Access policies; the sample grants none
    #[serde(default)]
    pub access_policies: Vec<Value>,
    /// VMs may retrieve certificates stored as secrets
    #[serde(default)]
    pub enabled_for_deployment: bool,
    /// Resource manager templates may retrieve secrets
    #[serde(default)]
    pub enabled_for_template_deployment: bool,
    /// Disk encryption may retrieve secrets and unwrap keys
    #[serde(default)]
    pub enabled_for_disk_encryption: bool,
}

impl KeyVaultProperties {
    /// A standard-tier vault with no access policies and every deployment
    /// integration switched on.
    pub fn standard(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            sku: KeyVaultSku {
                family: "A".to_string(),
                name: "standard".to_string(),
            },
            access_policies: Vec::new(),
            enabled_for_deployment: true,
            enabled_for_template_deployment: true,
            enabled_for_disk_encryption: true,
        }
    }
}

/// Key Vault SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyVaultSku {
    /// SKU family
    pub family: String,
    /// SKU name
    pub name: String,
}

// ============================================================================
// Template export
// ============================================================================

/// Body of an export template request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTemplateRequest {
    /// Resource ids to export; `*` selects everything
    pub resources: Vec<String>,

    /// Comma-separated export options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
}

impl ExportTemplateRequest {
    /// Export every resource in the group.
    pub fn all_resources() -> Self {
        Self {
            resources: vec!["*".to_string()],
            options: None,
        }
    }
}

/// Result of an export template request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceGroupExportResult {
    /// The exported template document
    #[serde(default)]
    pub template: Option<Value>,

    /// Partial-export diagnostics
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

/// Provider error detail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable code
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
}

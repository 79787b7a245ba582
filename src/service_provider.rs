//! Service provider configuration (RFC 7643 §5).
//!
//! Deployment-wide feature switches and limits the dispatcher consults:
//! filter limits, bulk limits, ETag support, PATCH/sort availability. The
//! configuration also serializes into the `/ServiceProviderConfig` document.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const SERVICE_PROVIDER_CONFIG_URI: &str =
    "urn:ietf:params:scim:schemas:core:2.0:ServiceProviderConfig";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    pub supported: bool,
    /// Upper bound for the `count` parameter on list/search requests.
    pub max_results: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            supported: true,
            max_results: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkConfig {
    pub supported: bool,
    pub max_operations: usize,
    pub max_payload_size: usize,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            supported: true,
            max_operations: 15,
            // 1 MiB, mirroring common deployments
            max_payload_size: 1_048_576,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SupportedFeature {
    pub supported: bool,
}

impl SupportedFeature {
    pub fn enabled() -> Self {
        Self { supported: true }
    }
}

/// Deployment-wide SCIM configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation_uri: Option<String>,
    pub patch: SupportedFeature,
    pub bulk: BulkConfig,
    pub filter: FilterConfig,
    pub change_password: SupportedFeature,
    pub sort: SupportedFeature,
    pub etag: SupportedFeature,
}

impl Default for ServiceProviderConfig {
    fn default() -> Self {
        Self {
            documentation_uri: None,
            patch: SupportedFeature::enabled(),
            bulk: BulkConfig::default(),
            filter: FilterConfig::default(),
            change_password: SupportedFeature::default(),
            sort: SupportedFeature::enabled(),
            etag: SupportedFeature::enabled(),
        }
    }
}

impl ServiceProviderConfig {
    /// The read-only `/ServiceProviderConfig` document.
    pub fn to_document(&self, base_uri: &str) -> Value {
        let mut document = json!({
            "schemas": [SERVICE_PROVIDER_CONFIG_URI],
            "patch": self.patch,
            "bulk": {
                "supported": self.bulk.supported,
                "maxOperations": self.bulk.max_operations,
                "maxPayloadSize": self.bulk.max_payload_size,
            },
            "filter": {
                "supported": self.filter.supported,
                "maxResults": self.filter.max_results,
            },
            "changePassword": self.change_password,
            "sort": self.sort,
            "etag": self.etag,
            "authenticationSchemes": [],
            "meta": {
                "resourceType": "ServiceProviderConfig",
                "location": format!("{base_uri}/ServiceProviderConfig"),
            }
        });
        if let Some(uri) = &self.documentation_uri {
            document
                .as_object_mut()
                .unwrap()
                .insert("documentationUri".to_string(), Value::String(uri.clone()));
        }
        document
    }
}

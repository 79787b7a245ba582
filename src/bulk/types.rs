//! Bulk request and response messages (RFC 7644 §3.7).

use crate::error::{ScimError, ScimResult, ScimType};
use crate::resource_type::HttpMethod;
use crate::service_provider::BulkConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

pub const BULK_REQUEST_URI: &str = "urn:ietf:params:scim:api:messages:2.0:BulkRequest";
pub const BULK_RESPONSE_URI: &str = "urn:ietf:params:scim:api:messages:2.0:BulkResponse";

/// The prefix that marks a string value as a reference to another bulk
/// operation's created resource.
pub const BULK_ID_PREFIX: &str = "bulkId:";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRequestOperation {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bulk_id: Option<String>,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl BulkRequestOperation {
    pub fn method(&self) -> ScimResult<HttpMethod> {
        let method = HttpMethod::from_name(&self.method)?;
        if method == HttpMethod::Get {
            return Err(ScimError::invalid_value(
                "bulk operations do not support the GET method",
            ));
        }
        Ok(method)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRequest {
    pub schemas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on_errors: Option<u32>,
    #[serde(rename = "Operations")]
    pub operations: Vec<BulkRequestOperation>,
}

impl BulkRequest {
    pub fn from_value(value: Value) -> ScimResult<Self> {
        let request: BulkRequest = serde_json::from_value(value)
            .map_err(|e| ScimError::invalid_syntax(format!("invalid bulk request: {e}")))?;
        Ok(request)
    }

    /// Upfront validation, before any operation is executed.
    pub fn validate(&self, config: &BulkConfig) -> ScimResult<()> {
        if !self
            .schemas
            .iter()
            .any(|uri| uri.eq_ignore_ascii_case(BULK_REQUEST_URI))
        {
            return Err(ScimError::invalid_syntax(format!(
                "a bulk request must declare the schema '{BULK_REQUEST_URI}'"
            )));
        }
        if self.operations.is_empty() {
            return Err(ScimError::invalid_value(
                "a bulk request requires at least one operation",
            ));
        }
        if self.operations.len() > config.max_operations {
            return Err(ScimError::bad_request_typed(
                ScimType::TooMany,
                format!(
                    "the bulk request has {} operations but the maximum is {}",
                    self.operations.len(),
                    config.max_operations
                ),
            ));
        }
        let mut bulk_ids: HashSet<String> = HashSet::new();
        for operation in &self.operations {
            let method = operation.method()?;
            if method == HttpMethod::Post && operation.bulk_id.is_none() {
                return Err(ScimError::invalid_value(format!(
                    "the bulk operation with path '{}' creates a resource and requires \
                     a bulkId",
                    operation.path
                )));
            }
            if let Some(bulk_id) = &operation.bulk_id {
                if bulk_id.trim().is_empty() {
                    return Err(ScimError::invalid_value("a bulkId must not be empty"));
                }
                if !bulk_ids.insert(bulk_id.to_lowercase()) {
                    return Err(ScimError::invalid_value(format!(
                        "the bulkId '{bulk_id}' is used by more than one operation"
                    )));
                }
            }
            if method != HttpMethod::Delete && operation.data.is_none() {
                return Err(ScimError::invalid_value(format!(
                    "the bulk operation '{} {}' requires data",
                    operation.method, operation.path
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResponseOperation {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bulk_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub status: u16,
    /// Present on failures, carrying the error message body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkResponse {
    pub schemas: Vec<String>,
    #[serde(rename = "Operations")]
    pub operations: Vec<BulkResponseOperation>,
}

impl BulkResponse {
    pub fn new(operations: Vec<BulkResponseOperation>) -> Self {
        Self {
            schemas: vec![BULK_RESPONSE_URI.to_string()],
            operations,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

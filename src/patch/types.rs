//! The PATCH request message (RFC 7644 §3.5.2).

use crate::error::{ScimError, ScimResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PATCH_OP_URI: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Replace,
    Remove,
}

impl PatchOp {
    pub fn from_name(name: &str) -> ScimResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "replace" => Ok(Self::Replace),
            "remove" => Ok(Self::Remove),
            other => Err(ScimError::invalid_value(format!(
                "'{other}' is not a patch operation, expected one of: add, replace, remove"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchOperation {
    /// The raw operation name. Parsed case-insensitively via [`PatchOp`].
    pub op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PatchOperation {
    pub fn add(path: Option<&str>, value: Value) -> Self {
        Self {
            op: "add".to_string(),
            path: path.map(str::to_string),
            value: Some(value),
        }
    }

    pub fn replace(path: Option<&str>, value: Value) -> Self {
        Self {
            op: "replace".to_string(),
            path: path.map(str::to_string),
            value: Some(value),
        }
    }

    pub fn remove(path: &str) -> Self {
        Self {
            op: "remove".to_string(),
            path: Some(path.to_string()),
            value: None,
        }
    }

    pub fn operation(&self) -> ScimResult<PatchOp> {
        PatchOp::from_name(&self.op)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchRequest {
    pub schemas: Vec<String>,
    #[serde(rename = "Operations")]
    pub operations: Vec<PatchOperation>,
}

impl PatchRequest {
    pub fn new(operations: Vec<PatchOperation>) -> Self {
        Self {
            schemas: vec![PATCH_OP_URI.to_string()],
            operations,
        }
    }

    pub fn from_value(value: Value) -> ScimResult<Self> {
        let request: PatchRequest = serde_json::from_value(value)
            .map_err(|e| ScimError::invalid_syntax(format!("invalid patch request: {e}")))?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> ScimResult<()> {
        if !self
            .schemas
            .iter()
            .any(|uri| uri.eq_ignore_ascii_case(PATCH_OP_URI))
        {
            return Err(ScimError::invalid_syntax(format!(
                "a patch request must declare the schema '{PATCH_OP_URI}'"
            )));
        }
        if self.operations.is_empty() {
            return Err(ScimError::invalid_value(
                "a patch request requires at least one operation",
            ));
        }
        for operation in &self.operations {
            let op = operation.operation()?;
            match op {
                PatchOp::Remove => {
                    if operation.path.is_none() {
                        return Err(ScimError::no_target(
                            "a remove operation requires a path",
                        ));
                    }
                }
                PatchOp::Add | PatchOp::Replace => {
                    if operation.value.is_none() {
                        return Err(ScimError::invalid_value(format!(
                            "a {} operation requires a value",
                            operation.op.to_ascii_lowercase()
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

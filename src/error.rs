//! Error types for SCIM protocol processing.
//!
//! Every failure in the engine resolves into a single tagged [`ScimError`]
//! carrying the HTTP status and, where RFC 7644 defines one, a `scimType`
//! token. The request dispatcher is the only place that serializes an error
//! into the SCIM error-response document; everything below it simply
//! propagates the typed value unchanged.

use serde_json::{Value, json};

/// The `schemas` URI of the SCIM error response document (RFC 7644 §3.12).
pub const ERROR_SCHEMA_URI: &str = "urn:ietf:params:scim:api:messages:2.0:Error";

/// SCIM detail error keyword as defined in RFC 7644 §3.12, plus the
/// non-normative tokens the protocol needs for registration-time failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScimType {
    InvalidFilter,
    TooMany,
    Uniqueness,
    Mutability,
    InvalidSyntax,
    InvalidPath,
    NoTarget,
    InvalidValue,
    InvalidVersion,
    Sensitive,
    /// Request parameters violate the protocol table (method/id mismatch,
    /// exclusive parameters given together, bulk limits exceeded, ...).
    InvalidParameters,
    /// The request URI does not point to a registered resource type.
    UnknownResource,
}

impl ScimType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScimType::InvalidFilter => "invalidFilter",
            ScimType::TooMany => "tooMany",
            ScimType::Uniqueness => "uniqueness",
            ScimType::Mutability => "mutability",
            ScimType::InvalidSyntax => "invalidSyntax",
            ScimType::InvalidPath => "invalidPath",
            ScimType::NoTarget => "noTarget",
            ScimType::InvalidValue => "invalidValue",
            ScimType::InvalidVersion => "invalidVers",
            ScimType::Sensitive => "sensitive",
            ScimType::InvalidParameters => "invalidParameters",
            ScimType::UnknownResource => "unknownResource",
        }
    }
}

impl std::fmt::Display for ScimType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for SCIM protocol operations.
///
/// Each variant maps onto exactly one HTTP status code. Validation and
/// resolution errors raised deep in schema, filter, patch or bulk processing
/// use these variants directly so that the dispatcher never has to translate
/// between error kinds.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScimError {
    /// Malformed request: bad filter, bad path, bad value, protocol misuse.
    #[error("Bad request{}: {detail}", scim_type.map(|t| format!(" ({t})")).unwrap_or_default())]
    BadRequest {
        scim_type: Option<ScimType>,
        detail: String,
    },

    /// The request lacks valid authentication.
    #[error("Unauthorized: {detail}")]
    Unauthorized { detail: String },

    /// The authenticated client is not allowed to perform the operation.
    #[error("Forbidden: {detail}")]
    Forbidden { detail: String },

    /// The addressed resource (or endpoint) does not exist.
    #[error("Resource not found: {detail}")]
    ResourceNotFound { detail: String },

    /// Duplicate unique attribute or id collision.
    #[error("Conflict: {detail}")]
    Conflict { detail: String },

    /// `If-Match` precondition failed (RFC 7232).
    #[error("Precondition failed: {detail}")]
    PreconditionFailed { detail: String },

    /// `If-None-Match` matched the current version; the resource is unchanged.
    #[error("Resource not modified")]
    NotModified,

    /// The endpoint or operation is disabled for this deployment.
    #[error("Not implemented: {detail}")]
    NotImplemented { detail: String },

    /// Unexpected failure that indicates a programming error.
    #[error("Internal server error: {detail}")]
    Internal { detail: String },
}

impl ScimError {
    /// Create a plain `BadRequest` without a scimType token.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::BadRequest {
            scim_type: None,
            detail: detail.into(),
        }
    }

    /// Create a `BadRequest` with the given scimType token.
    pub fn bad_request_typed(scim_type: ScimType, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            scim_type: Some(scim_type),
            detail: detail.into(),
        }
    }

    pub fn invalid_filter(detail: impl Into<String>) -> Self {
        Self::bad_request_typed(ScimType::InvalidFilter, detail)
    }

    pub fn invalid_path(detail: impl Into<String>) -> Self {
        Self::bad_request_typed(ScimType::InvalidPath, detail)
    }

    pub fn invalid_value(detail: impl Into<String>) -> Self {
        Self::bad_request_typed(ScimType::InvalidValue, detail)
    }

    pub fn invalid_parameters(detail: impl Into<String>) -> Self {
        Self::bad_request_typed(ScimType::InvalidParameters, detail)
    }

    pub fn invalid_syntax(detail: impl Into<String>) -> Self {
        Self::bad_request_typed(ScimType::InvalidSyntax, detail)
    }

    pub fn mutability(detail: impl Into<String>) -> Self {
        Self::bad_request_typed(ScimType::Mutability, detail)
    }

    pub fn no_target(detail: impl Into<String>) -> Self {
        Self::bad_request_typed(ScimType::NoTarget, detail)
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::Unauthorized {
            detail: detail.into(),
        }
    }

    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::Forbidden {
            detail: detail.into(),
        }
    }

    pub fn resource_not_found(detail: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            detail: detail.into(),
        }
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::Conflict {
            detail: detail.into(),
        }
    }

    pub fn precondition_failed(detail: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            detail: detail.into(),
        }
    }

    pub fn not_implemented(detail: impl Into<String>) -> Self {
        Self::NotImplemented {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    /// The HTTP status code this error maps onto.
    pub fn status(&self) -> u16 {
        match self {
            ScimError::BadRequest { .. } => 400,
            ScimError::Unauthorized { .. } => 401,
            ScimError::Forbidden { .. } => 403,
            ScimError::ResourceNotFound { .. } => 404,
            ScimError::Conflict { .. } => 409,
            ScimError::PreconditionFailed { .. } => 412,
            ScimError::NotModified => 304,
            ScimError::NotImplemented { .. } => 501,
            ScimError::Internal { .. } => 500,
        }
    }

    /// The RFC 7644 scimType token, if this error carries one.
    pub fn scim_type(&self) -> Option<ScimType> {
        match self {
            ScimError::BadRequest { scim_type, .. } => *scim_type,
            _ => None,
        }
    }

    /// The human readable detail message, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ScimError::BadRequest { detail, .. }
            | ScimError::Unauthorized { detail }
            | ScimError::Forbidden { detail }
            | ScimError::ResourceNotFound { detail }
            | ScimError::Conflict { detail }
            | ScimError::PreconditionFailed { detail }
            | ScimError::NotImplemented { detail }
            | ScimError::Internal { detail } => Some(detail),
            ScimError::NotModified => None,
        }
    }

    /// Serialize into the RFC 7644 §3.12 error response document.
    pub fn to_error_response(&self) -> Value {
        let mut error = json!({
            "schemas": [ERROR_SCHEMA_URI],
            "status": self.status().to_string(),
        });
        let obj = error.as_object_mut().unwrap();
        if let Some(detail) = self.detail() {
            obj.insert("detail".to_string(), Value::String(detail.to_string()));
        }
        if let Some(scim_type) = self.scim_type() {
            obj.insert(
                "scimType".to_string(),
                Value::String(scim_type.as_str().to_string()),
            );
        }
        error
    }
}

impl From<serde_json::Error> for ScimError {
    fn from(error: serde_json::Error) -> Self {
        ScimError::bad_request_typed(
            ScimType::InvalidSyntax,
            format!("the request document could not be parsed: {error}"),
        )
    }
}

/// Result type alias used throughout the crate.
pub type ScimResult<T> = Result<T, ScimError>;

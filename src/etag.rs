//! Resource versioning and conditional-request handling (RFC 7644 §3.14,
//! RFC 7232).
//!
//! A resource's version is either the explicit `meta.version` set by the
//! handler or, when ETags are enabled for the deployment and the resource
//! type, a weak tag computed as the base64 of the SHA-1 digest of the
//! canonical document serialization.

use crate::document::Document;
use crate::error::{ScimError, ScimResult};
use crate::resource_type::ResourceType;
use crate::service_provider::ServiceProviderConfig;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub const IF_MATCH: &str = "if-match";
pub const IF_NONE_MATCH: &str = "if-none-match";

/// An entity tag: weak flag plus opaque tag string.
#[derive(Debug, Clone, Eq)]
pub struct ETag {
    pub weak: bool,
    pub tag: String,
}

/// ETag comparison follows the weak comparison function: the weak flag is
/// ignored, only the opaque tags must match.
impl PartialEq for ETag {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
    }
}

impl ETag {
    pub fn weak(tag: impl Into<String>) -> Self {
        Self {
            weak: true,
            tag: tag.into(),
        }
    }

    pub fn strong(tag: impl Into<String>) -> Self {
        Self {
            weak: false,
            tag: tag.into(),
        }
    }

    /// The header representation, e.g. `W/"3bK5Qp..."`.
    pub fn entity_tag(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weak {
            write!(f, "W/\"{}\"", self.tag)
        } else {
            write!(f, "\"{}\"", self.tag)
        }
    }
}

impl FromStr for ETag {
    type Err = ScimError;

    /// Accepts `W/"tag"`, `"tag"` and the bare `tag` form some clients send.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ScimError::invalid_value("the entity tag is empty"));
        }
        let (weak, rest) = match trimmed.strip_prefix("W/").or_else(|| trimmed.strip_prefix("w/")) {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let tag = if rest.starts_with('"') {
            rest.strip_prefix('"')
                .and_then(|r| r.strip_suffix('"'))
                .ok_or_else(|| {
                    ScimError::invalid_value(format!("the entity tag '{raw}' is malformed"))
                })?
        } else {
            rest
        };
        if tag.is_empty() {
            return Err(ScimError::invalid_value(format!(
                "the entity tag '{raw}' is malformed"
            )));
        }
        Ok(ETag {
            weak,
            tag: tag.to_string(),
        })
    }
}

/// Compute the weak version tag for a document: base64(SHA-1(canonical JSON)).
pub fn generate_version(document: &Document) -> ETag {
    let mut hasher = Sha1::new();
    hasher.update(document.to_canonical_json().as_bytes());
    ETag::weak(BASE64.encode(hasher.finalize()))
}

fn etag_enabled(service_provider: &ServiceProviderConfig, resource_type: &ResourceType) -> bool {
    if !service_provider.etag.supported {
        log::trace!("etag support is disabled for this service provider");
        return false;
    }
    if !resource_type.features.etag_enabled {
        log::trace!(
            "etag support is disabled for resource type {}",
            resource_type.name
        );
        return false;
    }
    true
}

/// The version of a resource: its explicit `meta.version` when present,
/// else a computed weak tag. `None` when ETags are disabled at the service
/// provider or resource type level.
pub fn resource_version(
    service_provider: &ServiceProviderConfig,
    resource_type: &ResourceType,
    document: &Document,
) -> ScimResult<Option<ETag>> {
    if !etag_enabled(service_provider, resource_type) {
        return Ok(None);
    }
    if let Some(version) = document.version()? {
        return Ok(Some(version.parse()?));
    }
    Ok(Some(generate_version(document)))
}

fn header_etag(headers: &HashMap<String, String>, name: &str) -> ScimResult<Option<ETag>> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.parse())
        .transpose()
}

/// Validate the conditional-request headers against the resource's current
/// state.
///
/// Exactly one of `If-Match` / `If-None-Match` may be present; both at once
/// is a `BadRequest` raised before any version comparison. A matching
/// `If-None-Match` yields `NotModified`, a failing `If-Match` yields
/// `PreconditionFailed`. The current state is pulled lazily so that
/// requests without conditional headers never touch the handler.
pub fn validate_version<F>(
    service_provider: &ServiceProviderConfig,
    resource_type: &ResourceType,
    current_state: F,
    headers: &HashMap<String, String>,
) -> ScimResult<()>
where
    F: FnOnce() -> ScimResult<Option<Document>>,
{
    let if_match = header_etag(headers, IF_MATCH)?;
    let if_none_match = header_etag(headers, IF_NONE_MATCH)?;
    if if_match.is_some() && if_none_match.is_some() {
        return Err(ScimError::invalid_parameters(
            "the headers 'If-Match' and 'If-None-Match' must not be used together",
        ));
    }
    if !etag_enabled(service_provider, resource_type) {
        return Ok(());
    }
    let (header_name, expected) = match (if_match, if_none_match) {
        (Some(etag), None) => (IF_MATCH, etag),
        (None, Some(etag)) => (IF_NONE_MATCH, etag),
        _ => return Ok(()),
    };

    let document = current_state()?.ok_or_else(|| {
        ScimError::resource_not_found(format!(
            "the conditional request did not match any {} resource",
            resource_type.name
        ))
    })?;
    let current = match document.version()? {
        Some(version) => version.parse()?,
        None => generate_version(&document),
    };

    if header_name == IF_NONE_MATCH {
        if current == expected {
            return Err(ScimError::NotModified);
        }
    } else if current != expected {
        return Err(ScimError::precondition_failed(format!(
            "the version of the resource has changed; current version is: {}",
            current.entity_tag()
        )));
    }
    Ok(())
}

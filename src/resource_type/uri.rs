//! Request URI resolution: maps a raw URL and HTTP method onto a
//! registered resource type, an optional resource id and the query
//! parameters, and rejects method/path combinations the protocol does not
//! allow.

use crate::error::{ScimError, ScimResult};
use crate::resource_type::{ResourceType, ResourceTypeRegistry};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The suffix that turns a list endpoint into a POST-based search.
pub const SEARCH_SUFFIX: &str = ".search";

/// The bulk endpoint. It is not backed by a resource type and only accepts
/// POST.
pub const BULK_ENDPOINT: &str = "/Bulk";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Post,
    Get,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn from_name(name: &str) -> ScimResult<Self> {
        match name.to_ascii_uppercase().as_str() {
            "POST" => Ok(Self::Post),
            "GET" => Ok(Self::Get),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(ScimError::bad_request(format!(
                "the HTTP method '{other}' is not supported"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved parts of a request URI.
#[derive(Debug, Clone)]
pub struct UriInfo {
    /// Everything before the resource endpoint, e.g. `https://host/scim/v2`.
    pub base_uri: String,
    /// The resource type the endpoint belongs to. `None` for bulk requests.
    pub resource_type: Option<Arc<ResourceType>>,
    pub resource_id: Option<String>,
    /// True when the path ends in `/.search`.
    pub search_request: bool,
    /// True when the path targets the bulk endpoint.
    pub bulk_request: bool,
    pub query: HashMap<String, String>,
}

impl UriInfo {
    /// The location of a resource under this request's base, e.g.
    /// `https://host/scim/v2/Users/2819c223`.
    pub fn resource_location(&self, endpoint: &str, id: &str) -> String {
        format!("{}{}/{}", self.base_uri, endpoint, id)
    }
}

/// Resolve a request URI against the registered resource types.
///
/// Accepts absolute URLs and bare paths. The method/path combination is
/// validated here: POST never carries a resource id, PUT/PATCH/DELETE
/// always do, `.search` and the bulk endpoint are POST-only.
pub fn resolve(
    registry: &ResourceTypeRegistry,
    uri: &str,
    method: HttpMethod,
) -> ScimResult<UriInfo> {
    let (path_part, query_part) = match uri.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (uri, None),
    };
    let path_part = path_part.trim_end_matches('/');
    let query = query_part.map(parse_query).transpose()?.unwrap_or_default();

    if let Some(base_uri) = strip_endpoint(path_part, BULK_ENDPOINT) {
        if !base_uri.remainder.is_empty() {
            return Err(ScimError::bad_request(format!(
                "the bulk endpoint does not have sub-paths: '{uri}'"
            )));
        }
        if method != HttpMethod::Post {
            return Err(ScimError::bad_request(format!(
                "bulk requests must use POST, got {method}"
            )));
        }
        return Ok(UriInfo {
            base_uri: base_uri.base,
            resource_type: None,
            resource_id: None,
            search_request: false,
            bulk_request: true,
            query,
        });
    }

    // Prefer the longest matching endpoint so that e.g. a hypothetical
    // "/Users/Admins" type is not shadowed by "/Users".
    let mut best: Option<(&Arc<ResourceType>, SplitPath)> = None;
    for resource_type in registry.iter() {
        if let Some(split) = strip_endpoint(path_part, &resource_type.endpoint) {
            let longer = best
                .as_ref()
                .map(|(current, _)| resource_type.endpoint.len() > current.endpoint.len())
                .unwrap_or(true);
            if longer {
                best = Some((resource_type, split));
            }
        }
    }
    let (resource_type, split) = best.ok_or_else(|| {
        ScimError::bad_request_typed(
            crate::error::ScimType::UnknownResource,
            format!("the URI '{uri}' does not match any registered resource type"),
        )
    })?;

    let (resource_id, search_request) = match split.remainder.as_str() {
        "" => (None, false),
        SEARCH_SUFFIX => (None, true),
        id => {
            if id.contains('/') {
                return Err(ScimError::bad_request(format!(
                    "the URI '{uri}' has more path segments than the protocol allows"
                )));
            }
            (Some(percent_decode(id)?), false)
        }
    };

    if search_request && method != HttpMethod::Post {
        return Err(ScimError::bad_request(format!(
            "search requests must use POST, got {method}"
        )));
    }
    match method {
        HttpMethod::Post if resource_id.is_some() => {
            return Err(ScimError::bad_request(
                "POST requests must not reference a resource id",
            ));
        }
        HttpMethod::Put | HttpMethod::Patch | HttpMethod::Delete if resource_id.is_none() => {
            return Err(ScimError::bad_request(format!(
                "{method} requests require a resource id"
            )));
        }
        _ => {}
    }

    Ok(UriInfo {
        base_uri: split.base,
        resource_type: Some(Arc::clone(resource_type)),
        resource_id,
        search_request,
        bulk_request: false,
        query,
    })
}

struct SplitPath {
    base: String,
    /// Whatever follows the endpoint, without the leading slash.
    remainder: String,
}

/// Split `path` around `endpoint` (case-insensitive). The endpoint must be
/// a full path segment: followed by '/', or at the end of the path.
fn strip_endpoint(path: &str, endpoint: &str) -> Option<SplitPath> {
    let lower_path = path.to_ascii_lowercase();
    let lower_endpoint = endpoint.to_ascii_lowercase();
    let start = lower_path.find(&lower_endpoint)?;
    let end = start + endpoint.len();
    let rest = &path[end..];
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }
    Some(SplitPath {
        base: path[..start].to_string(),
        remainder: rest.trim_start_matches('/').to_string(),
    })
}

fn parse_query(raw: &str) -> ScimResult<HashMap<String, String>> {
    let mut query = HashMap::new();
    for pair in raw.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        query.insert(percent_decode(key)?.to_lowercase(), percent_decode(value)?);
    }
    Ok(query)
}

/// Minimal application/x-www-form-urlencoded decoding.
fn percent_decode(raw: &str) -> ScimResult<String> {
    let mut decoded = Vec::with_capacity(raw.len());
    let mut bytes = raw.bytes();
    while let Some(byte) = bytes.next() {
        match byte {
            b'+' => decoded.push(b' '),
            b'%' => {
                let high = bytes.next();
                let low = bytes.next();
                let pair = match (high, low) {
                    (Some(high), Some(low)) => {
                        let hex = [high, low];
                        std::str::from_utf8(&hex)
                            .ok()
                            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                    }
                    _ => None,
                };
                match pair {
                    Some(value) => decoded.push(value),
                    None => {
                        return Err(ScimError::bad_request(format!(
                            "invalid percent-encoding in '{raw}'"
                        )));
                    }
                }
            }
            other => decoded.push(other),
        }
    }
    String::from_utf8(decoded)
        .map_err(|_| ScimError::bad_request(format!("invalid percent-encoding in '{raw}'")))
}

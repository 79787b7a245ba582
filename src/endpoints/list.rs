//! List and search plumbing: query/message parsing, in-memory sorting and
//! pagination for resource types with auto-filtering enabled.

use crate::document::Document;
use crate::error::{ScimError, ScimResult};
use crate::filter::{AttributePath, extract_values};
use crate::handler::SortOrder;
use crate::service_provider::FilterConfig;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

pub const SEARCH_REQUEST_URI: &str = "urn:ietf:params:scim:api:messages:2.0:SearchRequest";
pub const LIST_RESPONSE_URI: &str = "urn:ietf:params:scim:api:messages:2.0:ListResponse";

/// Raw list parameters from either the query string or a search message.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub filter: Option<String>,
    pub start_index: Option<i64>,
    pub count: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub attributes: Vec<String>,
    pub excluded_attributes: Vec<String>,
}

fn split_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

impl ListParams {
    /// Query parameter names are matched case-insensitively; the URI
    /// resolver lowercases them.
    pub fn from_query(query: &HashMap<String, String>) -> ScimResult<Self> {
        let number = |name: &str| -> ScimResult<Option<i64>> {
            query
                .get(name)
                .map(|raw| {
                    raw.parse::<i64>().map_err(|_| {
                        ScimError::invalid_value(format!(
                            "'{raw}' is not a valid value for the '{name}' parameter"
                        ))
                    })
                })
                .transpose()
        };
        Ok(Self {
            filter: query.get("filter").cloned(),
            start_index: number("startindex")?,
            count: number("count")?,
            sort_by: query.get("sortby").cloned(),
            sort_order: query.get("sortorder").cloned(),
            attributes: query.get("attributes").map_or_else(Vec::new, |raw| split_names(raw)),
            excluded_attributes: query
                .get("excludedattributes")
                .map_or_else(Vec::new, |raw| split_names(raw)),
        })
    }

    /// Parse the body of a POST `.search` request.
    pub fn from_search_request(value: Value) -> ScimResult<Self> {
        let Value::Object(body) = value else {
            return Err(ScimError::invalid_syntax(
                "a search request must be a JSON object",
            ));
        };
        let get = |name: &str| -> Option<&Value> {
            body.iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        };
        let declares_schema = get("schemas")
            .and_then(Value::as_array)
            .is_some_and(|uris| {
                uris.iter()
                    .filter_map(Value::as_str)
                    .any(|uri| uri.eq_ignore_ascii_case(SEARCH_REQUEST_URI))
            });
        if !declares_schema {
            return Err(ScimError::invalid_syntax(format!(
                "a search request must declare the schema '{SEARCH_REQUEST_URI}'"
            )));
        }
        let text = |name: &str| -> ScimResult<Option<String>> {
            match get(name) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::String(text)) => Ok(Some(text.clone())),
                Some(other) => Err(ScimError::invalid_value(format!(
                    "'{name}' must be a string, got {other}"
                ))),
            }
        };
        let number = |name: &str| -> ScimResult<Option<i64>> {
            match get(name) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::Number(number)) if number.as_i64().is_some() => {
                    Ok(number.as_i64())
                }
                Some(other) => Err(ScimError::invalid_value(format!(
                    "'{name}' must be an integer, got {other}"
                ))),
            }
        };
        let names = |name: &str| -> ScimResult<Vec<String>> {
            match get(name) {
                None | Some(Value::Null) => Ok(Vec::new()),
                Some(Value::String(raw)) => Ok(split_names(raw)),
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|item| {
                        item.as_str().map(str::to_string).ok_or_else(|| {
                            ScimError::invalid_value(format!(
                                "'{name}' entries must be strings"
                            ))
                        })
                    })
                    .collect(),
                Some(other) => Err(ScimError::invalid_value(format!(
                    "'{name}' must be an array of attribute names, got {other}"
                ))),
            }
        };
        Ok(Self {
            filter: text("filter")?,
            start_index: number("startIndex")?,
            count: number("count")?,
            sort_by: text("sortBy")?,
            sort_order: text("sortOrder")?,
            attributes: names("attributes")?,
            excluded_attributes: names("excludedAttributes")?,
        })
    }

    pub fn sort_order(&self) -> ScimResult<SortOrder> {
        match &self.sort_order {
            None => Ok(SortOrder::default()),
            Some(raw) => SortOrder::from_param(raw).ok_or_else(|| {
                ScimError::invalid_value(format!(
                    "'{raw}' is not a sort order, expected 'ascending' or 'descending'"
                ))
            }),
        }
    }

    /// Clamp `startIndex` to at least 1 and `count` to `[0, maxResults]`;
    /// a missing count means the provider maximum.
    pub fn pagination(&self, filter_config: &FilterConfig) -> (usize, usize) {
        let start_index = self.start_index.map_or(1, |raw| raw.max(1)) as usize;
        let count = match self.count {
            None => filter_config.max_results,
            Some(raw) => raw.clamp(0, filter_config.max_results as i64) as usize,
        };
        (start_index, count)
    }
}

/// Sort documents by one attribute path. Resources missing the attribute
/// sort after everything else regardless of direction.
pub fn sort_documents(documents: &mut [Document], path: &AttributePath, order: SortOrder) {
    let case_exact = path.target().case_exact;
    documents.sort_by(|left, right| {
        let left_value = extract_values(path, left).into_iter().next();
        let right_value = extract_values(path, right).into_iter().next();
        match (left_value, right_value) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(left), Some(right)) => {
                let ordering = compare_sort_values(&left, &right, case_exact);
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            }
        }
    });
}

fn compare_sort_values(left: &Value, right: &Value, case_exact: bool) -> Ordering {
    match (left, right) {
        (Value::String(left), Value::String(right)) => {
            if case_exact {
                left.cmp(right)
            } else {
                left.to_lowercase().cmp(&right.to_lowercase())
            }
        }
        (Value::Number(left), Value::Number(right)) => left
            .as_f64()
            .partial_cmp(&right.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Bool(left), Value::Bool(right)) => left.cmp(right),
        _ => Ordering::Equal,
    }
}

/// One page of a full result set, 1-based `start_index`.
pub fn paginate(documents: Vec<Document>, start_index: usize, count: usize) -> Vec<Document> {
    documents
        .into_iter()
        .skip(start_index.saturating_sub(1))
        .take(count)
        .collect()
}

/// Assemble the list response message.
pub fn list_response(
    resources: Vec<Value>,
    total_results: usize,
    start_index: usize,
) -> Value {
    serde_json::json!({
        "schemas": [LIST_RESPONSE_URI],
        "totalResults": total_results,
        "startIndex": start_index,
        "itemsPerPage": resources.len(),
        "Resources": resources,
    })
}

//! In-memory evaluation of a parsed filter against a resource document.
//!
//! Used by the dispatcher's auto-filtering and by the patch engine's value
//! filters. Handlers that translate the AST into a backing query instead
//! never call into this module.

use super::ast::{AttributeExpression, AttributePath, Comparator, CompareValue, FilterNode};
use crate::document::Document;
use crate::error::ScimResult;
use crate::schema::AttributeType;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Evaluate a filter tree against a document.
pub fn evaluate(node: &FilterNode, document: &Document) -> ScimResult<bool> {
    match node {
        FilterNode::Leaf(leaf) => evaluate_leaf(leaf, document),
        FilterNode::And(left, right) => {
            Ok(evaluate(left, document)? && evaluate(right, document)?)
        }
        FilterNode::Or(left, right) => {
            Ok(evaluate(left, document)? || evaluate(right, document)?)
        }
        FilterNode::Not(child) => Ok(!evaluate(child, document)?),
    }
}

/// Evaluate a filter tree against one entry of a multi-valued complex
/// attribute (bracket sub-filters in PATCH paths).
pub fn evaluate_on_entry(node: &FilterNode, entry: &Value) -> ScimResult<bool> {
    match node {
        FilterNode::Leaf(leaf) => {
            let values = entry
                .get(&leaf.path.attribute_name)
                .or_else(|| find_ignore_case(entry, &leaf.path.attribute_name))
                .cloned()
                .map(|v| vec![v])
                .unwrap_or_default();
            Ok(compare_values(leaf, &values))
        }
        FilterNode::And(left, right) => {
            Ok(evaluate_on_entry(left, entry)? && evaluate_on_entry(right, entry)?)
        }
        FilterNode::Or(left, right) => {
            Ok(evaluate_on_entry(left, entry)? || evaluate_on_entry(right, entry)?)
        }
        FilterNode::Not(child) => Ok(!evaluate_on_entry(child, entry)?),
    }
}

fn evaluate_leaf(leaf: &AttributeExpression, document: &Document) -> ScimResult<bool> {
    let values = extract_values(&leaf.path, document);
    Ok(compare_values(leaf, &values))
}

/// Collect the concrete values a path points at within a document.
///
/// Extension attributes live below the object keyed by their schema id, so
/// the path's `schema_id` decides where navigation starts. Bracket filters
/// narrow multi-valued entries before a sub-attribute is applied.
pub fn extract_values(path: &AttributePath, document: &Document) -> Vec<Value> {
    // Extension attributes are nested under their schema URI when that
    // object exists; core attributes sit at the top level.
    let root = document
        .get_ignore_case(&path.schema_id)
        .and_then(|value| value.as_object())
        .and_then(|obj| {
            obj.get(&path.attribute_name)
                .or_else(|| obj_get_ignore_case(obj, &path.attribute_name))
        })
        .or_else(|| document.get_ignore_case(&path.attribute_name));

    let Some(root) = root else {
        return Vec::new();
    };

    let mut entries: Vec<&Value> = match root {
        Value::Array(items) => items.iter().collect(),
        single => vec![single],
    };

    if let Some(filter) = &path.value_filter {
        entries.retain(|entry| evaluate_on_entry(filter, entry).unwrap_or(false));
    }

    match &path.sub_attribute {
        None => entries.into_iter().cloned().collect(),
        Some(sub) => entries
            .into_iter()
            .filter_map(|entry| {
                entry
                    .get(sub)
                    .or_else(|| find_ignore_case(entry, sub))
                    .cloned()
            })
            .collect(),
    }
}

fn obj_get_ignore_case<'v>(
    obj: &'v serde_json::Map<String, Value>,
    name: &str,
) -> Option<&'v Value> {
    obj.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

fn find_ignore_case<'v>(value: &'v Value, name: &str) -> Option<&'v Value> {
    value.as_object().and_then(|obj| obj_get_ignore_case(obj, name))
}

fn compare_values(leaf: &AttributeExpression, values: &[Value]) -> bool {
    let present = values.iter().any(is_non_empty);
    match leaf.comparator {
        Comparator::Pr => present,
        Comparator::Ne => !values
            .iter()
            .any(|value| matches_single(leaf, value, Comparator::Eq)),
        comparator => values
            .iter()
            .any(|value| matches_single(leaf, value, comparator)),
    }
}

fn is_non_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(obj) => !obj.is_empty(),
        _ => true,
    }
}

fn matches_single(leaf: &AttributeExpression, actual: &Value, comparator: Comparator) -> bool {
    let Some(expected) = &leaf.value else {
        return false;
    };
    let target = leaf.path.target();

    if matches!(expected, CompareValue::Null) {
        return matches!(actual, Value::Null);
    }

    match target.attribute_type {
        AttributeType::Boolean => match (actual, expected) {
            (Value::Bool(a), CompareValue::Boolean(e)) => a == e,
            _ => false,
        },
        AttributeType::Integer | AttributeType::Decimal => match (actual, expected) {
            (Value::Number(a), CompareValue::Number(e)) => {
                let Some(a) = a.as_f64() else { return false };
                numeric_matches(comparator, a, *e)
            }
            _ => false,
        },
        AttributeType::DateTime => match (actual, expected) {
            (Value::String(a), CompareValue::String(e)) => {
                match (parse_datetime(a), parse_datetime(e)) {
                    (Some(a), Some(e)) => ordered_matches(comparator, a.cmp(&e)),
                    _ => false,
                }
            }
            _ => false,
        },
        // string, reference, binary -- string comparison, with case folding
        // unless the attribute is caseExact.
        _ => match (actual, expected) {
            (Value::String(a), CompareValue::String(e)) => {
                string_matches(comparator, a, e, target.case_exact)
            }
            _ => false,
        },
    }
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn numeric_matches(comparator: Comparator, actual: f64, expected: f64) -> bool {
    match comparator {
        Comparator::Eq => actual == expected,
        Comparator::Gt => actual > expected,
        Comparator::Ge => actual >= expected,
        Comparator::Lt => actual < expected,
        Comparator::Le => actual <= expected,
        _ => false,
    }
}

fn ordered_matches(comparator: Comparator, ordering: std::cmp::Ordering) -> bool {
    use std::cmp::Ordering::*;
    match comparator {
        Comparator::Eq => ordering == Equal,
        Comparator::Gt => ordering == Greater,
        Comparator::Ge => ordering != Less,
        Comparator::Lt => ordering == Less,
        Comparator::Le => ordering != Greater,
        _ => false,
    }
}

fn string_matches(comparator: Comparator, actual: &str, expected: &str, case_exact: bool) -> bool {
    let (a, e) = if case_exact {
        (actual.to_string(), expected.to_string())
    } else {
        (actual.to_lowercase(), expected.to_lowercase())
    };
    match comparator {
        Comparator::Eq => a == e,
        Comparator::Co => a.contains(&e),
        Comparator::Sw => a.starts_with(&e),
        Comparator::Ew => a.ends_with(&e),
        Comparator::Gt => a > e,
        Comparator::Ge => a >= e,
        Comparator::Lt => a < e,
        Comparator::Le => a <= e,
        _ => false,
    }
}

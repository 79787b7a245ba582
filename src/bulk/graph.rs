//! Dependency ordering and bulkId resolution for bulk operations.
//!
//! An operation whose path or data contains a `bulkId:X` reference depends
//! on the operation that carries `bulkId: X`. References are located
//! schema-driven: within resource payloads only resource-reference
//! attributes (complex attributes exposing `value`/`$ref`, like group
//! members) and writable reference-typed attributes are candidates, so an
//! ordinary string that happens to start with the prefix is left alone.
//! The graph is an adjacency list over operation indexes; execution order
//! is a topological sort that breaks ties by submission order, so
//! independent operations run in the order the client sent them. Cycles,
//! including self-references, are rejected before anything executes.

use crate::bulk::types::{BULK_ID_PREFIX, BulkRequest};
use crate::error::{ScimError, ScimResult};
use crate::resource_type::{HttpMethod, ResourceType, ResourceTypeRegistry};
use crate::schema::{AttributeType, Mutability, Schema, SchemaAttribute};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A created resource a bulkId reference resolves to.
#[derive(Debug, Clone)]
pub struct ResolvedResource {
    pub id: String,
    pub location: Option<String>,
}

/// What a resolved reference is substituted with: the resource id for
/// `value` sub-attributes and path segments, the resource location for
/// `$ref` sub-attributes.
#[derive(Clone, Copy)]
enum RefKind {
    Id,
    Location,
}

enum Action<'a> {
    Collect(&'a mut Vec<String>),
    Substitute {
        resolved: &'a HashMap<String, ResolvedResource>,
        unresolved: &'a mut Vec<String>,
    },
}

/// Compute the execution order of a bulk request's operations.
pub fn execution_order(
    request: &BulkRequest,
    registry: &ResourceTypeRegistry,
) -> ScimResult<Vec<usize>> {
    let count = request.operations.len();
    let mut index_by_bulk_id: HashMap<String, usize> = HashMap::new();
    for (index, operation) in request.operations.iter().enumerate() {
        if let Some(bulk_id) = &operation.bulk_id {
            index_by_bulk_id.insert(bulk_id.to_lowercase(), index);
        }
    }

    // dependencies[i] holds the indexes operation i must wait for
    let mut dependencies: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (index, operation) in request.operations.iter().enumerate() {
        let mut references = Vec::new();
        if let Some(reference) = path_reference(&operation.path) {
            references.push(reference);
        }
        if let Some(data) = &operation.data {
            if let Some(resource_type) = registry.by_endpoint(&endpoint_of(&operation.path)) {
                let mut data = data.clone();
                walk_payload(
                    &mut data,
                    resource_type,
                    operation.method()?,
                    &mut Action::Collect(&mut references),
                );
            }
        }
        for reference in references {
            let target = *index_by_bulk_id.get(&reference).ok_or_else(|| {
                ScimError::invalid_value(format!(
                    "the reference 'bulkId:{reference}' does not match any operation's bulkId"
                ))
            })?;
            if target == index {
                return Err(ScimError::invalid_value(format!(
                    "the operation with bulkId '{}' references itself",
                    operation.bulk_id.as_deref().unwrap_or_default()
                )));
            }
            if !dependencies[index].contains(&target) {
                dependencies[index].push(target);
            }
        }
    }

    let mut order = Vec::with_capacity(count);
    let mut done = vec![false; count];
    // Kahn's algorithm by repeated scan; operation counts are bounded by
    // the provider's maxOperations, so the quadratic scan is fine and
    // keeps the submission-order tie-break trivial.
    while order.len() < count {
        let mut progressed = false;
        for index in 0..count {
            if done[index] {
                continue;
            }
            if dependencies[index].iter().all(|&dep| done[dep]) {
                done[index] = true;
                order.push(index);
                progressed = true;
            }
        }
        if !progressed {
            let stuck: Vec<String> = request
                .operations
                .iter()
                .enumerate()
                .filter(|(index, _)| !done[*index])
                .map(|(index, operation)| {
                    operation
                        .bulk_id
                        .clone()
                        .unwrap_or_else(|| format!("#{index}"))
                })
                .collect();
            return Err(ScimError::invalid_value(format!(
                "the bulk operations [{}] reference each other in a circle",
                stuck.join(", ")
            )));
        }
    }
    Ok(order)
}

/// Replace the bulkId references in a payload with the ids and locations
/// of the created resources, guided by the target type's schemas. Returns
/// the bulkIds that could not be resolved yet.
pub fn resolve_references(
    data: &mut Value,
    resource_type: &ResourceType,
    method: HttpMethod,
    resolved: &HashMap<String, ResolvedResource>,
) -> Vec<String> {
    let mut unresolved = Vec::new();
    walk_payload(
        data,
        resource_type,
        method,
        &mut Action::Substitute {
            resolved,
            unresolved: &mut unresolved,
        },
    );
    unresolved.sort();
    unresolved.dedup();
    unresolved
}

/// The bulkId referenced by a path's resource-id segment, if any, e.g.
/// `/Users/bulkId:chuck`.
pub fn path_reference(path: &str) -> Option<String> {
    let segment = path.trim_end_matches('/').rsplit('/').next()?;
    let id = segment.strip_prefix(BULK_ID_PREFIX)?;
    (!id.is_empty()).then(|| id.to_lowercase())
}

/// Substitute a resolved bulkId into the path's resource-id segment. Errs
/// with the referenced bulkId when no resource was created for it yet.
pub fn resolve_path(
    path: &str,
    resolved: &HashMap<String, ResolvedResource>,
) -> Result<String, String> {
    let Some(reference) = path_reference(path) else {
        return Ok(path.to_string());
    };
    match resolved.get(&reference) {
        Some(resource) => {
            let trimmed = path.trim_end_matches('/');
            let cut = trimmed.rfind('/').map(|at| at + 1).unwrap_or(0);
            Ok(format!("{}{}", &trimmed[..cut], resource.id))
        }
        None => Err(reference),
    }
}

/// The endpoint segment of an operation path, e.g. `/Users` for
/// `/Users/2819c223`.
fn endpoint_of(path: &str) -> String {
    let segment = path
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default();
    format!("/{segment}")
}

fn walk_payload(
    data: &mut Value,
    resource_type: &ResourceType,
    method: HttpMethod,
    action: &mut Action<'_>,
) {
    if method == HttpMethod::Patch {
        walk_patch(data, resource_type, action);
    } else {
        walk_resource(data, resource_type, action);
    }
}

/// Visit the reference slots of a resource document: the main schema's
/// attributes at the root, extension attributes under their URI key.
fn walk_resource(data: &mut Value, resource_type: &ResourceType, action: &mut Action<'_>) {
    let Some(root) = data.as_object_mut() else {
        return;
    };
    walk_container(root, &resource_type.main_schema, action);
    for extension in &resource_type.extensions {
        let Some(key) = root
            .keys()
            .find(|key| key.eq_ignore_ascii_case(&extension.schema.id))
            .cloned()
        else {
            continue;
        };
        if let Some(container) = root.get_mut(&key).and_then(Value::as_object_mut) {
            walk_container(container, &extension.schema, action);
        }
    }
}

fn walk_container(container: &mut Map<String, Value>, schema: &Schema, action: &mut Action<'_>) {
    for attribute in schema.attributes() {
        let Some(key) = container
            .keys()
            .find(|key| key.eq_ignore_ascii_case(&attribute.name))
            .cloned()
        else {
            continue;
        };
        let Some(value) = container.get_mut(&key) else {
            continue;
        };
        if attribute.is_resource_reference() {
            walk_entries(value, action);
        } else if is_direct_reference(attribute) {
            match value {
                Value::Array(items) => {
                    for item in items {
                        visit_slot(item, RefKind::Id, action);
                    }
                }
                other => visit_slot(other, RefKind::Id, action),
            }
        }
    }
}

/// A writable reference-typed attribute outside the value/$ref trio, like
/// a custom `userId` pointing at another resource.
fn is_direct_reference(attribute: &SchemaAttribute) -> bool {
    attribute.attribute_type == AttributeType::Reference
        && attribute.mutability != Mutability::ReadOnly
}

/// Visit the `value` and `$ref` slots of one resource-reference entry or
/// an array of them.
fn walk_entries(value: &mut Value, action: &mut Action<'_>) {
    match value {
        Value::Array(items) => {
            for item in items {
                walk_entry(item, action);
            }
        }
        other => walk_entry(other, action),
    }
}

fn walk_entry(entry: &mut Value, action: &mut Action<'_>) {
    let Some(object) = entry.as_object_mut() else {
        return;
    };
    for (key, item) in object.iter_mut() {
        if key.eq_ignore_ascii_case("value") {
            visit_slot(item, RefKind::Id, action);
        } else if key.eq_ignore_ascii_case("$ref") {
            visit_slot(item, RefKind::Location, action);
        }
    }
}

/// Visit the operation values of a patch request payload. A pathless
/// operation carries a partial resource; a path pins the targeted
/// attribute down to a reference candidate or rules it out.
fn walk_patch(data: &mut Value, resource_type: &ResourceType, action: &mut Action<'_>) {
    let Some(root) = data.as_object_mut() else {
        return;
    };
    let Some(operations) = root
        .iter_mut()
        .find(|(key, _)| key.eq_ignore_ascii_case("operations"))
        .and_then(|(_, value)| value.as_array_mut())
    else {
        return;
    };
    for operation in operations {
        let Some(object) = operation.as_object_mut() else {
            continue;
        };
        let path = object
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("path"))
            .and_then(|(_, value)| value.as_str())
            .map(str::to_string);
        let Some(value) = object
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case("value"))
            .map(|(_, value)| value)
        else {
            continue;
        };
        match path.as_deref() {
            None => walk_resource(value, resource_type, action),
            Some(path) => walk_patch_value(path, value, resource_type, action),
        }
    }
}

fn walk_patch_value(
    path: &str,
    value: &mut Value,
    resource_type: &ResourceType,
    action: &mut Action<'_>,
) {
    // strip an explicit schema URI qualifier
    let mut remainder = path;
    for schema in resource_type.all_schemas() {
        let qualifier_len = schema.id.len();
        let qualified = remainder
            .get(..qualifier_len)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(&schema.id))
            && remainder.as_bytes().get(qualifier_len) == Some(&b':');
        if qualified {
            remainder = &remainder[qualifier_len + 1..];
            break;
        }
    }
    let name_end = remainder.find(['[', '.']).unwrap_or(remainder.len());
    let name = &remainder[..name_end];
    let Some(attribute) = resource_type
        .all_schemas()
        .iter()
        .find_map(|schema| schema.attribute_by_name(name))
    else {
        return;
    };
    if is_direct_reference(attribute) {
        visit_slot(value, RefKind::Id, action);
        return;
    }
    if !attribute.is_resource_reference() {
        return;
    }
    let tail = &remainder[name_end..];
    let sub = match tail.find(']') {
        Some(close) => tail[close + 1..].strip_prefix('.'),
        None => tail.strip_prefix('.'),
    };
    match sub {
        // the path already names the sub-attribute, the value is bare
        Some(sub) if sub.eq_ignore_ascii_case("value") => match value {
            Value::Array(items) => {
                for item in items {
                    visit_slot(item, RefKind::Id, action);
                }
            }
            other => visit_slot(other, RefKind::Id, action),
        },
        Some(sub) if sub.eq_ignore_ascii_case("$ref") => visit_slot(value, RefKind::Location, action),
        Some(_) => {}
        None => walk_entries(value, action),
    }
}

fn visit_slot(slot: &mut Value, kind: RefKind, action: &mut Action<'_>) {
    let Some(id) = slot.as_str().and_then(|text| text.strip_prefix(BULK_ID_PREFIX)) else {
        return;
    };
    if id.is_empty() {
        return;
    }
    let id = id.to_lowercase();
    match action {
        Action::Collect(references) => references.push(id),
        Action::Substitute {
            resolved,
            unresolved,
        } => match resolved.get(&id) {
            Some(resource) => {
                *slot = Value::String(match kind {
                    RefKind::Id => resource.id.clone(),
                    RefKind::Location => resource
                        .location
                        .clone()
                        .unwrap_or_else(|| resource.id.clone()),
                });
            }
            None => unresolved.push(id),
        },
    }
}

//! Attribute projection for responses.
//!
//! Applies the `returned` characteristic of every schema attribute together
//! with the request's `attributes`/`excludedAttributes` parameters:
//! `never` attributes are stripped unconditionally, `always` attributes
//! survive every projection, `request` attributes appear only when asked
//! for, and `default` attributes are trimmed by the two parameters backward
//! from their schema definitions.

use crate::document::Document;
use crate::error::{ScimError, ScimResult};
use crate::filter::parse_path;
use crate::resource_type::ResourceType;
use crate::schema::{AttributeType, Returned, Schema, SchemaAttribute};
use serde_json::{Map, Value};

/// A requested or excluded attribute, resolved against the schema set.
#[derive(Debug, Clone, PartialEq)]
struct Selection {
    schema_id: String,
    attribute: String,
    sub_attribute: Option<String>,
}

fn resolve_selections(
    resource_type: &ResourceType,
    names: &[String],
) -> ScimResult<Vec<Selection>> {
    let schemas = resource_type.all_schemas();
    let mut selections = Vec::with_capacity(names.len());
    for name in names {
        let path = parse_path(name, &schemas).map_err(|_| {
            ScimError::invalid_parameters(format!(
                "'{name}' does not resolve to an attribute of resource type '{}'",
                resource_type.name
            ))
        })?;
        selections.push(Selection {
            schema_id: path.schema_id.to_lowercase(),
            attribute: path.attribute_name.to_lowercase(),
            sub_attribute: path.sub_attribute.as_deref().map(str::to_lowercase),
        });
    }
    Ok(selections)
}

/// Project a resource for a response.
pub fn project(
    resource_type: &ResourceType,
    document: Document,
    attributes: &[String],
    excluded_attributes: &[String],
) -> ScimResult<Document> {
    if !attributes.is_empty() && !excluded_attributes.is_empty() {
        return Err(ScimError::invalid_parameters(
            "'attributes' and 'excludedAttributes' must not be used together",
        ));
    }
    let requested = resolve_selections(resource_type, attributes)?;
    let excluded = resolve_selections(resource_type, excluded_attributes)?;

    let mut root = match document.into_value() {
        Value::Object(map) => map,
        other => return Document::from_value(other),
    };
    project_container(
        &resource_type.main_schema,
        &mut root,
        &requested,
        &excluded,
    );
    for extension in &resource_type.extensions {
        let id = &extension.schema.id;
        let Some(key) = root.keys().find(|key| key.eq_ignore_ascii_case(id)).cloned() else {
            continue;
        };
        if let Some(Value::Object(mut container)) = root.remove(&key) {
            project_container(&extension.schema, &mut container, &requested, &excluded);
            if !container.is_empty() {
                root.insert(key, Value::Object(container));
            }
        }
    }
    Document::from_value(Value::Object(root))
}

fn project_container(
    schema: &Schema,
    container: &mut Map<String, Value>,
    requested: &[Selection],
    excluded: &[Selection],
) {
    let schema_id = schema.id.to_lowercase();
    for attribute in schema.attributes() {
        let Some(key) = container
            .keys()
            .find(|key| key.eq_ignore_ascii_case(&attribute.name))
            .cloned()
        else {
            continue;
        };
        match decide(&schema_id, attribute, requested, excluded) {
            Decision::Keep => {
                if let Some(value) = container.get_mut(&key) {
                    narrow_excluded_subs(&schema_id, attribute, value, excluded);
                }
            }
            Decision::Remove => {
                container.remove(&key);
            }
            Decision::Subset(subs) => {
                if let Some(value) = container.get_mut(&key) {
                    narrow_to_subs(attribute, value, &subs);
                }
            }
        }
    }
}

enum Decision {
    Keep,
    Remove,
    /// Keep only the named sub-attributes (plus `always` ones).
    Subset(Vec<String>),
}

fn decide(
    schema_id: &str,
    attribute: &SchemaAttribute,
    requested: &[Selection],
    excluded: &[Selection],
) -> Decision {
    match attribute.returned {
        Returned::Never => return Decision::Remove,
        Returned::Always => return Decision::Keep,
        Returned::Default | Returned::Request => {}
    }
    let name = attribute.name.to_lowercase();
    let matches = |selection: &&Selection| {
        selection.schema_id == schema_id && selection.attribute == name
    };
    if !requested.is_empty() {
        let hits: Vec<&Selection> = requested.iter().filter(matches).collect();
        if hits.is_empty() {
            return Decision::Remove;
        }
        if hits.iter().any(|hit| hit.sub_attribute.is_none()) {
            return Decision::Keep;
        }
        return Decision::Subset(
            hits.iter()
                .filter_map(|hit| hit.sub_attribute.clone())
                .collect(),
        );
    }
    if attribute.returned == Returned::Request {
        return Decision::Remove;
    }
    if excluded
        .iter()
        .any(|selection| matches(&selection) && selection.sub_attribute.is_none())
    {
        return Decision::Remove;
    }
    Decision::Keep
}

/// Strip excluded sub-attributes from a kept complex value.
fn narrow_excluded_subs(
    schema_id: &str,
    attribute: &SchemaAttribute,
    value: &mut Value,
    excluded: &[Selection],
) {
    if attribute.attribute_type != AttributeType::Complex {
        return;
    }
    let name = attribute.name.to_lowercase();
    let dropped: Vec<&str> = excluded
        .iter()
        .filter(|selection| selection.schema_id == schema_id && selection.attribute == name)
        .filter_map(|selection| selection.sub_attribute.as_deref())
        .collect();
    if dropped.is_empty() {
        return;
    }
    for_each_entry(value, |entry| {
        entry.retain(|key, _| {
            let lower = key.to_lowercase();
            let sub_always = attribute
                .sub_attribute(key)
                .is_some_and(|sub| sub.returned == Returned::Always);
            sub_always || !dropped.contains(&lower.as_str())
        });
    });
}

/// Reduce a complex value to the requested sub-attributes plus any
/// sub-attribute that is always returned.
fn narrow_to_subs(attribute: &SchemaAttribute, value: &mut Value, subs: &[String]) {
    for_each_entry(value, |entry| {
        entry.retain(|key, _| {
            let lower = key.to_lowercase();
            let sub_always = attribute
                .sub_attribute(key)
                .is_some_and(|sub| sub.returned == Returned::Always);
            sub_always || subs.contains(&lower)
        });
    });
}

fn for_each_entry(value: &mut Value, mut apply: impl FnMut(&mut Map<String, Value>)) {
    match value {
        Value::Object(entry) => apply(entry),
        Value::Array(entries) => {
            for entry in entries {
                if let Value::Object(entry) = entry {
                    apply(entry);
                }
            }
        }
        _ => {}
    }
}

//! Application of patch operations to a resource document.
//!
//! Paths are parsed with the filter-language path parser, so bracket
//! notation (`emails[type eq "work"].value`) and URI-qualified extension
//! attributes resolve against the resource type's full schema set. All
//! mutation happens on the raw JSON object; the result is rebuilt into a
//! [`Document`] and compared canonically to decide whether anything
//! actually changed.

use crate::document::Document;
use crate::error::{ScimError, ScimResult};
use crate::filter::{AttributePath, FilterNode, evaluate_on_entry, parse_path};
use crate::patch::{PatchOp, PatchRequest};
use crate::resource_type::ResourceType;
use crate::schema::{AttributeType, Mutability, SchemaAttribute};
use serde_json::{Map, Value};

/// The patched document plus whether it differs from the input.
#[derive(Debug)]
pub struct PatchOutcome {
    pub document: Document,
    pub changed: bool,
}

pub struct PatchHandler<'a> {
    resource_type: &'a ResourceType,
}

/// How to treat a readOnly attribute encountered during a merge: payloads
/// without a path silently drop them, an explicit path is a client error.
#[derive(Clone, Copy, PartialEq)]
enum ReadOnlyPolicy {
    Skip,
    Reject,
}

impl<'a> PatchHandler<'a> {
    pub fn new(resource_type: &'a ResourceType) -> Self {
        Self { resource_type }
    }

    pub fn apply(&self, document: Document, request: &PatchRequest) -> ScimResult<PatchOutcome> {
        request.validate()?;
        let before = document.to_canonical_json();
        let mut root = match document.into_value() {
            Value::Object(map) => map,
            _ => return Err(ScimError::invalid_syntax("a resource must be a JSON object")),
        };
        for operation in &request.operations {
            let op = operation.operation()?;
            match op {
                PatchOp::Remove => {
                    // validate() guarantees the path is present
                    let path = operation.path.as_deref().unwrap_or_default();
                    self.remove(&mut root, path)?;
                }
                PatchOp::Add | PatchOp::Replace => {
                    let value = operation
                        .value
                        .clone()
                        .ok_or_else(|| ScimError::invalid_value("missing operation value"))?;
                    match operation.path.as_deref() {
                        None => self.merge_resource(&mut root, value, op)?,
                        Some(path) if self.extension_id(path).is_some() => {
                            let id = self.extension_id(path).unwrap().to_string();
                            self.merge_extension(&mut root, &id, value, op)?;
                        }
                        Some(path) => {
                            let path = parse_path(path, &self.resource_type.all_schemas())?;
                            self.apply_to_path(&mut root, &path, value, op)?;
                        }
                    }
                }
            }
        }
        self.normalize_schemas(&mut root);
        let document = Document::from_value(Value::Object(root))?;
        let changed = document.to_canonical_json() != before;
        Ok(PatchOutcome { document, changed })
    }

    fn extension_id(&self, uri: &str) -> Option<&str> {
        self.resource_type
            .extensions
            .iter()
            .map(|extension| extension.schema.id.as_str())
            .find(|id| id.eq_ignore_ascii_case(uri))
    }

    /// Pathless add/replace: the value is a partial resource merged
    /// attribute by attribute.
    fn merge_resource(&self, root: &mut Map<String, Value>, value: Value, op: PatchOp) -> ScimResult<()> {
        let Value::Object(entries) = value else {
            return Err(ScimError::invalid_value(
                "a patch operation without a path requires an object value",
            ));
        };
        for (name, attribute_value) in entries {
            if name.eq_ignore_ascii_case("schemas") {
                continue;
            }
            if let Some(id) = self.extension_id(&name) {
                let id = id.to_string();
                self.merge_extension(root, &id, attribute_value, op)?;
                continue;
            }
            let attribute = self
                .resource_type
                .main_schema
                .attribute_by_name(&name)
                .ok_or_else(|| {
                    ScimError::invalid_path(format!("the attribute '{name}' is unknown"))
                })?
                .clone();
            self.merge_attribute(root, &attribute, attribute_value, op, ReadOnlyPolicy::Skip)?;
        }
        Ok(())
    }

    /// Merge a value into the container object of an extension schema.
    fn merge_extension(
        &self,
        root: &mut Map<String, Value>,
        schema_id: &str,
        value: Value,
        op: PatchOp,
    ) -> ScimResult<()> {
        let Value::Object(entries) = value else {
            return Err(ScimError::invalid_value(format!(
                "the value for extension '{schema_id}' must be an object"
            )));
        };
        let schema = self
            .resource_type
            .schema_by_id(schema_id)
            .ok_or_else(|| ScimError::invalid_path(format!("unknown schema '{schema_id}'")))?
            .clone();
        let mut container = match remove_entry(root, schema_id) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        if op == PatchOp::Replace {
            container.clear();
        }
        for (name, attribute_value) in entries {
            let attribute = schema
                .attribute_by_name(&name)
                .ok_or_else(|| {
                    ScimError::invalid_path(format!(
                        "the attribute '{name}' is unknown in schema '{schema_id}'"
                    ))
                })?
                .clone();
            self.merge_attribute(&mut container, &attribute, attribute_value, op, ReadOnlyPolicy::Skip)?;
        }
        root.insert(schema_id.to_string(), Value::Object(container));
        Ok(())
    }

    fn merge_attribute(
        &self,
        map: &mut Map<String, Value>,
        attribute: &SchemaAttribute,
        value: Value,
        op: PatchOp,
        read_only: ReadOnlyPolicy,
    ) -> ScimResult<()> {
        if attribute.mutability == Mutability::ReadOnly {
            return match read_only {
                ReadOnlyPolicy::Skip => Ok(()),
                ReadOnlyPolicy::Reject => Err(ScimError::mutability(format!(
                    "the attribute '{}' is readOnly",
                    attribute.name
                ))),
            };
        }
        if value.is_null() {
            return Ok(());
        }
        if attribute.mutability == Mutability::Immutable {
            if let Some(existing) = get_entry(map, &attribute.name) {
                if *existing != value {
                    return Err(ScimError::mutability(format!(
                        "the attribute '{}' is immutable and already has a value",
                        attribute.name
                    )));
                }
            }
        }

        if attribute.multi_valued {
            let incoming = match value {
                Value::Array(items) => items,
                single => vec![single],
            };
            for item in &incoming {
                validate_value(attribute, item)?;
            }
            let mut entries = match (op, remove_entry(map, &attribute.name)) {
                (PatchOp::Add, Some(Value::Array(existing))) => existing,
                _ => Vec::new(),
            };
            if incoming.iter().any(is_primary) {
                clear_primary(&mut entries);
            }
            entries.extend(incoming);
            map.insert(attribute.name.clone(), Value::Array(entries));
            return Ok(());
        }

        if attribute.attribute_type == AttributeType::Complex {
            let Value::Object(sub_entries) = value else {
                return Err(ScimError::invalid_value(format!(
                    "the complex attribute '{}' requires an object value",
                    attribute.name
                )));
            };
            let mut current = match remove_entry(map, &attribute.name) {
                Some(Value::Object(existing)) if op == PatchOp::Add => existing,
                _ => Map::new(),
            };
            for (sub_name, sub_value) in sub_entries {
                let sub = attribute.sub_attribute(&sub_name).ok_or_else(|| {
                    ScimError::invalid_path(format!(
                        "the attribute '{}' has no sub-attribute '{sub_name}'",
                        attribute.name
                    ))
                })?;
                if sub.mutability == Mutability::ReadOnly && read_only == ReadOnlyPolicy::Skip {
                    continue;
                }
                validate_value(sub, &sub_value)?;
                remove_entry(&mut current, &sub.name);
                current.insert(sub.name.clone(), sub_value);
            }
            if !current.is_empty() {
                map.insert(attribute.name.clone(), Value::Object(current));
            }
            return Ok(());
        }

        validate_value(attribute, &value)?;
        remove_entry(map, &attribute.name);
        map.insert(attribute.name.clone(), value);
        Ok(())
    }

    /// Add/replace against a parsed path, including bracket value filters.
    fn apply_to_path(
        &self,
        root: &mut Map<String, Value>,
        path: &AttributePath,
        value: Value,
        op: PatchOp,
    ) -> ScimResult<()> {
        self.check_path_mutability(path)?;
        let attribute = &path.attribute;
        let main = self.resource_type.main_schema.id.clone();
        let map = self.container_mut(root, &path.schema_id, &main);

        match (&path.value_filter, &path.sub_attribute) {
            (None, None) => {
                self.merge_attribute(map, attribute, value, op, ReadOnlyPolicy::Reject)?
            }
            (None, Some(sub_name)) => {
                let sub = sub_attribute(attribute, sub_name)?;
                validate_value(&sub, &value)?;
                if attribute.multi_valued {
                    let mut entries = match remove_entry(map, &attribute.name) {
                        Some(Value::Array(entries)) => entries,
                        _ => Vec::new(),
                    };
                    if entries.is_empty() {
                        if op == PatchOp::Replace {
                            return Err(ScimError::no_target(format!(
                                "the path '{path}' did not match any value",
                            )));
                        }
                        let mut entry = Map::new();
                        entry.insert(sub.name.clone(), value);
                        entries.push(Value::Object(entry));
                    } else {
                        for entry in entries.iter_mut() {
                            set_sub_value(entry, &sub, value.clone())?;
                        }
                    }
                    map.insert(attribute.name.clone(), Value::Array(entries));
                } else {
                    let current = match remove_entry(map, &attribute.name) {
                        Some(Value::Object(existing)) => existing,
                        _ => Map::new(),
                    };
                    let mut entry = Value::Object(current);
                    set_sub_value(&mut entry, &sub, value)?;
                    map.insert(attribute.name.clone(), entry);
                }
            }
            (Some(filter), sub_name) => {
                self.apply_filtered(map, path, filter, sub_name.as_deref(), value, op)?
            }
        }
        Ok(())
    }

    fn apply_filtered(
        &self,
        map: &mut Map<String, Value>,
        path: &AttributePath,
        filter: &FilterNode,
        sub_name: Option<&str>,
        value: Value,
        op: PatchOp,
    ) -> ScimResult<()> {
        let attribute = &path.attribute;
        let mut entries = match remove_entry(map, &attribute.name) {
            Some(Value::Array(entries)) => entries,
            _ => Vec::new(),
        };
        let mut matched = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            if evaluate_on_entry(filter, entry)? {
                matched.push(index);
            }
        }
        if matched.is_empty() {
            if !entries.is_empty() {
                map.insert(attribute.name.clone(), Value::Array(entries));
            }
            return Err(ScimError::no_target(format!(
                "the path '{path}' did not match any value",
            )));
        }
        match sub_name {
            Some(sub_name) => {
                let sub = sub_attribute(attribute, sub_name)?;
                validate_value(&sub, &value)?;
                if is_primary_flag(&sub, &value) {
                    clear_primary(&mut entries);
                }
                for index in matched {
                    set_sub_value(&mut entries[index], &sub, value.clone())?;
                }
            }
            None => {
                let Value::Object(patch_entries) = value else {
                    return Err(ScimError::invalid_value(format!(
                        "the value for path '{path}' must be an object",
                    )));
                };
                if patch_entries.iter().any(|(k, v)| {
                    k.eq_ignore_ascii_case("primary") && *v == Value::Bool(true)
                }) {
                    clear_primary(&mut entries);
                }
                for index in matched {
                    let entry = &mut entries[index];
                    match op {
                        PatchOp::Replace => *entry = Value::Object(patch_entries.clone()),
                        PatchOp::Add => {
                            let Value::Object(target) = entry else {
                                return Err(ScimError::invalid_value(format!(
                                    "the entries of '{}' must be objects",
                                    attribute.name
                                )));
                            };
                            for (sub_name, sub_value) in patch_entries.clone() {
                                let sub = sub_attribute(attribute, &sub_name)?;
                                validate_value(&sub, &sub_value)?;
                                remove_entry(target, &sub.name);
                                target.insert(sub.name.clone(), sub_value);
                            }
                        }
                        PatchOp::Remove => unreachable!("remove goes through Self::remove"),
                    }
                }
            }
        }
        map.insert(attribute.name.clone(), Value::Array(entries));
        Ok(())
    }

    fn remove(&self, root: &mut Map<String, Value>, raw_path: &str) -> ScimResult<()> {
        if let Some(id) = self.extension_id(raw_path) {
            let id = id.to_string();
            let required = self
                .resource_type
                .extensions
                .iter()
                .any(|e| e.required && e.schema.id.eq_ignore_ascii_case(&id));
            if required {
                return Err(ScimError::mutability(format!(
                    "the extension '{id}' is required and cannot be removed"
                )));
            }
            remove_entry(root, &id);
            return Ok(());
        }
        let path = parse_path(raw_path, &self.resource_type.all_schemas())?;
        let target = path.target();
        if path.attribute.mutability == Mutability::ReadOnly
            || target.mutability == Mutability::ReadOnly
        {
            return Err(ScimError::mutability(format!(
                "the attribute '{}' is readOnly",
                target.name
            )));
        }
        if path.value_filter.is_none() && path.sub_attribute.is_none() && path.attribute.required {
            return Err(ScimError::mutability(format!(
                "the required attribute '{}' cannot be removed",
                path.attribute.name
            )));
        }
        let main = self.resource_type.main_schema.id.clone();
        let map = self.container_mut(root, &path.schema_id, &main);
        let attribute = &path.attribute;

        match (&path.value_filter, &path.sub_attribute) {
            (None, None) => {
                remove_entry(map, &attribute.name);
            }
            (None, Some(sub_name)) => {
                let sub = sub_attribute(attribute, sub_name)?;
                match remove_entry(map, &attribute.name) {
                    Some(Value::Array(mut entries)) => {
                        for entry in entries.iter_mut() {
                            if let Value::Object(object) = entry {
                                remove_entry(object, &sub.name);
                            }
                        }
                        entries.retain(|entry| !is_empty_object(entry));
                        if !entries.is_empty() {
                            map.insert(attribute.name.clone(), Value::Array(entries));
                        }
                    }
                    Some(Value::Object(mut object)) => {
                        remove_entry(&mut object, &sub.name);
                        if !object.is_empty() {
                            map.insert(attribute.name.clone(), Value::Object(object));
                        }
                    }
                    Some(other) => {
                        map.insert(attribute.name.clone(), other);
                    }
                    None => {}
                }
            }
            (Some(filter), sub_name) => {
                let Some(Value::Array(mut entries)) = remove_entry(map, &attribute.name) else {
                    return Ok(());
                };
                match sub_name {
                    // unmatched filters are a no-op: removing what is not
                    // there leaves the resource as it is
                    None => {
                        let mut retained = Vec::with_capacity(entries.len());
                        for entry in entries {
                            if !evaluate_on_entry(filter, &entry)? {
                                retained.push(entry);
                            }
                        }
                        entries = retained;
                    }
                    Some(sub_name) => {
                        let sub = sub_attribute(attribute, sub_name)?;
                        for entry in entries.iter_mut() {
                            if evaluate_on_entry(filter, entry)? {
                                if let Value::Object(object) = entry {
                                    remove_entry(object, &sub.name);
                                }
                            }
                        }
                        entries.retain(|entry| !is_empty_object(entry));
                    }
                }
                if !entries.is_empty() {
                    map.insert(attribute.name.clone(), Value::Array(entries));
                }
            }
        }
        Ok(())
    }

    fn check_path_mutability(&self, path: &AttributePath) -> ScimResult<()> {
        let target = path.target();
        if path.attribute.mutability == Mutability::ReadOnly
            || target.mutability == Mutability::ReadOnly
        {
            return Err(ScimError::mutability(format!(
                "the attribute '{}' is readOnly",
                target.name
            )));
        }
        Ok(())
    }

    /// The object a path's attribute lives in: the resource itself for the
    /// main schema, the extension container otherwise.
    fn container_mut<'m>(
        &self,
        root: &'m mut Map<String, Value>,
        schema_id: &str,
        main_schema_id: &str,
    ) -> &'m mut Map<String, Value> {
        if schema_id.eq_ignore_ascii_case(main_schema_id) {
            return root;
        }
        let key = root
            .keys()
            .find(|key| key.eq_ignore_ascii_case(schema_id))
            .cloned()
            .unwrap_or_else(|| schema_id.to_string());
        let entry = root
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        entry.as_object_mut().unwrap()
    }

    /// Keep the `schemas` attribute consistent with the extension
    /// containers that are actually present. Empty containers are dropped.
    fn normalize_schemas(&self, root: &mut Map<String, Value>) {
        let mut desired = vec![self.resource_type.main_schema.id.clone()];
        for extension in &self.resource_type.extensions {
            let id = &extension.schema.id;
            let present = match get_entry(root, id) {
                Some(Value::Object(object)) => !object.is_empty(),
                _ => false,
            };
            if present {
                desired.push(id.clone());
            } else if get_entry(root, id).is_some() {
                remove_entry(root, id);
            }
        }
        let current: Vec<String> = match get_entry(root, "schemas") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_lowercase))
                .collect(),
            _ => Vec::new(),
        };
        let mut expected: Vec<String> = desired.iter().map(|id| id.to_lowercase()).collect();
        let mut sorted_current = current.clone();
        expected.sort();
        sorted_current.sort();
        if expected != sorted_current {
            remove_entry(root, "schemas");
            root.insert(
                "schemas".to_string(),
                Value::Array(desired.into_iter().map(Value::String).collect()),
            );
        }
    }
}

fn sub_attribute(attribute: &SchemaAttribute, name: &str) -> ScimResult<SchemaAttribute> {
    attribute
        .sub_attribute(name)
        .cloned()
        .ok_or_else(|| {
            ScimError::invalid_path(format!(
                "the attribute '{}' has no sub-attribute '{name}'",
                attribute.name
            ))
        })
}

fn set_sub_value(entry: &mut Value, sub: &SchemaAttribute, value: Value) -> ScimResult<()> {
    let Value::Object(object) = entry else {
        return Err(ScimError::invalid_value(
            "multi-valued complex entries must be objects",
        ));
    };
    if sub.mutability == Mutability::Immutable {
        if let Some(existing) = get_entry(object, &sub.name) {
            if *existing != value {
                return Err(ScimError::mutability(format!(
                    "the sub-attribute '{}' is immutable and already has a value",
                    sub.name
                )));
            }
        }
    }
    remove_entry(object, &sub.name);
    object.insert(sub.name.clone(), value);
    Ok(())
}

fn get_entry<'m>(map: &'m Map<String, Value>, name: &str) -> Option<&'m Value> {
    map.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

fn remove_entry(map: &mut Map<String, Value>, name: &str) -> Option<Value> {
    let key = map.keys().find(|key| key.eq_ignore_ascii_case(name)).cloned()?;
    map.remove(&key)
}

fn is_primary(entry: &Value) -> bool {
    entry
        .as_object()
        .and_then(|object| get_entry(object, "primary"))
        .is_some_and(|value| *value == Value::Bool(true))
}

fn is_primary_flag(sub: &SchemaAttribute, value: &Value) -> bool {
    sub.name.eq_ignore_ascii_case("primary") && *value == Value::Bool(true)
}

/// Only one entry of a multi-valued attribute may be primary; setting a new
/// primary demotes the previous one.
fn clear_primary(entries: &mut [Value]) {
    for entry in entries {
        if let Value::Object(object) = entry {
            if let Some(primary) = object
                .keys()
                .find(|key| key.eq_ignore_ascii_case("primary"))
                .cloned()
            {
                object.insert(primary, Value::Bool(false));
            }
        }
    }
}

fn is_empty_object(value: &Value) -> bool {
    value.as_object().is_some_and(Map::is_empty)
}

/// Check an assigned value against the attribute's declared type and
/// canonical values.
fn validate_value(attribute: &SchemaAttribute, value: &Value) -> ScimResult<()> {
    if value.is_null() {
        return Ok(());
    }
    let mismatch = || {
        ScimError::invalid_value(format!(
            "the value {value} does not match the type of attribute '{}'",
            attribute.name
        ))
    };
    match attribute.attribute_type {
        AttributeType::String | AttributeType::Reference | AttributeType::Binary => {
            let text = value.as_str().ok_or_else(mismatch)?;
            if !attribute.canonical_values.is_empty()
                && !attribute
                    .canonical_values
                    .iter()
                    .any(|canonical| canonical.eq_ignore_ascii_case(text))
            {
                return Err(ScimError::invalid_value(format!(
                    "'{text}' is not a canonical value of attribute '{}', expected one of: {}",
                    attribute.name,
                    attribute.canonical_values.join(", ")
                )));
            }
        }
        AttributeType::Boolean => {
            value.as_bool().ok_or_else(mismatch)?;
        }
        AttributeType::Integer => {
            value.as_i64().ok_or_else(mismatch)?;
        }
        AttributeType::Decimal => {
            value.as_f64().ok_or_else(mismatch)?;
        }
        AttributeType::DateTime => {
            let text = value.as_str().ok_or_else(mismatch)?;
            chrono::DateTime::parse_from_rfc3339(text).map_err(|_| {
                ScimError::invalid_value(format!(
                    "'{text}' is not a valid dateTime for attribute '{}'",
                    attribute.name
                ))
            })?;
        }
        AttributeType::Complex => {
            let object = value.as_object().ok_or_else(mismatch)?;
            for (sub_name, sub_value) in object {
                let sub = attribute.sub_attribute(sub_name).ok_or_else(|| {
                    ScimError::invalid_path(format!(
                        "the attribute '{}' has no sub-attribute '{sub_name}'",
                        attribute.name
                    ))
                })?;
                validate_value(sub, sub_value)?;
            }
        }
    }
    Ok(())
}

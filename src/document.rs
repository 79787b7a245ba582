//! Order-preserving resource document model.
//!
//! Every SCIM resource (User, Group, ServiceProviderConfig, custom types) is
//! a [`Document`]: an attribute container backed by an insertion-ordered map
//! of attribute name to JSON value. Typed accessors are thin conversions over
//! the stored value that keep the distinction between "attribute absent"
//! (`Ok(None)`) and "attribute has the wrong type" (`Err`).
//!
//! Shared multi-valued complex behaviour (value/type/display/primary/$ref)
//! lives in [`MultiValuedEntry`], an embedded facade rather than a base type.

use crate::error::{ScimError, ScimResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Attribute names with protocol-level meaning on every resource.
pub mod attributes {
    pub const SCHEMAS: &str = "schemas";
    pub const ID: &str = "id";
    pub const EXTERNAL_ID: &str = "externalId";
    pub const META: &str = "meta";
}

/// The `meta` complex attribute common to all resources (RFC 7643 §3.1).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A generic, order-preserving SCIM resource document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    attributes: Map<String, Value>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            attributes: Map::new(),
        }
    }

    /// Build a document from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> ScimResult<Self> {
        match value {
            Value::Object(attributes) => Ok(Self { attributes }),
            other => Err(ScimError::invalid_syntax(format!(
                "a resource document must be a JSON object but was: {}",
                value_type_name(&other)
            ))),
        }
    }

    /// Parse a document from its JSON string representation.
    pub fn from_json(json: &str) -> ScimResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Consume the document into its JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.attributes)
    }

    /// A JSON view of the document without consuming it.
    pub fn to_value(&self) -> Value {
        Value::Object(self.attributes.clone())
    }

    /// Canonical serialization used for version hashing and change
    /// detection: object keys are sorted recursively, so two documents with
    /// the same attributes serialize byte-identically no matter in which
    /// order the attributes were inserted.
    pub fn to_canonical_json(&self) -> String {
        canonical_value(&Value::Object(self.attributes.clone())).to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Raw access to an attribute value by exact name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Case-insensitive attribute lookup, per RFC 7643 attribute-name rules.
    pub fn get_ignore_case(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).or_else(|| {
            self.attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
    }

    /// The stored key matching `name` case-insensitively, if any.
    pub fn key_ignore_case(&self, name: &str) -> Option<String> {
        self.attributes
            .keys()
            .find(|key| key.eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.attributes.get_mut(name)
    }

    /// Set an attribute, replacing any existing value under the same name
    /// regardless of case.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(existing) = self.key_ignore_case(&name) {
            self.attributes.remove(&existing);
        }
        self.attributes.insert(name, value);
    }

    /// Remove an attribute by name (case-insensitive). Returns the removed
    /// value if one was present.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let key = self.key_ignore_case(name)?;
        self.attributes.remove(&key)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.attributes.iter()
    }

    /// Typed accessor for string attributes. `Ok(None)` means absent,
    /// `Err` means present with a non-string value.
    pub fn get_str(&self, name: &str) -> ScimResult<Option<&str>> {
        match self.get_ignore_case(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(wrong_type(name, "string", other)),
        }
    }

    pub fn get_bool(&self, name: &str) -> ScimResult<Option<bool>> {
        match self.get_ignore_case(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(wrong_type(name, "boolean", other)),
        }
    }

    pub fn get_int(&self, name: &str) -> ScimResult<Option<i64>> {
        match self.get_ignore_case(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| wrong_type(name, "integer", &Value::Number(n.clone()))),
            Some(other) => Err(wrong_type(name, "integer", other)),
        }
    }

    pub fn get_decimal(&self, name: &str) -> ScimResult<Option<f64>> {
        match self.get_ignore_case(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(other) => Err(wrong_type(name, "decimal", other)),
        }
    }

    pub fn get_datetime(&self, name: &str) -> ScimResult<Option<DateTime<Utc>>> {
        match self.get_str(name)? {
            None => Ok(None),
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|_| {
                    ScimError::invalid_value(format!(
                        "attribute '{name}' holds '{raw}' which is not a valid dateTime"
                    ))
                }),
        }
    }

    pub fn get_array(&self, name: &str) -> ScimResult<Option<&Vec<Value>>> {
        match self.get_ignore_case(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(other) => Err(wrong_type(name, "array", other)),
        }
    }

    pub fn get_object(&self, name: &str) -> ScimResult<Option<&Map<String, Value>>> {
        match self.get_ignore_case(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(obj)) => Ok(Some(obj)),
            Some(other) => Err(wrong_type(name, "complex", other)),
        }
    }

    // Common resource surface.

    pub fn id(&self) -> ScimResult<Option<&str>> {
        self.get_str(attributes::ID)
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.set(attributes::ID, Value::String(id.into()));
    }

    pub fn external_id(&self) -> ScimResult<Option<&str>> {
        self.get_str(attributes::EXTERNAL_ID)
    }

    pub fn schemas(&self) -> ScimResult<Vec<String>> {
        match self.get_array(attributes::SCHEMAS)? {
            None => Ok(Vec::new()),
            Some(items) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ScimError::invalid_value(
                            "'schemas' entries must be strings".to_string(),
                        )
                    })
                })
                .collect(),
        }
    }

    pub fn set_schemas(&mut self, schemas: impl IntoIterator<Item = impl Into<String>>) {
        let uris: Vec<Value> = schemas
            .into_iter()
            .map(|uri| Value::String(uri.into()))
            .collect();
        self.set(attributes::SCHEMAS, Value::Array(uris));
    }

    pub fn meta(&self) -> ScimResult<Option<Meta>> {
        match self.get_ignore_case(attributes::META) {
            None | Some(Value::Null) => Ok(None),
            Some(value @ Value::Object(_)) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|_| ScimError::invalid_value("the 'meta' attribute is malformed")),
            Some(other) => Err(wrong_type(attributes::META, "complex", other)),
        }
    }

    pub fn set_meta(&mut self, meta: &Meta) {
        // serde_json cannot fail on Meta, it is a plain struct of scalars.
        let value = serde_json::to_value(meta).unwrap_or_else(|_| json!({}));
        self.set(attributes::META, value);
    }

    /// The `meta.version` string, if one is present.
    pub fn version(&self) -> ScimResult<Option<String>> {
        Ok(self.meta()?.and_then(|meta| meta.version))
    }
}

impl From<Map<String, Value>> for Document {
    fn from(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }
}

/// Facade over one entry of a multi-valued complex attribute
/// (emails, phoneNumbers, group members, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiValuedEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl MultiValuedEntry {
    pub fn from_value(value: &Value) -> ScimResult<Self> {
        serde_json::from_value(value.clone()).map_err(|_| {
            ScimError::invalid_value("multi-valued complex entry is malformed".to_string())
        })
    }
}

fn wrong_type(name: &str, expected: &str, actual: &Value) -> ScimError {
    ScimError::invalid_value(format!(
        "attribute '{name}' was expected to be of type '{expected}' but was '{}'",
        value_type_name(actual)
    ))
}

fn canonical_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonical_value(&map[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical_value).collect()),
        other => other.clone(),
    }
}

/// The SCIM-facing name of a JSON value's type, used in error messages.
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "decimal",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "complex",
    }
}

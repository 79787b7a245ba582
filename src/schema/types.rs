//! Core schema type definitions for SCIM resources.
//!
//! The fundamental data structures describing SCIM schemas and attribute
//! characteristics as specified in RFC 7643: type, cardinality, mutability,
//! uniqueness, canonical values and sub-attributes.

use crate::error::{ScimError, ScimResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// SCIM attribute data types (RFC 7643 §2.3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum AttributeType {
    #[default]
    String,
    Boolean,
    Decimal,
    Integer,
    DateTime,
    Binary,
    Reference,
    Complex,
}

impl AttributeType {
    /// Whether values of this type have a defined ordering, which the
    /// filter comparators `gt`/`ge`/`lt`/`le` require.
    pub fn is_ordered(&self) -> bool {
        matches!(
            self,
            AttributeType::String
                | AttributeType::Decimal
                | AttributeType::Integer
                | AttributeType::DateTime
        )
    }
}

/// Attribute mutability characteristics (RFC 7643 §2.2).
///
/// Omitted in a schema document, this defaults to `readWrite` per the
/// "default when omitted" rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Mutability {
    ReadOnly,
    #[default]
    ReadWrite,
    Immutable,
    WriteOnly,
}

/// When an attribute is returned in responses (RFC 7643 §2.2).
///
/// Defaults to `default` when omitted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Returned {
    Always,
    Never,
    #[default]
    Default,
    Request,
}

/// Attribute uniqueness constraints (RFC 7643 §2.2).
///
/// Defaults to `none` when omitted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Uniqueness {
    #[default]
    None,
    Server,
    Global,
}

/// Definition of one SCIM resource attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaAttribute {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub attribute_type: AttributeType,
    #[serde(default)]
    pub multi_valued: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub case_exact: bool,
    #[serde(default)]
    pub mutability: Mutability,
    #[serde(default)]
    pub returned: Returned,
    #[serde(default)]
    pub uniqueness: Uniqueness,
    /// Closed set of allowed string values; empty means unrestricted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub canonical_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_types: Vec<String>,
    /// Ordered sub-attributes; only meaningful for complex types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_attributes: Vec<SchemaAttribute>,
}

impl Default for SchemaAttribute {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            attribute_type: AttributeType::String,
            multi_valued: false,
            required: false,
            case_exact: false,
            mutability: Mutability::ReadWrite,
            returned: Returned::Default,
            uniqueness: Uniqueness::None,
            canonical_values: Vec::new(),
            reference_types: Vec::new(),
            sub_attributes: Vec::new(),
        }
    }
}

impl SchemaAttribute {
    /// Case-insensitive sub-attribute lookup within a complex attribute.
    pub fn sub_attribute(&self, name: &str) -> Option<&SchemaAttribute> {
        self.sub_attributes
            .iter()
            .find(|sub| sub.name.eq_ignore_ascii_case(name))
    }

    /// Whether this attribute is a complex attribute exposing the
    /// `value`/`type`/`$ref` trio that makes it a bulkId candidate
    /// (group members, enterprise manager, ...).
    pub fn is_resource_reference(&self) -> bool {
        self.attribute_type == AttributeType::Complex
            && self.mutability != Mutability::ReadOnly
            && self.sub_attribute("value").is_some()
            && self.sub_attribute("$ref").is_some()
    }

    /// Fully qualified name of this attribute within the given schema,
    /// e.g. `urn:ietf:params:scim:schemas:core:2.0:User:userName`.
    pub fn fully_qualified_name(&self, schema_id: &str) -> String {
        format!("{schema_id}:{}", self.name)
    }
}

/// A SCIM schema: id (URI), name, description and an ordered list of
/// attribute definitions, with a case-insensitive lookup index built once
/// at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub id: String,
    pub name: String,
    pub description: String,
    attributes: Vec<SchemaAttribute>,
    /// Lower-cased short name -> index into `attributes`.
    index: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema from its parts, enforcing the registration invariants:
    /// a non-empty id, at least one attribute, and no two attributes sharing
    /// a name case-insensitively.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        attributes: Vec<SchemaAttribute>,
    ) -> ScimResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ScimError::invalid_value(
                "schema validation failed: the 'id' attribute is missing",
            ));
        }
        if attributes.is_empty() {
            return Err(ScimError::invalid_value(format!(
                "schema validation failed: schema '{id}' does not define any attributes"
            )));
        }
        let mut index = HashMap::with_capacity(attributes.len());
        for (position, attribute) in attributes.iter().enumerate() {
            let key = attribute.name.to_lowercase();
            if index.insert(key, position).is_some() {
                return Err(ScimError::invalid_value(format!(
                    "schema validation failed: duplicate attribute '{}' in schema '{id}'",
                    attribute.name
                )));
            }
        }
        Ok(Self {
            id,
            name: name.into(),
            description: description.into(),
            attributes,
            index,
        })
    }

    /// Parse a schema document (RFC 7643 §7 representation).
    pub fn from_value(document: Value) -> ScimResult<Self> {
        #[derive(Deserialize)]
        struct SchemaDocument {
            #[serde(default)]
            id: String,
            #[serde(default)]
            name: String,
            #[serde(default)]
            description: String,
            #[serde(default)]
            attributes: Vec<SchemaAttribute>,
        }
        let parsed: SchemaDocument = serde_json::from_value(document).map_err(|error| {
            ScimError::invalid_syntax(format!("schema document could not be parsed: {error}"))
        })?;
        Self::new(parsed.id, parsed.name, parsed.description, parsed.attributes)
    }

    /// Parse a schema from its JSON string representation.
    pub fn from_json(json: &str) -> ScimResult<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// The ordered attribute definitions of this schema.
    pub fn attributes(&self) -> &[SchemaAttribute] {
        &self.attributes
    }

    /// Case-insensitive attribute lookup by short name. O(1) via the index.
    pub fn attribute_by_name(&self, name: &str) -> Option<&SchemaAttribute> {
        self.index
            .get(&name.to_lowercase())
            .map(|&position| &self.attributes[position])
    }

    /// Resolve a possibly dotted path (`name.givenName`) to the targeted
    /// attribute and, when present, its complex parent.
    pub fn attribute_by_path(
        &self,
        path: &str,
    ) -> Option<(&SchemaAttribute, Option<&SchemaAttribute>)> {
        match path.split_once('.') {
            None => self.attribute_by_name(path).map(|attr| (attr, None)),
            Some((parent_name, sub_name)) => {
                let parent = self.attribute_by_name(parent_name)?;
                let sub = parent.sub_attribute(sub_name)?;
                Some((sub, Some(parent)))
            }
        }
    }

    /// Serialize back into the RFC 7643 schema representation.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:Schema"],
            "id": self.id,
            "name": self.name,
            "description": self.description,
            "attributes": self.attributes,
        })
    }
}

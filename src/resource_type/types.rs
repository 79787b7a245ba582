//! Resource type definitions: the binding between an endpoint, a main
//! schema and its extensions, plus the per-type feature switches.

use crate::document::Document;
use crate::error::{ScimError, ScimResult};
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// A reference to an extension schema as listed in a resource type document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaExtensionRef {
    pub schema: String,
    #[serde(default)]
    pub required: bool,
}

/// An extension schema resolved against its definition.
#[derive(Debug, Clone)]
pub struct SchemaExtension {
    pub schema: Schema,
    pub required: bool,
}

/// Fine-grained switches for turning off individual endpoint operations
/// without unregistering the whole resource type.
#[derive(Debug, Clone, Default)]
pub struct EndpointControl {
    /// Disables every operation on the resource type.
    pub disabled: bool,
    pub disable_create: bool,
    pub disable_get: bool,
    pub disable_list: bool,
    pub disable_update: bool,
    pub disable_delete: bool,
}

/// Role requirements per operation. An empty set means the operation only
/// needs an authenticated client; a non-empty method-specific set overrides
/// the common `roles` set for that operation.
#[derive(Debug, Clone, Default)]
pub struct ResourceTypeAuthorization {
    pub roles: BTreeSet<String>,
    pub roles_create: BTreeSet<String>,
    pub roles_get: BTreeSet<String>,
    pub roles_update: BTreeSet<String>,
    pub roles_delete: BTreeSet<String>,
}

impl ResourceTypeAuthorization {
    /// The effective role set for an operation.
    pub fn required_roles<'a>(&'a self, specific: &'a BTreeSet<String>) -> &'a BTreeSet<String> {
        if specific.is_empty() {
            &self.roles
        } else {
            specific
        }
    }
}

/// Per-resource-type behavior switches.
#[derive(Debug, Clone)]
pub struct ResourceTypeFeatures {
    /// Apply list filters on the handler's result set. Handlers that filter
    /// in their own backend turn this off.
    pub auto_filtering: bool,
    /// Sort the handler's result set by the requested attribute.
    pub auto_sorting: bool,
    /// Compute and validate entity tags for resources of this type.
    pub etag_enabled: bool,
    pub endpoint_control: EndpointControl,
    pub authorization: ResourceTypeAuthorization,
}

impl Default for ResourceTypeFeatures {
    fn default() -> Self {
        Self {
            auto_filtering: true,
            auto_sorting: true,
            etag_enabled: true,
            endpoint_control: EndpointControl::default(),
            authorization: ResourceTypeAuthorization::default(),
        }
    }
}

/// A registered SCIM resource type: its endpoint, main schema and resolved
/// extensions.
#[derive(Debug, Clone)]
pub struct ResourceType {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub endpoint: String,
    pub main_schema: Schema,
    pub extensions: Vec<SchemaExtension>,
    pub features: ResourceTypeFeatures,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceTypeDocument {
    id: Option<String>,
    name: String,
    description: Option<String>,
    endpoint: String,
    schema: String,
    #[serde(default)]
    schema_extensions: Vec<SchemaExtensionRef>,
}

impl ResourceType {
    /// Build a resource type from its JSON document and the schema
    /// definitions it references. Every extension listed in the document
    /// must have a matching definition in `extension_schemas`.
    pub fn from_document(
        document: Value,
        main_schema: Schema,
        extension_schemas: Vec<Schema>,
    ) -> ScimResult<Self> {
        let parsed: ResourceTypeDocument = serde_json::from_value(document)
            .map_err(|e| ScimError::invalid_value(format!("invalid resource type: {e}")))?;
        if parsed.name.trim().is_empty() {
            return Err(ScimError::invalid_value(
                "a resource type requires a non-empty name",
            ));
        }
        if !parsed.endpoint.starts_with('/') || parsed.endpoint.len() < 2 {
            return Err(ScimError::invalid_value(format!(
                "the endpoint '{}' of resource type '{}' must be a non-empty path starting \
                 with '/'",
                parsed.endpoint, parsed.name
            )));
        }
        if !parsed.schema.eq_ignore_ascii_case(&main_schema.id) {
            return Err(ScimError::invalid_value(format!(
                "resource type '{}' references main schema '{}' but was given '{}'",
                parsed.name, parsed.schema, main_schema.id
            )));
        }
        let mut extensions = Vec::with_capacity(parsed.schema_extensions.len());
        for reference in &parsed.schema_extensions {
            let schema = extension_schemas
                .iter()
                .find(|schema| schema.id.eq_ignore_ascii_case(&reference.schema))
                .cloned()
                .ok_or_else(|| {
                    ScimError::invalid_value(format!(
                        "resource type '{}' references extension schema '{}' but no such \
                         schema definition was provided",
                        parsed.name, reference.schema
                    ))
                })?;
            extensions.push(SchemaExtension {
                schema,
                required: reference.required,
            });
        }
        Ok(Self {
            id: parsed.id,
            name: parsed.name,
            description: parsed.description,
            endpoint: parsed.endpoint,
            main_schema,
            extensions,
            features: ResourceTypeFeatures::default(),
        })
    }

    pub fn with_features(mut self, features: ResourceTypeFeatures) -> Self {
        self.features = features;
        self
    }

    /// The main schema followed by all extension schemas.
    pub fn all_schemas(&self) -> Vec<&Schema> {
        std::iter::once(&self.main_schema)
            .chain(self.extensions.iter().map(|extension| &extension.schema))
            .collect()
    }

    pub fn schema_by_id(&self, id: &str) -> Option<&Schema> {
        self.all_schemas()
            .into_iter()
            .find(|schema| schema.id.eq_ignore_ascii_case(id))
    }

    /// Check that a resource document declares the main schema and every
    /// required extension, and only references known schema URIs.
    pub fn validate_declared_schemas(&self, document: &Document) -> ScimResult<()> {
        let declared = document.schemas()?;
        if !declared
            .iter()
            .any(|uri| uri.eq_ignore_ascii_case(&self.main_schema.id))
        {
            return Err(ScimError::invalid_value(format!(
                "the document does not declare the main schema '{}'",
                self.main_schema.id
            )));
        }
        for uri in &declared {
            if self.schema_by_id(uri).is_none() {
                return Err(ScimError::invalid_value(format!(
                    "the document declares the unknown schema '{uri}'",
                )));
            }
        }
        for extension in &self.extensions {
            if extension.required
                && !declared
                    .iter()
                    .any(|uri| uri.eq_ignore_ascii_case(&extension.schema.id))
            {
                return Err(ScimError::invalid_value(format!(
                    "the required extension '{}' is missing from the document",
                    extension.schema.id
                )));
            }
        }
        Ok(())
    }

    /// The `/ResourceTypes` representation of this resource type.
    pub fn to_value(&self) -> Value {
        let extensions: Vec<Value> = self
            .extensions
            .iter()
            .map(|extension| {
                serde_json::json!({
                    "schema": extension.schema.id,
                    "required": extension.required,
                })
            })
            .collect();
        let mut value = serde_json::json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:ResourceType"],
            "name": self.name,
            "endpoint": self.endpoint,
            "schema": self.main_schema.id,
        });
        let object = value.as_object_mut().unwrap();
        if let Some(id) = &self.id {
            object.insert("id".to_string(), Value::String(id.clone()));
        }
        if let Some(description) = &self.description {
            object.insert("description".to_string(), Value::String(description.clone()));
        }
        if !extensions.is_empty() {
            object.insert("schemaExtensions".to_string(), Value::Array(extensions));
        }
        value
    }
}

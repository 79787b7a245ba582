//! Registration of resource types, keyed by name and endpoint.

use crate::error::{ScimError, ScimResult};
use crate::resource_type::ResourceType;
use std::sync::Arc;

/// Holds every registered resource type. Registration fails fast on
/// duplicate names or endpoints so that misconfiguration surfaces at setup
/// time rather than on the first request.
#[derive(Debug, Default)]
pub struct ResourceTypeRegistry {
    resource_types: Vec<Arc<ResourceType>>,
}

impl ResourceTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, resource_type: ResourceType) -> ScimResult<Arc<ResourceType>> {
        if let Some(existing) = self.by_name(&resource_type.name) {
            return Err(ScimError::conflict(format!(
                "a resource type with the name '{}' is already registered",
                existing.name
            )));
        }
        if let Some(existing) = self.by_endpoint(&resource_type.endpoint) {
            return Err(ScimError::conflict(format!(
                "the endpoint '{}' is already taken by resource type '{}'",
                existing.endpoint, existing.name
            )));
        }
        let resource_type = Arc::new(resource_type);
        log::debug!(
            "registered resource type '{}' at endpoint '{}'",
            resource_type.name,
            resource_type.endpoint
        );
        self.resource_types.push(Arc::clone(&resource_type));
        Ok(resource_type)
    }

    pub fn by_name(&self, name: &str) -> Option<&Arc<ResourceType>> {
        self.resource_types
            .iter()
            .find(|resource_type| resource_type.name.eq_ignore_ascii_case(name))
    }

    pub fn by_endpoint(&self, endpoint: &str) -> Option<&Arc<ResourceType>> {
        self.resource_types
            .iter()
            .find(|resource_type| resource_type.endpoint.eq_ignore_ascii_case(endpoint))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ResourceType>> {
        self.resource_types.iter()
    }

    pub fn len(&self) -> usize {
        self.resource_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resource_types.is_empty()
    }
}

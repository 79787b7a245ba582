use crate::auth::Authorization;
use crate::document::{Document, Meta};
use crate::error::{ScimError, ScimResult};
use crate::handler::{ListRequest, ListResult, ResourceHandler};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Shared store logic for the two built-in handlers.
struct InMemoryStore {
    resource_type_name: &'static str,
    resources: RwLock<HashMap<String, Document>>,
}

impl InMemoryStore {
    fn new(resource_type_name: &'static str) -> Self {
        Self {
            resource_type_name,
            resources: RwLock::new(HashMap::new()),
        }
    }

    fn stamp_meta(&self, document: &mut Document, created: Option<Meta>) -> ScimResult<()> {
        let now = Utc::now();
        let meta = Meta {
            resource_type: Some(self.resource_type_name.to_string()),
            created: created.as_ref().and_then(|meta| meta.created).or(Some(now)),
            last_modified: Some(now),
            location: None,
            version: None,
        };
        document.set_meta(&meta);
        Ok(())
    }

    fn create(&self, mut document: Document) -> ScimResult<Document> {
        let id = Uuid::new_v4().to_string();
        document.set_id(id.clone());
        self.stamp_meta(&mut document, None)?;
        let mut resources = self
            .resources
            .write()
            .map_err(|_| ScimError::internal("resource store lock poisoned"))?;
        resources.insert(id, document.clone());
        Ok(document)
    }

    fn get(&self, id: &str) -> ScimResult<Option<Document>> {
        let resources = self
            .resources
            .read()
            .map_err(|_| ScimError::internal("resource store lock poisoned"))?;
        Ok(resources.get(id).cloned())
    }

    fn list(&self) -> ScimResult<ListResult> {
        let resources = self
            .resources
            .read()
            .map_err(|_| ScimError::internal("resource store lock poisoned"))?;
        let mut all: Vec<Document> = resources.values().cloned().collect();
        // id order keeps list output deterministic across calls
        all.sort_by_key(|document| {
            document
                .id()
                .ok()
                .flatten()
                .map(str::to_string)
                .unwrap_or_default()
        });
        Ok(ListResult::of(all))
    }

    fn update(&self, mut document: Document) -> ScimResult<Document> {
        let id = document
            .id()?
            .map(str::to_string)
            .ok_or_else(|| ScimError::bad_request("the resource to update carries no id"))?;
        let mut resources = self
            .resources
            .write()
            .map_err(|_| ScimError::internal("resource store lock poisoned"))?;
        let existing = resources.get(&id).ok_or_else(|| {
            ScimError::resource_not_found(format!(
                "there is no {} resource with id '{id}'",
                self.resource_type_name
            ))
        })?;
        let existing_meta = existing.meta()?;
        self.stamp_meta(&mut document, existing_meta)?;
        resources.insert(id, document.clone());
        Ok(document)
    }

    fn delete(&self, id: &str) -> ScimResult<()> {
        let mut resources = self
            .resources
            .write()
            .map_err(|_| ScimError::internal("resource store lock poisoned"))?;
        if resources.remove(id).is_none() {
            return Err(ScimError::resource_not_found(format!(
                "there is no {} resource with id '{id}'",
                self.resource_type_name
            )));
        }
        Ok(())
    }
}

/// User storage with a uniqueness check on `userName`.
pub struct InMemoryUserHandler {
    store: InMemoryStore,
}

impl InMemoryUserHandler {
    pub fn new() -> Self {
        Self {
            store: InMemoryStore::new("User"),
        }
    }

    fn check_user_name_unique(&self, document: &Document) -> ScimResult<()> {
        let Some(user_name) = document.get_str("userName")? else {
            return Ok(());
        };
        let id = document.id()?.unwrap_or_default().to_string();
        let user_name = user_name.to_string();
        let resources = self
            .store
            .resources
            .read()
            .map_err(|_| ScimError::internal("resource store lock poisoned"))?;
        for (existing_id, existing) in resources.iter() {
            if *existing_id == id {
                continue;
            }
            if existing
                .get_str("userName")?
                .is_some_and(|existing_name| existing_name.eq_ignore_ascii_case(&user_name))
            {
                return Err(ScimError::conflict(format!(
                    "the userName '{user_name}' is already taken"
                )));
            }
        }
        Ok(())
    }
}

impl Default for InMemoryUserHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceHandler for InMemoryUserHandler {
    fn create(&self, resource: Document, _auth: &dyn Authorization) -> ScimResult<Document> {
        self.check_user_name_unique(&resource)?;
        self.store.create(resource)
    }

    fn get(
        &self,
        id: &str,
        _attributes: &[String],
        _excluded_attributes: &[String],
        _auth: &dyn Authorization,
    ) -> ScimResult<Option<Document>> {
        self.store.get(id)
    }

    fn list(&self, _request: &ListRequest<'_>, _auth: &dyn Authorization) -> ScimResult<ListResult> {
        self.store.list()
    }

    fn update(&self, resource: Document, _auth: &dyn Authorization) -> ScimResult<Document> {
        self.check_user_name_unique(&resource)?;
        self.store.update(resource)
    }

    fn delete(&self, id: &str, _auth: &dyn Authorization) -> ScimResult<()> {
        self.store.delete(id)
    }
}

/// Group storage without extra constraints.
pub struct InMemoryGroupHandler {
    store: InMemoryStore,
}

impl InMemoryGroupHandler {
    pub fn new() -> Self {
        Self {
            store: InMemoryStore::new("Group"),
        }
    }
}

impl Default for InMemoryGroupHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceHandler for InMemoryGroupHandler {
    fn create(&self, resource: Document, _auth: &dyn Authorization) -> ScimResult<Document> {
        self.store.create(resource)
    }

    fn get(
        &self,
        id: &str,
        _attributes: &[String],
        _excluded_attributes: &[String],
        _auth: &dyn Authorization,
    ) -> ScimResult<Option<Document>> {
        self.store.get(id)
    }

    fn list(&self, _request: &ListRequest<'_>, _auth: &dyn Authorization) -> ScimResult<ListResult> {
        self.store.list()
    }

    fn update(&self, resource: Document, _auth: &dyn Authorization) -> ScimResult<Document> {
        self.store.update(resource)
    }

    fn delete(&self, id: &str, _auth: &dyn Authorization) -> ScimResult<()> {
        self.store.delete(id)
    }
}

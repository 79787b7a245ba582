//! The endpoint dispatcher: resolves a request URI, checks feature and
//! authorization gates, validates conditional headers, calls the storage
//! handler and shapes the response.

use crate::auth::Authorization;
use crate::bulk;
use crate::document::Document;
use crate::endpoints::list::{self, ListParams};
use crate::endpoints::projection::project;
use crate::endpoints::request::{ETAG_HEADER, LOCATION_HEADER, ScimRequest, ScimResponse};
use crate::error::{ScimError, ScimResult};
use crate::etag;
use crate::filter::{FilterNode, evaluate, parse_filter, parse_path};
use crate::handler::{ListRequest, ResourceHandler};
use crate::patch::{PatchHandler, PatchRequest};
use crate::resource_type::{self, HttpMethod, ResourceType, ResourceTypeRegistry, UriInfo};
use crate::service_provider::ServiceProviderConfig;
use serde_json::Value;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;

/// The verb-level operation, used for endpoint control and role checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

/// The protocol engine's entry point. Resource types are registered
/// together with the handler that stores their resources; [`handle`]
/// executes one request against them.
///
/// [`handle`]: ResourceEndpoint::handle
pub struct ResourceEndpoint {
    service_provider: ServiceProviderConfig,
    registry: ResourceTypeRegistry,
    handlers: HashMap<String, Arc<dyn ResourceHandler>>,
}

impl ResourceEndpoint {
    pub fn new(service_provider: ServiceProviderConfig) -> Self {
        Self {
            service_provider,
            registry: ResourceTypeRegistry::new(),
            handlers: HashMap::new(),
        }
    }

    pub fn service_provider(&self) -> &ServiceProviderConfig {
        &self.service_provider
    }

    pub fn registry(&self) -> &ResourceTypeRegistry {
        &self.registry
    }

    pub fn register(
        &mut self,
        resource_type: ResourceType,
        handler: Arc<dyn ResourceHandler>,
    ) -> ScimResult<()> {
        let registered = self.registry.register(resource_type)?;
        self.handlers
            .insert(registered.name.to_lowercase(), handler);
        Ok(())
    }

    /// Execute a request. Never fails: every error becomes the standard
    /// error response body with the matching status code.
    pub fn handle(&self, request: &ScimRequest, auth: &dyn Authorization) -> ScimResponse {
        match self.handle_scim(request, auth) {
            Ok(response) => response,
            Err(error) => ScimResponse::from_error(&error),
        }
    }

    /// Execute a request, surfacing errors to the caller. Bulk operations
    /// use this internally so each sub-operation's error stays isolated.
    pub fn handle_scim(
        &self,
        request: &ScimRequest,
        auth: &dyn Authorization,
    ) -> ScimResult<ScimResponse> {
        self.dispatch(request, auth, true)
    }

    fn dispatch(
        &self,
        request: &ScimRequest,
        auth: &dyn Authorization,
        allow_bulk: bool,
    ) -> ScimResult<ScimResponse> {
        if let Some(response) = self.meta_endpoint(request)? {
            return Ok(response);
        }
        let info = resource_type::resolve(&self.registry, &request.uri, request.method)?;
        if info.bulk_request {
            if !allow_bulk {
                return Err(ScimError::bad_request(
                    "bulk operations must not contain further bulk requests",
                ));
            }
            return self.handle_bulk(&info, request, auth);
        }
        let resource_type = Arc::clone(
            info.resource_type
                .as_ref()
                .ok_or_else(|| ScimError::internal("resolved URI carries no resource type"))?,
        );
        let handler = self
            .handlers
            .get(&resource_type.name.to_lowercase())
            .ok_or_else(|| {
                ScimError::internal(format!(
                    "no handler registered for resource type '{}'",
                    resource_type.name
                ))
            })?;
        let operation = match (request.method, info.resource_id.is_some(), info.search_request) {
            (HttpMethod::Post, _, true) => Operation::Read,
            (HttpMethod::Post, _, false) => Operation::Create,
            (HttpMethod::Get, _, _) => Operation::Read,
            (HttpMethod::Put | HttpMethod::Patch, _, _) => Operation::Update,
            (HttpMethod::Delete, _, _) => Operation::Delete,
        };
        let is_list = info.search_request
            || (request.method == HttpMethod::Get && info.resource_id.is_none());
        self.check_endpoint_control(&resource_type, operation, is_list)?;
        self.authorize(&resource_type, operation, request, &info, auth)?;

        match (request.method, info.search_request) {
            (HttpMethod::Post, true) => {
                let params = ListParams::from_search_request(parse_body(request)?)?;
                self.list(&resource_type, handler.as_ref(), &info, params, auth)
            }
            (HttpMethod::Post, false) => self.create(&resource_type, handler.as_ref(), &info, request, auth),
            (HttpMethod::Get, _) => match &info.resource_id {
                Some(id) => self.get(&resource_type, handler.as_ref(), &info, id, request, auth),
                None => {
                    let params = ListParams::from_query(&info.query)?;
                    self.list(&resource_type, handler.as_ref(), &info, params, auth)
                }
            },
            (HttpMethod::Put, _) => self.update(&resource_type, handler.as_ref(), &info, request, auth),
            (HttpMethod::Patch, _) => self.patch(&resource_type, handler.as_ref(), &info, request, auth),
            (HttpMethod::Delete, _) => self.delete(&resource_type, handler.as_ref(), &info, request, auth),
        }
    }

    fn create(
        &self,
        resource_type: &ResourceType,
        handler: &dyn ResourceHandler,
        info: &UriInfo,
        request: &ScimRequest,
        auth: &dyn Authorization,
    ) -> ScimResult<ScimResponse> {
        let document = Document::from_value(parse_body(request)?)?;
        resource_type.validate_declared_schemas(&document)?;
        let created = handler.create(document, auth)?;
        log::info!(
            "client '{}' created a {} resource",
            auth.client_id(),
            resource_type.name
        );
        let params = ListParams::from_query(&info.query)?;
        let (document, headers) = self.finalize(resource_type, info, created, &params)?;
        let mut response = ScimResponse::created(document.into_value());
        for (name, value) in headers {
            response = response.with_header(name, value);
        }
        Ok(response)
    }

    fn get(
        &self,
        resource_type: &ResourceType,
        handler: &dyn ResourceHandler,
        info: &UriInfo,
        id: &str,
        request: &ScimRequest,
        auth: &dyn Authorization,
    ) -> ScimResult<ScimResponse> {
        let params = ListParams::from_query(&info.query)?;
        let document = handler.get(id, &params.attributes, &params.excluded_attributes, auth)?;
        etag::validate_version(
            &self.service_provider,
            resource_type,
            || Ok(document.clone()),
            &request.headers,
        )?;
        let document = document.ok_or_else(|| not_found(resource_type, id))?;
        let (document, headers) = self.finalize(resource_type, info, document, &params)?;
        let mut response = ScimResponse::ok(document.into_value());
        for (name, value) in headers {
            response = response.with_header(name, value);
        }
        Ok(response)
    }

    fn update(
        &self,
        resource_type: &ResourceType,
        handler: &dyn ResourceHandler,
        info: &UriInfo,
        request: &ScimRequest,
        auth: &dyn Authorization,
    ) -> ScimResult<ScimResponse> {
        let id = info
            .resource_id
            .as_deref()
            .ok_or_else(|| ScimError::bad_request("PUT requests require a resource id"))?;
        let mut document = Document::from_value(parse_body(request)?)?;
        resource_type.validate_declared_schemas(&document)?;
        document.set_id(id);
        etag::validate_version(
            &self.service_provider,
            resource_type,
            || handler.get(id, &[], &[], auth),
            &request.headers,
        )?;
        let updated = handler.update(document, auth)?;
        log::info!(
            "client '{}' replaced {} resource '{id}'",
            auth.client_id(),
            resource_type.name
        );
        let params = ListParams::from_query(&info.query)?;
        let (document, headers) = self.finalize(resource_type, info, updated, &params)?;
        let mut response = ScimResponse::ok(document.into_value());
        for (name, value) in headers {
            response = response.with_header(name, value);
        }
        Ok(response)
    }

    fn patch(
        &self,
        resource_type: &ResourceType,
        handler: &dyn ResourceHandler,
        info: &UriInfo,
        request: &ScimRequest,
        auth: &dyn Authorization,
    ) -> ScimResult<ScimResponse> {
        if !self.service_provider.patch.supported {
            return Err(ScimError::not_implemented(
                "the service provider does not support patch requests",
            ));
        }
        let id = info
            .resource_id
            .as_deref()
            .ok_or_else(|| ScimError::bad_request("PATCH requests require a resource id"))?;
        let current = handler.get(id, &[], &[], auth)?;
        etag::validate_version(
            &self.service_provider,
            resource_type,
            || Ok(current.clone()),
            &request.headers,
        )?;
        let current = current.ok_or_else(|| not_found(resource_type, id))?;
        let patch_request = PatchRequest::from_value(parse_body(request)?)?;
        let outcome = PatchHandler::new(resource_type).apply(current, &patch_request)?;
        let document = if outcome.changed {
            let updated = handler.update(outcome.document, auth)?;
            log::info!(
                "client '{}' patched {} resource '{id}'",
                auth.client_id(),
                resource_type.name
            );
            updated
        } else {
            log::debug!("patch on {} resource '{id}' changed nothing", resource_type.name);
            outcome.document
        };
        let params = ListParams::from_query(&info.query)?;
        let (document, headers) = self.finalize(resource_type, info, document, &params)?;
        let mut response = ScimResponse::ok(document.into_value());
        for (name, value) in headers {
            response = response.with_header(name, value);
        }
        Ok(response)
    }

    fn delete(
        &self,
        resource_type: &ResourceType,
        handler: &dyn ResourceHandler,
        info: &UriInfo,
        request: &ScimRequest,
        auth: &dyn Authorization,
    ) -> ScimResult<ScimResponse> {
        let id = info
            .resource_id
            .as_deref()
            .ok_or_else(|| ScimError::bad_request("DELETE requests require a resource id"))?;
        etag::validate_version(
            &self.service_provider,
            resource_type,
            || handler.get(id, &[], &[], auth),
            &request.headers,
        )?;
        handler.delete(id, auth)?;
        log::info!(
            "client '{}' deleted {} resource '{id}'",
            auth.client_id(),
            resource_type.name
        );
        Ok(ScimResponse::no_content())
    }

    fn list(
        &self,
        resource_type: &ResourceType,
        handler: &dyn ResourceHandler,
        info: &UriInfo,
        params: ListParams,
        auth: &dyn Authorization,
    ) -> ScimResult<ScimResponse> {
        let schemas = resource_type.all_schemas();
        let filter: Option<FilterNode> = match &params.filter {
            None => None,
            Some(raw) => {
                if !self.service_provider.filter.supported {
                    return Err(ScimError::invalid_filter(
                        "the service provider does not support filtering",
                    ));
                }
                Some(parse_filter(raw, &schemas)?)
            }
        };
        let sort_order = params.sort_order()?;
        let sort_path = match &params.sort_by {
            Some(raw) if self.service_provider.sort.supported => Some(parse_path(raw, &schemas)?),
            _ => None,
        };
        let (start_index, count) = params.pagination(&self.service_provider.filter);

        let list_request = ListRequest {
            start_index,
            count,
            filter: filter.as_ref(),
            sort_by: params.sort_by.as_deref(),
            sort_order,
            attributes: &params.attributes,
            excluded_attributes: &params.excluded_attributes,
        };
        let result = handler.list(&list_request, auth)?;
        let mut resources = result.resources;
        let mut total_results = result.total_results;

        if resource_type.features.auto_filtering {
            if let Some(filter) = &filter {
                let mut matching = Vec::with_capacity(resources.len());
                for document in resources {
                    if evaluate(filter, &document)? {
                        matching.push(document);
                    }
                }
                resources = matching;
            }
            total_results = resources.len();
        }
        // Sorting is independent of auto-filtering: a handler that filters
        // in its backend can still leave sorting to the dispatcher.
        if resource_type.features.auto_sorting {
            if let Some(path) = &sort_path {
                list::sort_documents(&mut resources, path, sort_order);
            }
        }
        if resource_type.features.auto_filtering {
            resources = list::paginate(resources, start_index, count);
        } else if resources.len() > count {
            log::warn!(
                "the handler returned {} resources, more than the count of {count}, truncating",
                resources.len()
            );
            resources.truncate(count);
        }

        let mut projected = Vec::with_capacity(resources.len());
        for document in resources {
            let (document, _) = self.finalize(resource_type, info, document, &params)?;
            projected.push(document.into_value());
        }
        Ok(ScimResponse::ok(list::list_response(
            projected,
            total_results,
            start_index,
        )))
    }

    /// Stamp `meta.location`, `meta.resourceType` and the version onto a
    /// resource, project it, and produce the matching response headers.
    fn finalize(
        &self,
        resource_type: &ResourceType,
        info: &UriInfo,
        mut document: Document,
        params: &ListParams,
    ) -> ScimResult<(Document, Vec<(String, String)>)> {
        let mut headers = Vec::new();
        // The version hashes the document as the handler stores it, so the
        // entity tag served here matches what conditional requests later
        // compare against handler state.
        let version = etag::resource_version(&self.service_provider, resource_type, &document)?;
        let mut meta = document.meta()?.unwrap_or_default();
        meta.resource_type = Some(resource_type.name.clone());
        if let Some(id) = document.id()? {
            let location = info.resource_location(&resource_type.endpoint, &id);
            headers.push((LOCATION_HEADER.to_string(), location.clone()));
            meta.location = Some(location);
        }
        if let Some(version) = version {
            headers.push((ETAG_HEADER.to_string(), version.entity_tag()));
            meta.version = Some(version.entity_tag());
        }
        document.set_meta(&meta);
        let document = project(
            resource_type,
            document,
            &params.attributes,
            &params.excluded_attributes,
        )?;
        Ok((document, headers))
    }

    fn check_endpoint_control(
        &self,
        resource_type: &ResourceType,
        operation: Operation,
        is_list: bool,
    ) -> ScimResult<()> {
        let control = &resource_type.features.endpoint_control;
        let disabled = control.disabled
            || match operation {
                Operation::Create => control.disable_create,
                Operation::Read => {
                    if is_list {
                        control.disable_list
                    } else {
                        control.disable_get
                    }
                }
                Operation::Update => control.disable_update,
                Operation::Delete => control.disable_delete,
            };
        if disabled {
            return Err(ScimError::not_implemented(format!(
                "the endpoint is disabled for resource type '{}'",
                resource_type.name
            )));
        }
        Ok(())
    }

    fn authorize(
        &self,
        resource_type: &ResourceType,
        operation: Operation,
        request: &ScimRequest,
        info: &UriInfo,
        auth: &dyn Authorization,
    ) -> ScimResult<()> {
        if !auth.authenticate(&request.headers, &info.query) {
            log::warn!("client '{}' failed authentication", auth.client_id());
            return Err(ScimError::unauthorized("authentication failed"));
        }
        let authorization = &resource_type.features.authorization;
        let required: &BTreeSet<String> = match operation {
            Operation::Create => authorization.required_roles(&authorization.roles_create),
            Operation::Read => authorization.required_roles(&authorization.roles_get),
            Operation::Update => authorization.required_roles(&authorization.roles_update),
            Operation::Delete => authorization.required_roles(&authorization.roles_delete),
        };
        if required.is_empty() {
            return Ok(());
        }
        if required.intersection(auth.client_roles()).next().is_none() {
            log::warn!(
                "client '{}' lacks the roles required for {} on '{}'",
                auth.client_id(),
                request.method,
                resource_type.name
            );
            return Err(ScimError::forbidden(format!(
                "you are missing a role required for this operation, one of: {}",
                required.iter().cloned().collect::<Vec<_>>().join(", ")
            )));
        }
        Ok(())
    }

    /// The read-only discovery endpoints: `/ServiceProviderConfig`,
    /// `/ResourceTypes` and `/Schemas`.
    fn meta_endpoint(&self, request: &ScimRequest) -> ScimResult<Option<ScimResponse>> {
        let path = request.uri.split('?').next().unwrap_or_default();
        let path = path.trim_end_matches('/');
        let lower = path.to_ascii_lowercase();

        let respond = |body: Value| Ok(Some(ScimResponse::ok(body)));

        if let Some((base, None)) = self.discovery_path(path, &lower, "/serviceproviderconfig") {
            require_get(request.method, "ServiceProviderConfig")?;
            return respond(self.service_provider.to_document(base));
        }
        if let Some((_, remainder)) = self.discovery_path(path, &lower, "/resourcetypes") {
            require_get(request.method, "ResourceTypes")?;
            return match remainder {
                None => {
                    let resources: Vec<Value> =
                        self.registry.iter().map(|rt| rt.to_value()).collect();
                    let total = resources.len();
                    respond(list::list_response(resources, total, 1))
                }
                Some(name) => {
                    let resource_type = self.registry.by_name(name).ok_or_else(|| {
                        ScimError::resource_not_found(format!(
                            "there is no resource type named '{name}'"
                        ))
                    })?;
                    respond(resource_type.to_value())
                }
            };
        }
        if let Some((_, remainder)) = self.discovery_path(path, &lower, "/schemas") {
            require_get(request.method, "Schemas")?;
            let mut schemas: Vec<&crate::schema::Schema> = Vec::new();
            for resource_type in self.registry.iter() {
                for schema in resource_type.all_schemas() {
                    if !schemas.iter().any(|known| known.id == schema.id) {
                        schemas.push(schema);
                    }
                }
            }
            return match remainder {
                None => {
                    let resources: Vec<Value> =
                        schemas.iter().map(|schema| schema.to_value()).collect();
                    let total = resources.len();
                    respond(list::list_response(resources, total, 1))
                }
                Some(id) => {
                    let schema = schemas
                        .iter()
                        .find(|schema| schema.id.eq_ignore_ascii_case(id))
                        .ok_or_else(|| {
                            ScimError::resource_not_found(format!(
                                "there is no schema with id '{id}'"
                            ))
                        })?;
                    respond(schema.to_value())
                }
            };
        }
        Ok(None)
    }

    /// Match a discovery endpoint path, returning the base URI before the
    /// endpoint segment and the optional trailing identifier. The segment
    /// is matched case-insensitively, and only when it sits directly under
    /// the base: a path whose base ends in a registered resource endpoint,
    /// such as `/Users/ServiceProviderConfig`, targets a resource with that
    /// id, not the discovery endpoint.
    fn discovery_path<'p>(
        &self,
        path: &'p str,
        lower: &str,
        endpoint: &str,
    ) -> Option<(&'p str, Option<&'p str>)> {
        let start = lower.rfind(endpoint)?;
        let end = start + endpoint.len();
        let lower_base = &lower[..start];
        if self
            .registry
            .iter()
            .any(|rt| lower_base.ends_with(&rt.endpoint.to_ascii_lowercase()))
        {
            return None;
        }
        let base = &path[..start];
        let rest = &path[end..];
        if rest.is_empty() {
            return Some((base, None));
        }
        let identifier = rest.strip_prefix('/')?;
        if identifier.is_empty() || identifier.contains('/') {
            return None;
        }
        Some((base, Some(identifier)))
    }

    /// The resource type a bulk operation path targets, used to drive
    /// schema-aware bulkId substitution. `None` when the path matches no
    /// registered endpoint; the operation's dispatch reports that error.
    fn bulk_target_type(&self, path: &str) -> Option<Arc<ResourceType>> {
        let segment = path
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or_default();
        self.registry.by_endpoint(&format!("/{segment}")).cloned()
    }

    fn handle_bulk(
        &self,
        info: &UriInfo,
        request: &ScimRequest,
        auth: &dyn Authorization,
    ) -> ScimResult<ScimResponse> {
        let config = &self.service_provider.bulk;
        if !config.supported {
            return Err(ScimError::not_implemented(
                "the service provider does not support bulk requests",
            ));
        }
        let raw_body = request
            .body
            .as_deref()
            .ok_or_else(|| ScimError::invalid_syntax("a bulk request requires a body"))?;
        if raw_body.len() > config.max_payload_size {
            return Err(ScimError::bad_request(format!(
                "the bulk request payload of {} bytes exceeds the maximum of {} bytes",
                raw_body.len(),
                config.max_payload_size
            )));
        }
        let bulk_request = bulk::BulkRequest::from_value(serde_json::from_str(raw_body)?)?;
        bulk_request.validate(config)?;
        let order = bulk::execution_order(&bulk_request, &self.registry)?;
        log::debug!(
            "executing bulk request with {} operations for client '{}'",
            bulk_request.operations.len(),
            auth.client_id()
        );

        let mut resolved: HashMap<String, bulk::ResolvedResource> = HashMap::new();
        let mut results: Vec<Option<bulk::BulkResponseOperation>> =
            vec![None; bulk_request.operations.len()];
        let mut errors = 0u32;
        let mut stopped = false;
        for index in order {
            let operation = &bulk_request.operations[index];
            if stopped {
                results[index] = Some(failed_dependency(
                    operation,
                    "the operation was not processed because the failure limit was reached",
                ));
                continue;
            }
            // validate() guarantees the method is usable
            let method = operation.method()?;
            let path = match bulk::resolve_path(&operation.path, &resolved) {
                Ok(path) => path,
                Err(reference) => {
                    results[index] = Some(failed_dependency(
                        operation,
                        &format!(
                            "the operation references bulkIds whose operations failed: {reference}"
                        ),
                    ));
                    continue;
                }
            };
            let mut data = operation.data.clone();
            if let Some(data) = data.as_mut() {
                if let Some(target_type) = self.bulk_target_type(&path) {
                    let unresolved =
                        bulk::resolve_references(data, &target_type, method, &resolved);
                    if !unresolved.is_empty() {
                        results[index] = Some(failed_dependency(
                            operation,
                            &format!(
                                "the operation references bulkIds whose operations failed: {}",
                                unresolved.join(", ")
                            ),
                        ));
                        continue;
                    }
                }
            }
            let mut sub_request =
                ScimRequest::new(method, format!("{}{}", info.base_uri, path));
            if let Some(version) = &operation.version {
                sub_request = sub_request.with_header("If-Match", version.clone());
            }
            if let Some(data) = data {
                sub_request = sub_request.with_json(&data);
            }
            let response = match self.dispatch(&sub_request, auth, false) {
                Ok(response) => response,
                Err(error) => ScimResponse::from_error(&error),
            };
            let failed = response.status >= 400;
            let location = response.header("Location").map(str::to_string);
            if method == HttpMethod::Post && !failed {
                let id = response
                    .body
                    .as_ref()
                    .and_then(|body| body.get("id"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                if let (Some(bulk_id), Some(id)) = (&operation.bulk_id, id) {
                    resolved.insert(
                        bulk_id.to_lowercase(),
                        bulk::ResolvedResource {
                            id,
                            location: location.clone(),
                        },
                    );
                }
            }
            results[index] = Some(bulk::BulkResponseOperation {
                method: method.as_str().to_string(),
                bulk_id: operation.bulk_id.clone(),
                location,
                version: response.header("ETag").map(str::to_string),
                status: response.status,
                response: if failed { response.body } else { None },
            });
            if failed {
                errors += 1;
                if let Some(limit) = bulk_request.fail_on_errors {
                    if errors >= limit {
                        log::debug!("bulk failure limit of {limit} reached, skipping the rest");
                        stopped = true;
                    }
                }
            }
        }
        let operations = results.into_iter().flatten().collect();
        Ok(ScimResponse::ok(bulk::BulkResponse::new(operations).to_value()))
    }
}

fn failed_dependency(
    operation: &bulk::BulkRequestOperation,
    detail: &str,
) -> bulk::BulkResponseOperation {
    bulk::BulkResponseOperation {
        method: operation.method.to_ascii_uppercase(),
        bulk_id: operation.bulk_id.clone(),
        location: None,
        version: None,
        status: 424,
        response: Some(ScimError::bad_request(detail).to_error_response()),
    }
}

fn not_found(resource_type: &ResourceType, id: &str) -> ScimError {
    ScimError::resource_not_found(format!(
        "there is no {} resource with id '{id}'",
        resource_type.name
    ))
}

fn parse_body(request: &ScimRequest) -> ScimResult<Value> {
    let body = request
        .body
        .as_deref()
        .ok_or_else(|| ScimError::invalid_syntax("the request requires a body"))?;
    Ok(serde_json::from_str(body)?)
}

fn require_get(method: HttpMethod, endpoint: &str) -> ScimResult<()> {
    if method != HttpMethod::Get {
        return Err(ScimError::bad_request(format!(
            "the /{endpoint} endpoint only supports GET"
        )));
    }
    Ok(())
}

//! Shared fixtures for the integration tests: an endpoint with the
//! built-in User and Group resource types backed by in-memory handlers.

use scim_protocol::auth::AnonymousAuthorization;
use scim_protocol::endpoints::{ResourceEndpoint, ScimRequest, ScimResponse};
use scim_protocol::resource_handlers::{InMemoryGroupHandler, InMemoryUserHandler};
use scim_protocol::resource_type::{HttpMethod, ResourceType};
use scim_protocol::schema::{Schema, embedded};
use scim_protocol::service_provider::ServiceProviderConfig;
use serde_json::{Value, json};
use std::sync::Arc;

pub const BASE: &str = "https://example.com/scim/v2";

pub fn user_resource_type() -> ResourceType {
    ResourceType::from_document(
        serde_json::from_str(embedded::user_resource_type()).unwrap(),
        Schema::from_json(embedded::user_schema()).unwrap(),
        vec![Schema::from_json(embedded::enterprise_user_schema()).unwrap()],
    )
    .unwrap()
}

pub fn group_resource_type() -> ResourceType {
    ResourceType::from_document(
        serde_json::from_str(embedded::group_resource_type()).unwrap(),
        Schema::from_json(embedded::group_schema()).unwrap(),
        vec![],
    )
    .unwrap()
}

pub fn endpoint() -> ResourceEndpoint {
    endpoint_with_config(ServiceProviderConfig::default())
}

pub fn endpoint_with_config(config: ServiceProviderConfig) -> ResourceEndpoint {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut endpoint = ResourceEndpoint::new(config);
    endpoint
        .register(user_resource_type(), Arc::new(InMemoryUserHandler::new()))
        .unwrap();
    endpoint
        .register(group_resource_type(), Arc::new(InMemoryGroupHandler::new()))
        .unwrap();
    endpoint
}

pub fn send(endpoint: &ResourceEndpoint, request: ScimRequest) -> ScimResponse {
    endpoint.handle(&request, &AnonymousAuthorization::default())
}

pub fn user_payload(user_name: &str) -> Value {
    json!({
        "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
        "userName": user_name,
    })
}

/// Create a user and return the response body.
pub fn create_user(endpoint: &ResourceEndpoint, user_name: &str) -> Value {
    let response = send(
        endpoint,
        ScimRequest::new(HttpMethod::Post, format!("{BASE}/Users"))
            .with_json(&user_payload(user_name)),
    );
    assert_eq!(response.status, 201, "create failed: {:?}", response.body);
    response.body.unwrap()
}

pub fn resource_id(body: &Value) -> String {
    body.get("id").and_then(Value::as_str).unwrap().to_string()
}

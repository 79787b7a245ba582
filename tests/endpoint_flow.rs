//! End-to-end request dispatch: CRUD lifecycle, conditional requests,
//! filtering, sorting, pagination and the discovery endpoints.

mod common;

use common::{BASE, create_user, endpoint, resource_id, send, user_payload};
use scim_protocol::endpoints::ScimRequest;
use scim_protocol::resource_type::HttpMethod;
use scim_protocol::service_provider::ServiceProviderConfig;
use serde_json::{Value, json};

#[test]
fn create_returns_location_etag_and_stamped_meta() {
    let endpoint = endpoint();
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Post, format!("{BASE}/Users"))
            .with_json(&user_payload("chuck")),
    );
    assert_eq!(response.status, 201);
    let body = response.body.clone().unwrap();
    let id = resource_id(&body);
    let location = response.header("Location").unwrap();
    assert_eq!(location, format!("{BASE}/Users/{id}"));
    assert!(response.header("ETag").unwrap().starts_with("W/\""));
    let meta = body.get("meta").unwrap();
    assert_eq!(meta.get("resourceType").unwrap(), "User");
    assert_eq!(meta.get("location").unwrap(), &json!(location));
    assert!(meta.get("created").is_some());
    assert_eq!(meta.get("version"), Some(&json!(response.header("ETag").unwrap())));
}

#[test]
fn create_without_main_schema_is_rejected() {
    let endpoint = endpoint();
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Post, format!("{BASE}/Users"))
            .with_json(&json!({"userName": "chuck"})),
    );
    assert_eq!(response.status, 400);
}

#[test]
fn duplicate_user_name_conflicts() {
    let endpoint = endpoint();
    create_user(&endpoint, "chuck");
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Post, format!("{BASE}/Users"))
            .with_json(&user_payload("CHUCK")),
    );
    assert_eq!(response.status, 409);
}

#[test]
fn get_roundtrip_and_missing_resource() {
    let endpoint = endpoint();
    let id = resource_id(&create_user(&endpoint, "chuck"));
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Get, format!("{BASE}/Users/{id}")),
    );
    assert_eq!(response.status, 200);
    assert_eq!(response.body.unwrap().get("userName").unwrap(), "chuck");

    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Get, format!("{BASE}/Users/missing")),
    );
    assert_eq!(response.status, 404);
    let body = response.body.unwrap();
    assert_eq!(body.get("status").unwrap(), "404");
}

#[test]
fn put_replaces_and_bumps_the_version() {
    let endpoint = endpoint();
    let created = create_user(&endpoint, "chuck");
    let id = resource_id(&created);
    let old_version = created["meta"]["version"].as_str().unwrap().to_string();

    let mut replacement = user_payload("chuck");
    replacement["displayName"] = json!("Chuck Norris");
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Put, format!("{BASE}/Users/{id}")).with_json(&replacement),
    );
    assert_eq!(response.status, 200);
    let body = response.body.unwrap();
    assert_eq!(body.get("displayName").unwrap(), "Chuck Norris");
    assert_ne!(body["meta"]["version"].as_str().unwrap(), old_version);
}

#[test]
fn delete_removes_the_resource() {
    let endpoint = endpoint();
    let id = resource_id(&create_user(&endpoint, "chuck"));
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Delete, format!("{BASE}/Users/{id}")),
    );
    assert_eq!(response.status, 204);
    assert!(response.body.is_none());

    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Delete, format!("{BASE}/Users/{id}")),
    );
    assert_eq!(response.status, 404);
}

#[test]
fn stale_if_match_fails_the_precondition() {
    let endpoint = endpoint();
    let id = resource_id(&create_user(&endpoint, "chuck"));
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Put, format!("{BASE}/Users/{id}"))
            .with_header("If-Match", "W/\"stale\"")
            .with_json(&user_payload("chuck")),
    );
    assert_eq!(response.status, 412);
}

#[test]
fn current_if_match_allows_the_update() {
    let endpoint = endpoint();
    let created = create_user(&endpoint, "chuck");
    let id = resource_id(&created);
    let version = created["meta"]["version"].as_str().unwrap().to_string();
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Put, format!("{BASE}/Users/{id}"))
            .with_header("If-Match", version)
            .with_json(&user_payload("chuck")),
    );
    assert_eq!(response.status, 200);
}

#[test]
fn matching_if_none_match_yields_not_modified() {
    let endpoint = endpoint();
    let created = create_user(&endpoint, "chuck");
    let id = resource_id(&created);
    let version = created["meta"]["version"].as_str().unwrap().to_string();
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Get, format!("{BASE}/Users/{id}"))
            .with_header("If-None-Match", version),
    );
    assert_eq!(response.status, 304);
    assert!(response.body.is_none());
}

#[test]
fn both_conditional_headers_are_a_bad_request() {
    let endpoint = endpoint();
    let id = resource_id(&create_user(&endpoint, "chuck"));
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Get, format!("{BASE}/Users/{id}"))
            .with_header("If-Match", "W/\"a\"")
            .with_header("If-None-Match", "W/\"b\""),
    );
    assert_eq!(response.status, 400);
}

#[test]
fn list_pages_across_the_full_result_set() {
    let endpoint = endpoint();
    for index in 0..25 {
        create_user(&endpoint, &format!("user{index:02}"));
    }
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Get, format!("{BASE}/Users?count=10")),
    );
    assert_eq!(response.status, 200);
    let body = response.body.unwrap();
    assert_eq!(body.get("totalResults").unwrap(), 25);
    assert_eq!(body.get("itemsPerPage").unwrap(), 10);
    assert_eq!(body.get("startIndex").unwrap(), 1);
    assert_eq!(body["Resources"].as_array().unwrap().len(), 10);

    let response = send(
        &endpoint,
        ScimRequest::new(
            HttpMethod::Get,
            format!("{BASE}/Users?count=10&startIndex=21"),
        ),
    );
    let body = response.body.unwrap();
    assert_eq!(body.get("totalResults").unwrap(), 25);
    assert_eq!(body.get("itemsPerPage").unwrap(), 5);
}

#[test]
fn list_filter_narrows_and_counts_matches_only() {
    let endpoint = endpoint();
    create_user(&endpoint, "chuck");
    create_user(&endpoint, "charlie");
    create_user(&endpoint, "walker");
    let response = send(
        &endpoint,
        ScimRequest::new(
            HttpMethod::Get,
            format!("{BASE}/Users?filter=userName%20sw%20%22ch%22"),
        ),
    );
    let body = response.body.unwrap();
    assert_eq!(body.get("totalResults").unwrap(), 2);
    let names: Vec<&str> = body["Resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|resource| resource["userName"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"chuck") && names.contains(&"charlie"));
}

#[test]
fn invalid_filter_reports_the_offending_part() {
    let endpoint = endpoint();
    let response = send(
        &endpoint,
        ScimRequest::new(
            HttpMethod::Get,
            format!("{BASE}/Users?filter=shoeSize%20eq%2044"),
        ),
    );
    assert_eq!(response.status, 400);
    let body = response.body.unwrap();
    assert_eq!(body.get("scimType").unwrap(), "invalidFilter");
}

#[test]
fn list_sorts_by_attribute_with_direction() {
    let endpoint = endpoint();
    create_user(&endpoint, "walker");
    create_user(&endpoint, "Chuck");
    create_user(&endpoint, "norris");
    let response = send(
        &endpoint,
        ScimRequest::new(
            HttpMethod::Get,
            format!("{BASE}/Users?sortBy=userName&sortOrder=descending"),
        ),
    );
    let body = response.body.unwrap();
    let names: Vec<&str> = body["Resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|resource| resource["userName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["walker", "norris", "Chuck"]);
}

#[test]
fn sorting_applies_when_auto_filtering_is_disabled() {
    use scim_protocol::resource_type::ResourceTypeFeatures;
    let mut features = ResourceTypeFeatures::default();
    features.auto_filtering = false;
    let mut endpoint =
        scim_protocol::endpoints::ResourceEndpoint::new(ServiceProviderConfig::default());
    endpoint
        .register(
            common::user_resource_type().with_features(features),
            std::sync::Arc::new(scim_protocol::resource_handlers::InMemoryUserHandler::new()),
        )
        .unwrap();
    create_user(&endpoint, "chuck");
    create_user(&endpoint, "walker");
    create_user(&endpoint, "norris");
    let response = send(
        &endpoint,
        ScimRequest::new(
            HttpMethod::Get,
            format!("{BASE}/Users?sortBy=userName&sortOrder=descending"),
        ),
    );
    assert_eq!(response.status, 200);
    let body = response.body.unwrap();
    let names: Vec<&str> = body["Resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|resource| resource["userName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["walker", "norris", "chuck"]);
}

#[test]
fn search_endpoint_takes_parameters_from_the_body() {
    let endpoint = endpoint();
    create_user(&endpoint, "chuck");
    create_user(&endpoint, "walker");
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Post, format!("{BASE}/Users/.search")).with_json(&json!({
            "schemas": ["urn:ietf:params:scim:api:messages:2.0:SearchRequest"],
            "filter": "userName eq \"chuck\"",
            "attributes": ["userName"],
        })),
    );
    assert_eq!(response.status, 200);
    let body = response.body.unwrap();
    assert_eq!(body.get("totalResults").unwrap(), 1);
    let resource = &body["Resources"][0];
    assert_eq!(resource.get("userName").unwrap(), "chuck");
    assert!(resource.get("meta").is_none());
}

#[test]
fn patch_endpoint_applies_operations() {
    let endpoint = endpoint();
    let id = resource_id(&create_user(&endpoint, "chuck"));
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Patch, format!("{BASE}/Users/{id}")).with_json(&json!({
            "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
            "Operations": [
                {"op": "add", "path": "displayName", "value": "Chuck Norris"}
            ]
        })),
    );
    assert_eq!(response.status, 200);
    assert_eq!(response.body.unwrap().get("displayName").unwrap(), "Chuck Norris");
}

#[test]
fn patch_can_be_disabled_by_the_provider() {
    let mut config = ServiceProviderConfig::default();
    config.patch.supported = false;
    let endpoint = common::endpoint_with_config(config);
    let id = resource_id(&create_user(&endpoint, "chuck"));
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Patch, format!("{BASE}/Users/{id}")).with_json(&json!({
            "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
            "Operations": [{"op": "remove", "path": "displayName"}]
        })),
    );
    assert_eq!(response.status, 501);
}

#[test]
fn unknown_endpoint_is_a_bad_request() {
    let endpoint = endpoint();
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Get, format!("{BASE}/Machines")),
    );
    assert_eq!(response.status, 400);
    assert_eq!(
        response.body.unwrap().get("scimType").unwrap(),
        "unknownResource"
    );
}

#[test]
fn service_provider_config_endpoint() {
    let endpoint = endpoint();
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Get, format!("{BASE}/ServiceProviderConfig")),
    );
    assert_eq!(response.status, 200);
    let body = response.body.unwrap();
    assert_eq!(body["patch"]["supported"], json!(true));
    assert_eq!(body["bulk"]["maxOperations"], json!(15));
}

#[test]
fn discovery_names_do_not_shadow_resource_ids() {
    let endpoint = endpoint();
    let response = send(
        &endpoint,
        ScimRequest::new(
            HttpMethod::Get,
            format!("{BASE}/Users/ServiceProviderConfig"),
        ),
    );
    // a resource id that spells a discovery endpoint stays a resource GET
    assert_eq!(response.status, 404);
    assert_eq!(response.body.unwrap()["status"], "404");
}

#[test]
fn resource_types_and_schemas_are_discoverable() {
    let endpoint = endpoint();
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Get, format!("{BASE}/ResourceTypes")),
    );
    let body = response.body.unwrap();
    assert_eq!(body.get("totalResults").unwrap(), 2);

    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Get, format!("{BASE}/ResourceTypes/User")),
    );
    assert_eq!(response.status, 200);
    assert_eq!(response.body.unwrap().get("endpoint").unwrap(), "/Users");

    let response = send(
        &endpoint,
        ScimRequest::new(
            HttpMethod::Get,
            format!("{BASE}/Schemas/urn:ietf:params:scim:schemas:core:2.0:User"),
        ),
    );
    assert_eq!(response.status, 200);
    assert_eq!(response.body.unwrap().get("name").unwrap(), "User");
}

#[test]
fn projection_parameters_apply_on_single_resources() {
    let endpoint = endpoint();
    let id = resource_id(&create_user(&endpoint, "chuck"));
    let response = send(
        &endpoint,
        ScimRequest::new(
            HttpMethod::Get,
            format!("{BASE}/Users/{id}?attributes=userName"),
        ),
    );
    let body = response.body.unwrap();
    assert!(body.get("userName").is_some());
    assert!(body.get("meta").is_none());
    assert!(body.get("id").is_some());
}

fn roles_restricted_endpoint() -> scim_protocol::endpoints::ResourceEndpoint {
    use scim_protocol::resource_type::ResourceTypeFeatures;
    let mut features = ResourceTypeFeatures::default();
    features.authorization.roles_delete =
        std::iter::once("admin".to_string()).collect();
    let mut endpoint =
        scim_protocol::endpoints::ResourceEndpoint::new(ServiceProviderConfig::default());
    endpoint
        .register(
            common::user_resource_type().with_features(features),
            std::sync::Arc::new(scim_protocol::resource_handlers::InMemoryUserHandler::new()),
        )
        .unwrap();
    endpoint
}

#[test]
fn missing_role_is_forbidden() {
    use scim_protocol::auth::ClientAuthorization;
    let endpoint = roles_restricted_endpoint();
    let created = endpoint.handle(
        &ScimRequest::new(HttpMethod::Post, format!("{BASE}/Users"))
            .with_json(&user_payload("chuck")),
        &ClientAuthorization::new("reader", ["audit"]),
    );
    let id = resource_id(created.body.as_ref().unwrap());

    let denied = endpoint.handle(
        &ScimRequest::new(HttpMethod::Delete, format!("{BASE}/Users/{id}")),
        &ClientAuthorization::new("reader", ["audit"]),
    );
    assert_eq!(denied.status, 403);

    let allowed = endpoint.handle(
        &ScimRequest::new(HttpMethod::Delete, format!("{BASE}/Users/{id}")),
        &ClientAuthorization::new("root", ["admin"]),
    );
    assert_eq!(allowed.status, 204);
}

#[test]
fn disabled_endpoint_verb_is_not_implemented() {
    use scim_protocol::resource_type::ResourceTypeFeatures;
    let mut features = ResourceTypeFeatures::default();
    features.endpoint_control.disable_create = true;
    let mut endpoint =
        scim_protocol::endpoints::ResourceEndpoint::new(ServiceProviderConfig::default());
    endpoint
        .register(
            common::user_resource_type().with_features(features),
            std::sync::Arc::new(scim_protocol::resource_handlers::InMemoryUserHandler::new()),
        )
        .unwrap();
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Post, format!("{BASE}/Users"))
            .with_json(&user_payload("chuck")),
    );
    assert_eq!(response.status, 501);
}

#[test]
fn error_body_carries_the_error_schema() {
    let endpoint = endpoint();
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Get, format!("{BASE}/Users/missing")),
    );
    let body: Value = response.body.unwrap();
    assert_eq!(
        body["schemas"][0],
        "urn:ietf:params:scim:api:messages:2.0:Error"
    );
}

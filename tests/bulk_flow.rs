//! Bulk endpoint behavior: dependency-ordered execution, bulkId
//! substitution, failure isolation and the failOnErrors limit.

mod common;

use common::{BASE, create_user, endpoint, endpoint_with_config, resource_id, send};
use scim_protocol::endpoints::ScimRequest;
use scim_protocol::resource_type::HttpMethod;
use scim_protocol::service_provider::ServiceProviderConfig;
use serde_json::{Value, json};

fn bulk_request(operations: Value) -> Value {
    json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:BulkRequest"],
        "Operations": operations,
    })
}

fn send_bulk(endpoint: &scim_protocol::endpoints::ResourceEndpoint, body: Value) -> Value {
    let response = send(
        endpoint,
        ScimRequest::new(HttpMethod::Post, format!("{BASE}/Bulk")).with_json(&body),
    );
    assert_eq!(response.status, 200, "bulk failed: {:?}", response.body);
    response.body.unwrap()
}

#[test]
fn bulk_endpoint_rejects_get() {
    let endpoint = endpoint();
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Get, format!("{BASE}/Bulk")),
    );
    assert_eq!(response.status, 400);
}

#[test]
fn bulk_can_be_disabled_by_the_provider() {
    let mut config = ServiceProviderConfig::default();
    config.bulk.supported = false;
    let endpoint = endpoint_with_config(config);
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Post, format!("{BASE}/Bulk"))
            .with_json(&bulk_request(json!([]))),
    );
    assert_eq!(response.status, 501);
}

#[test]
fn operations_execute_and_report_individually() {
    let endpoint = endpoint();
    let body = send_bulk(
        &endpoint,
        bulk_request(json!([
            {
                "method": "POST",
                "bulkId": "chuck",
                "path": "/Users",
                "data": {
                    "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
                    "userName": "chuck"
                }
            },
            {
                "method": "DELETE",
                "path": "/Users/missing"
            }
        ])),
    );
    assert_eq!(
        body["schemas"][0],
        "urn:ietf:params:scim:api:messages:2.0:BulkResponse"
    );
    let operations = body["Operations"].as_array().unwrap();
    assert_eq!(operations.len(), 2);
    assert_eq!(operations[0]["status"], 201);
    assert_eq!(operations[0]["bulkId"], "chuck");
    assert!(operations[0]["location"].as_str().unwrap().starts_with(BASE));
    assert!(operations[0].get("response").is_none());
    assert_eq!(operations[1]["status"], 404);
    assert_eq!(operations[1]["response"]["status"], "404");
}

#[test]
fn group_creation_waits_for_referenced_user() {
    let endpoint = endpoint();
    let body = send_bulk(
        &endpoint,
        bulk_request(json!([
            {
                "method": "POST",
                "bulkId": "admins",
                "path": "/Groups",
                "data": {
                    "schemas": ["urn:ietf:params:scim:schemas:core:2.0:Group"],
                    "displayName": "Admins",
                    "members": [
                        {"value": "bulkId:chuck", "$ref": "bulkId:chuck", "type": "User"}
                    ]
                }
            },
            {
                "method": "POST",
                "bulkId": "chuck",
                "path": "/Users",
                "data": {
                    "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
                    "userName": "chuck"
                }
            }
        ])),
    );
    let operations = body["Operations"].as_array().unwrap();
    // response entries keep submission order even though the user ran first
    assert_eq!(operations[0]["bulkId"], "admins");
    assert_eq!(operations[0]["status"], 201);
    assert_eq!(operations[1]["status"], 201);

    let group_location = operations[0]["location"].as_str().unwrap();
    let group = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Get, group_location),
    )
    .body
    .unwrap();
    let member = &group["members"][0];
    let user_location = operations[1]["location"].as_str().unwrap();
    assert_eq!(member["$ref"].as_str().unwrap(), user_location);
    let user_id = user_location.rsplit('/').next().unwrap();
    assert_eq!(member["value"].as_str().unwrap(), user_id);
}

#[test]
fn mutual_references_fail_the_whole_request() {
    let endpoint = endpoint();
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Post, format!("{BASE}/Bulk")).with_json(&bulk_request(
            json!([
                {
                    "method": "POST",
                    "bulkId": "a",
                    "path": "/Groups",
                    "data": {"members": [{"value": "bulkId:b"}]}
                },
                {
                    "method": "POST",
                    "bulkId": "b",
                    "path": "/Groups",
                    "data": {"members": [{"value": "bulkId:a"}]}
                }
            ]),
        )),
    );
    assert_eq!(response.status, 400);
    // nothing was created
    let list = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Get, format!("{BASE}/Groups")),
    )
    .body
    .unwrap();
    assert_eq!(list["totalResults"], 0);
}

#[test]
fn dependent_operation_on_a_failed_create_gets_424() {
    let endpoint = endpoint();
    create_user(&endpoint, "chuck");
    let body = send_bulk(
        &endpoint,
        bulk_request(json!([
            {
                "method": "POST",
                "bulkId": "dup",
                "path": "/Users",
                "data": {
                    "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
                    "userName": "chuck"
                }
            },
            {
                "method": "POST",
                "bulkId": "group",
                "path": "/Groups",
                "data": {
                    "schemas": ["urn:ietf:params:scim:schemas:core:2.0:Group"],
                    "displayName": "Admins",
                    "members": [{"value": "bulkId:dup"}]
                }
            }
        ])),
    );
    let operations = body["Operations"].as_array().unwrap();
    assert_eq!(operations[0]["status"], 409);
    assert_eq!(operations[1]["status"], 424);
}

#[test]
fn fail_on_errors_stops_further_processing() {
    let endpoint = endpoint();
    let mut request = bulk_request(json!([
        {"method": "DELETE", "path": "/Users/missing-1"},
        {"method": "DELETE", "path": "/Users/missing-2"},
        {
            "method": "POST",
            "bulkId": "chuck",
            "path": "/Users",
            "data": {
                "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
                "userName": "chuck"
            }
        }
    ]));
    request["failOnErrors"] = json!(2);
    let body = send_bulk(&endpoint, request);
    let operations = body["Operations"].as_array().unwrap();
    assert_eq!(operations[0]["status"], 404);
    assert_eq!(operations[1]["status"], 404);
    assert_eq!(operations[2]["status"], 424);

    let list = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Get, format!("{BASE}/Users")),
    )
    .body
    .unwrap();
    assert_eq!(list["totalResults"], 0);
}

#[test]
fn too_many_operations_are_rejected_upfront() {
    let endpoint = endpoint();
    let operations: Vec<Value> = (0..16)
        .map(|index| {
            json!({
                "method": "DELETE",
                "path": format!("/Users/{index}")
            })
        })
        .collect();
    let response = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Post, format!("{BASE}/Bulk"))
            .with_json(&bulk_request(json!(operations))),
    );
    assert_eq!(response.status, 400);
    assert_eq!(response.body.unwrap()["scimType"], "tooMany");
}

#[test]
fn nested_bulk_requests_are_rejected() {
    let endpoint = endpoint();
    let body = send_bulk(
        &endpoint,
        bulk_request(json!([
            {
                "method": "POST",
                "bulkId": "inner",
                "path": "/Bulk",
                "data": {"schemas": [], "Operations": []}
            }
        ])),
    );
    let operations = body["Operations"].as_array().unwrap();
    assert_eq!(operations[0]["status"], 400);
}

#[test]
fn bulk_id_in_an_operation_path_waits_for_the_create() {
    let endpoint = endpoint();
    let body = send_bulk(
        &endpoint,
        bulk_request(json!([
            {
                "method": "PATCH",
                "path": "/Users/bulkId:chuck",
                "data": {
                    "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
                    "Operations": [
                        {"op": "replace", "path": "displayName", "value": "Chuck Norris"}
                    ]
                }
            },
            {
                "method": "POST",
                "bulkId": "chuck",
                "path": "/Users",
                "data": {
                    "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
                    "userName": "chuck"
                }
            }
        ])),
    );
    let operations = body["Operations"].as_array().unwrap();
    assert_eq!(operations[0]["status"], 200, "patch failed: {:?}", operations[0]);
    assert_eq!(operations[1]["status"], 201);

    let user_location = operations[1]["location"].as_str().unwrap();
    let user = send(&endpoint, ScimRequest::new(HttpMethod::Get, user_location))
        .body
        .unwrap();
    assert_eq!(user["displayName"], "Chuck Norris");
}

#[test]
fn bulk_id_in_a_path_without_a_created_resource_gets_424() {
    let endpoint = endpoint();
    let request = bulk_request(json!([
        {
            "method": "POST",
            "bulkId": "dup",
            "path": "/Users",
            "data": {
                "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
                "userName": "chuck"
            }
        },
        {
            "method": "DELETE",
            "path": "/Users/bulkId:dup"
        }
    ]));
    create_user(&endpoint, "chuck");
    let body = send_bulk(&endpoint, request);
    let operations = body["Operations"].as_array().unwrap();
    assert_eq!(operations[0]["status"], 409);
    assert_eq!(operations[1]["status"], 424);
}

#[test]
fn patch_inside_bulk_resolves_bulk_ids() {
    let endpoint = endpoint();
    let group = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Post, format!("{BASE}/Groups")).with_json(&json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:Group"],
            "displayName": "Admins"
        })),
    )
    .body
    .unwrap();
    let group_id = resource_id(&group);
    let body = send_bulk(
        &endpoint,
        bulk_request(json!([
            {
                "method": "PATCH",
                "path": format!("/Groups/{group_id}"),
                "data": {
                    "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
                    "Operations": [
                        {"op": "add", "path": "members", "value": [{"value": "bulkId:chuck"}]}
                    ]
                }
            },
            {
                "method": "POST",
                "bulkId": "chuck",
                "path": "/Users",
                "data": {
                    "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
                    "userName": "chuck"
                }
            }
        ])),
    );
    let operations = body["Operations"].as_array().unwrap();
    assert_eq!(operations[0]["status"], 200);
    let updated = send(
        &endpoint,
        ScimRequest::new(HttpMethod::Get, format!("{BASE}/Groups/{group_id}")),
    )
    .body
    .unwrap();
    let member_value = updated["members"][0]["value"].as_str().unwrap();
    assert!(!member_value.starts_with("bulkId:"));
}

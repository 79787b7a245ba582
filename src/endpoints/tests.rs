use super::list::{ListParams, sort_documents};
use super::projection::project;
use crate::document::Document;
use crate::filter::parse_path;
use crate::handler::SortOrder;
use crate::resource_type::ResourceType;
use crate::schema::{Schema, embedded};
use crate::service_provider::FilterConfig;
use serde_json::json;
use std::collections::HashMap;

fn user_type() -> ResourceType {
    ResourceType::from_document(
        serde_json::from_str(embedded::user_resource_type()).unwrap(),
        Schema::from_json(embedded::user_schema()).unwrap(),
        vec![Schema::from_json(embedded::enterprise_user_schema()).unwrap()],
    )
    .unwrap()
}

fn doc(value: serde_json::Value) -> Document {
    Document::from_value(value).unwrap()
}

#[test]
fn query_parameters_are_parsed_case_insensitively() {
    let query = HashMap::from([
        ("filter".to_string(), "userName pr".to_string()),
        ("startindex".to_string(), "5".to_string()),
        ("count".to_string(), "3".to_string()),
        ("sortby".to_string(), "userName".to_string()),
        ("sortorder".to_string(), "descending".to_string()),
        ("attributes".to_string(), "userName, emails.value".to_string()),
    ]);
    let params = ListParams::from_query(&query).unwrap();
    assert_eq!(params.filter.as_deref(), Some("userName pr"));
    assert_eq!(params.start_index, Some(5));
    assert_eq!(params.count, Some(3));
    assert_eq!(params.sort_order().unwrap(), SortOrder::Descending);
    assert_eq!(params.attributes, vec!["userName", "emails.value"]);
}

#[test]
fn malformed_count_is_rejected() {
    let query = HashMap::from([("count".to_string(), "three".to_string())]);
    assert!(ListParams::from_query(&query).is_err());
}

#[test]
fn search_request_body_is_parsed() {
    let params = ListParams::from_search_request(json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:SearchRequest"],
        "filter": "userName sw \"ch\"",
        "startIndex": 2,
        "count": 7,
        "sortBy": "userName",
        "attributes": ["userName"],
    }))
    .unwrap();
    assert_eq!(params.filter.as_deref(), Some("userName sw \"ch\""));
    assert_eq!(params.start_index, Some(2));
    assert_eq!(params.count, Some(7));
    assert_eq!(params.attributes, vec!["userName"]);
}

#[test]
fn search_request_without_its_schema_is_rejected() {
    assert!(ListParams::from_search_request(json!({"filter": "userName pr"})).is_err());
}

#[test]
fn pagination_is_clamped_to_the_provider_limits() {
    let config = FilterConfig {
        supported: true,
        max_results: 50,
    };
    let params = |start: Option<i64>, count: Option<i64>| ListParams {
        start_index: start,
        count,
        ..ListParams::default()
    };
    assert_eq!(params(None, None).pagination(&config), (1, 50));
    assert_eq!(params(Some(0), Some(-5)).pagination(&config), (1, 0));
    assert_eq!(params(Some(-3), Some(10)).pagination(&config), (1, 10));
    assert_eq!(params(Some(4), Some(500)).pagination(&config), (4, 50));
}

#[test]
fn sorting_is_case_insensitive_and_missing_values_sort_last() {
    let resource_type = user_type();
    let path = parse_path("userName", &resource_type.all_schemas()).unwrap();
    let mut documents = vec![
        doc(json!({"id": "1", "userName": "Walker"})),
        doc(json!({"id": "2"})),
        doc(json!({"id": "3", "userName": "chuck"})),
    ];
    sort_documents(&mut documents, &path, SortOrder::Ascending);
    let order: Vec<Option<&str>> = documents
        .iter()
        .map(|document| document.get_str("userName").unwrap())
        .collect();
    assert_eq!(order, vec![Some("chuck"), Some("Walker"), None]);

    sort_documents(&mut documents, &path, SortOrder::Descending);
    let order: Vec<Option<&str>> = documents
        .iter()
        .map(|document| document.get_str("userName").unwrap())
        .collect();
    assert_eq!(order, vec![Some("Walker"), Some("chuck"), None]);
}

#[test]
fn attributes_and_excluded_attributes_are_mutually_exclusive() {
    let error = project(
        &user_type(),
        doc(json!({"id": "1"})),
        &["userName".to_string()],
        &["emails".to_string()],
    )
    .unwrap_err();
    assert_eq!(
        error.scim_type().map(|t| t.as_str()),
        Some("invalidParameters")
    );
}

#[test]
fn never_returned_attributes_are_always_stripped() {
    let projected = project(
        &user_type(),
        doc(json!({"id": "1", "userName": "chuck", "password": "secret"})),
        &[],
        &[],
    )
    .unwrap();
    assert!(projected.get_ignore_case("password").is_none());
    assert!(projected.get_ignore_case("userName").is_some());
}

#[test]
fn attributes_parameter_reduces_to_requested_plus_always() {
    let projected = project(
        &user_type(),
        doc(json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
            "id": "1",
            "userName": "chuck",
            "displayName": "Chuck Norris",
        })),
        &["userName".to_string()],
        &[],
    )
    .unwrap();
    // id is returned always, schemas is structural
    assert!(projected.id().unwrap().is_some());
    assert!(!projected.schemas().unwrap().is_empty());
    assert!(projected.get_ignore_case("userName").is_some());
    assert!(projected.get_ignore_case("displayName").is_none());
}

#[test]
fn sub_attribute_selection_narrows_complex_values() {
    let projected = project(
        &user_type(),
        doc(json!({
            "id": "1",
            "emails": [
                {"value": "chuck@example.com", "type": "work", "primary": true}
            ]
        })),
        &["emails.value".to_string()],
        &[],
    )
    .unwrap();
    let emails = projected.get_array("emails").unwrap().unwrap();
    assert_eq!(emails[0], json!({"value": "chuck@example.com"}));
}

#[test]
fn excluded_attributes_remove_default_attributes() {
    let projected = project(
        &user_type(),
        doc(json!({
            "id": "1",
            "userName": "chuck",
            "emails": [{"value": "chuck@example.com"}]
        })),
        &[],
        &["emails".to_string()],
    )
    .unwrap();
    assert!(projected.get_ignore_case("emails").is_none());
    assert!(projected.get_ignore_case("userName").is_some());
}

#[test]
fn unknown_attribute_parameter_is_invalid() {
    let error = project(
        &user_type(),
        doc(json!({"id": "1"})),
        &["shoeSize".to_string()],
        &[],
    )
    .unwrap_err();
    assert_eq!(
        error.scim_type().map(|t| t.as_str()),
        Some("invalidParameters")
    );
}

#[test]
fn extension_attributes_can_be_selected() {
    const URI: &str = "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";
    let projected = project(
        &user_type(),
        doc(json!({
            "id": "1",
            "userName": "chuck",
            URI: {"employeeNumber": "42", "costCenter": "4130"}
        })),
        &[format!("{URI}:employeeNumber")],
        &[],
    )
    .unwrap();
    let container = projected.get_object(URI).unwrap().unwrap();
    assert!(container.contains_key("employeeNumber"));
    assert!(!container.contains_key("costCenter"));
    assert!(projected.get_ignore_case("userName").is_none());
}

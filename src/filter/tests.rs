use super::*;
use crate::document::Document;
use crate::error::{ScimError, ScimType};
use crate::schema::{Schema, embedded};
use serde_json::json;

fn user_schema() -> Schema {
    Schema::from_json(embedded::user_schema()).unwrap()
}

fn enterprise_schema() -> Schema {
    Schema::from_json(embedded::enterprise_user_schema()).unwrap()
}

fn group_schema() -> Schema {
    Schema::from_json(embedded::group_schema()).unwrap()
}

fn parse_user(filter: &str) -> Result<FilterNode, ScimError> {
    let schema = user_schema();
    parse_filter(filter, &[&schema])
}

fn user_doc() -> Document {
    Document::from_value(json!({
        "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
        "id": "1",
        "userName": "chuck",
        "displayName": "Chuck Norris",
        "active": true,
        "emails": [
            {"value": "chuck@example.com", "type": "work", "primary": true},
            {"value": "norris@example.org", "type": "home"}
        ],
        "meta": {"created": "2020-05-01T12:00:00Z"}
    }))
    .unwrap()
}

fn matches(filter: &str, doc: &Document) -> bool {
    let node = parse_user(filter).unwrap();
    evaluate(&node, doc).unwrap()
}

#[test]
fn eq_round_trip() {
    let doc = user_doc();
    assert!(matches(r#"userName eq "chuck""#, &doc));
    assert!(!matches(r#"userName eq "norris""#, &doc));
}

#[test]
fn comparator_tokens_are_case_insensitive() {
    let doc = user_doc();
    assert!(matches(r#"userName EQ "chuck""#, &doc));
    assert!(matches(r#"userName Sw "ch""#, &doc));
}

#[test]
fn username_is_not_case_exact() {
    let doc = user_doc();
    assert!(matches(r#"userName eq "CHUCK""#, &doc));
}

#[test]
fn id_is_case_exact() {
    let schema = user_schema();
    let node = parse_filter(r#"id eq "ABC""#, &[&schema]).unwrap();
    let doc = Document::from_value(json!({"id": "abc"})).unwrap();
    assert!(!evaluate(&node, &doc).unwrap());
}

#[test]
fn and_or_not_combinators() {
    let doc = user_doc();
    assert!(matches(r#"userName eq "chuck" and active eq true"#, &doc));
    assert!(matches(r#"userName eq "nope" or active eq true"#, &doc));
    assert!(matches(r#"not (userName eq "nope")"#, &doc));
    assert!(!matches(
        r#"userName eq "chuck" and not (active eq true)"#,
        &doc
    ));
}

#[test]
fn pr_requires_non_empty_value() {
    let doc = user_doc();
    assert!(matches("displayName pr", &doc));
    assert!(!matches("nickName pr", &doc));
    let empty = Document::from_value(json!({"nickName": "", "emails": []})).unwrap();
    let schema = user_schema();
    let node = parse_filter("nickName pr", &[&schema]).unwrap();
    assert!(!evaluate(&node, &empty).unwrap());
    let node = parse_filter("emails pr", &[&schema]).unwrap();
    assert!(!evaluate(&node, &empty).unwrap());
}

#[test]
fn multi_valued_matches_any_entry() {
    let doc = user_doc();
    assert!(matches(r#"emails.value ew "example.org""#, &doc));
    assert!(matches(r#"emails[type eq "work"].value sw "chuck""#, &doc));
    assert!(!matches(r#"emails[type eq "work"].value sw "norris""#, &doc));
}

#[test]
fn complex_leaf_compares_against_value_sub_attribute() {
    let doc = user_doc();
    assert!(matches(r#"emails eq "chuck@example.com""#, &doc));
}

#[test]
fn ordering_comparator_on_boolean_is_invalid_filter() {
    for filter in [
        "active gt true",
        "active lt false",
        "active ge true",
        "active le true",
    ] {
        let error = parse_user(filter).unwrap_err();
        assert_eq!(
            error.scim_type(),
            Some(ScimType::InvalidFilter),
            "{filter} should be rejected"
        );
    }
}

#[test]
fn substring_comparators_require_strings() {
    assert!(parse_user("active co true").is_err());
    assert!(parse_user("meta.created sw \"2020\"").is_err());
}

#[test]
fn datetime_ordering() {
    let doc = user_doc();
    assert!(matches(r#"meta.created gt "2020-01-01T00:00:00Z""#, &doc));
    assert!(!matches(r#"meta.created lt "2020-01-01T00:00:00Z""#, &doc));
}

#[test]
fn unknown_attribute_is_invalid_filter() {
    let error = parse_user(r#"shoeSize eq 47"#).unwrap_err();
    assert_eq!(error.scim_type(), Some(ScimType::InvalidFilter));
}

#[test]
fn garbage_surfaces_offending_substring() {
    let error = parse_user(r#"userName eqq "chuck""#).unwrap_err();
    assert!(error.to_string().contains("eqq"));
}

#[test]
fn uri_qualified_attribute_resolves_against_extension() {
    let user = user_schema();
    let enterprise = enterprise_schema();
    let node = parse_filter(
        r#"urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:employeeNumber eq "42""#,
        &[&user, &enterprise],
    )
    .unwrap();
    let doc = Document::from_value(json!({
        "userName": "chuck",
        "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User": {
            "employeeNumber": "42"
        }
    }))
    .unwrap();
    assert!(evaluate(&node, &doc).unwrap());
}

#[test]
fn ambiguous_short_name_lists_candidate_schemas() {
    // Both schemas define "displayName" when Group is registered as an
    // extension of a hypothetical type; simulate with two schemas that share
    // a short name.
    let user = user_schema();
    let group = group_schema();
    let error = parse_filter(r#"displayName eq "x""#, &[&user, &group]).unwrap_err();
    let message = error.to_string();
    assert!(message.contains("ambiguous"));
    assert!(message.contains("urn:ietf:params:scim:schemas:core:2.0:User"));
    assert!(message.contains("urn:ietf:params:scim:schemas:core:2.0:Group"));
}

#[test]
fn parse_path_resolves_bracket_filters() {
    let group = group_schema();
    let path = parse_path(r#"members[value eq "123"]"#, &[&group]).unwrap();
    assert_eq!(path.attribute_name, "members");
    assert!(path.value_filter.is_some());
    assert!(path.sub_attribute.is_none());

    let path = parse_path(r#"members[value eq "123"].display"#, &[&group]).unwrap();
    assert_eq!(path.sub_attribute.as_deref(), Some("display"));
}

#[test]
fn parse_path_reports_invalid_path() {
    let group = group_schema();
    let error = parse_path("members[", &[&group]).unwrap_err();
    assert_eq!(error.scim_type(), Some(ScimType::InvalidPath));
    let error = parse_path("unknownAttr", &[&group]).unwrap_err();
    assert_eq!(error.scim_type(), Some(ScimType::InvalidPath));
}

#[test]
fn value_filter_on_single_valued_attribute_is_rejected() {
    let error = parse_user(r#"name[givenName eq "x"] pr"#).unwrap_err();
    assert_eq!(error.scim_type(), Some(ScimType::InvalidFilter));
}

#[test]
fn filter_display_round_trips_through_parser() {
    let schema = user_schema();
    let node = parse_filter(
        r#"userName sw "ch" and (active eq true or nickName pr)"#,
        &[&schema],
    )
    .unwrap();
    let reparsed = parse_filter(&node.to_string(), &[&schema]).unwrap();
    assert_eq!(node, reparsed);
}

#[test]
fn ne_on_absent_attribute_is_true() {
    let doc = Document::from_value(json!({"userName": "chuck"})).unwrap();
    let schema = user_schema();
    let node = parse_filter(r#"nickName ne "x""#, &[&schema]).unwrap();
    assert!(evaluate(&node, &doc).unwrap());
}

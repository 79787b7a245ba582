use super::embedded;
use super::types::*;

fn user_schema() -> Schema {
    Schema::from_json(embedded::user_schema()).unwrap()
}

#[test]
fn embedded_schemas_parse() {
    assert_eq!(user_schema().name, "User");
    assert_eq!(
        Schema::from_json(embedded::group_schema()).unwrap().id,
        "urn:ietf:params:scim:schemas:core:2.0:Group"
    );
    assert_eq!(
        Schema::from_json(embedded::enterprise_user_schema())
            .unwrap()
            .name,
        "EnterpriseUser"
    );
}

#[test]
fn attribute_lookup_is_case_insensitive() {
    let schema = user_schema();
    let a = schema.attribute_by_name("userName").unwrap();
    let b = schema.attribute_by_name("USERNAME").unwrap();
    let c = schema.attribute_by_name("UserName").unwrap();
    assert!(std::ptr::eq(a, b));
    assert!(std::ptr::eq(b, c));
    assert_eq!(a.name, "userName");
}

#[test]
fn dotted_path_resolves_sub_attribute() {
    let schema = user_schema();
    let (sub, parent) = schema.attribute_by_path("name.givenName").unwrap();
    assert_eq!(sub.name, "givenName");
    assert_eq!(parent.unwrap().name, "name");
    assert!(schema.attribute_by_path("name.unknown").is_none());
}

#[test]
fn omitted_characteristics_use_rfc_defaults() {
    let schema = user_schema();
    let display_name = schema.attribute_by_name("displayName").unwrap();
    assert_eq!(display_name.mutability, Mutability::ReadWrite);
    assert_eq!(display_name.uniqueness, Uniqueness::None);
    assert_eq!(display_name.returned, Returned::Default);
    assert!(!display_name.case_exact);
}

#[test]
fn schema_without_id_is_rejected() {
    let result = Schema::new("  ", "Broken", "", vec![SchemaAttribute::default()]);
    assert!(matches!(
        result,
        Err(crate::error::ScimError::BadRequest { .. })
    ));
}

#[test]
fn schema_without_attributes_is_rejected() {
    let result = Schema::new("urn:example:schemas:Empty", "Empty", "", vec![]);
    assert!(result.is_err());
}

#[test]
fn duplicate_attribute_names_are_rejected_case_insensitively() {
    let attributes = vec![
        SchemaAttribute {
            name: "userName".to_string(),
            ..Default::default()
        },
        SchemaAttribute {
            name: "USERNAME".to_string(),
            ..Default::default()
        },
    ];
    let result = Schema::new("urn:example:schemas:Dup", "Dup", "", attributes);
    assert!(result.is_err());
}

#[test]
fn ordered_comparators_only_on_ordered_types() {
    assert!(AttributeType::String.is_ordered());
    assert!(AttributeType::Integer.is_ordered());
    assert!(AttributeType::DateTime.is_ordered());
    assert!(!AttributeType::Boolean.is_ordered());
    assert!(!AttributeType::Binary.is_ordered());
    assert!(!AttributeType::Complex.is_ordered());
}

#[test]
fn members_is_a_resource_reference_candidate() {
    let group = Schema::from_json(embedded::group_schema()).unwrap();
    assert!(group.attribute_by_name("members").unwrap().is_resource_reference());
    // groups on User is readOnly and therefore not a candidate
    let user = user_schema();
    assert!(!user.attribute_by_name("groups").unwrap().is_resource_reference());
}

#[test]
fn schema_serializes_back_to_document() {
    let schema = user_schema();
    let value = schema.to_value();
    assert_eq!(value["id"], "urn:ietf:params:scim:schemas:core:2.0:User");
    assert!(value["attributes"].as_array().unwrap().len() > 5);
}

//! Embedded core SCIM schema and resource-type documents.
//!
//! The standard User and Group schemas, the enterprise User extension and
//! the matching resource-type documents are embedded as static JSON strings
//! so that registration works without any external schema files. Custom
//! deployments pass their own documents to the registry instead.

/// The core User schema (RFC 7643 §4.1), trimmed to the attributes the
/// protocol engine and its tests exercise.
pub fn user_schema() -> &'static str {
    r#"{
  "id": "urn:ietf:params:scim:schemas:core:2.0:User",
  "name": "User",
  "description": "User Account",
  "attributes": [
    {
      "name": "id",
      "type": "string",
      "multiValued": false,
      "required": false,
      "caseExact": true,
      "mutability": "readOnly",
      "returned": "always",
      "uniqueness": "server"
    },
    {
      "name": "externalId",
      "type": "string",
      "multiValued": false,
      "required": false,
      "caseExact": true,
      "mutability": "readWrite",
      "returned": "default",
      "uniqueness": "none"
    },
    {
      "name": "meta",
      "type": "complex",
      "multiValued": false,
      "required": false,
      "mutability": "readOnly",
      "returned": "default",
      "subAttributes": [
        { "name": "resourceType", "type": "string", "mutability": "readOnly" },
        { "name": "created", "type": "dateTime", "mutability": "readOnly" },
        { "name": "lastModified", "type": "dateTime", "mutability": "readOnly" },
        { "name": "location", "type": "reference", "mutability": "readOnly" },
        { "name": "version", "type": "string", "mutability": "readOnly" }
      ]
    },
    {
      "name": "userName",
      "type": "string",
      "multiValued": false,
      "required": true,
      "caseExact": false,
      "mutability": "readWrite",
      "returned": "default",
      "uniqueness": "server"
    },
    {
      "name": "name",
      "type": "complex",
      "multiValued": false,
      "required": false,
      "mutability": "readWrite",
      "returned": "default",
      "subAttributes": [
        { "name": "formatted", "type": "string" },
        { "name": "familyName", "type": "string" },
        { "name": "givenName", "type": "string" },
        { "name": "middleName", "type": "string" },
        { "name": "honorificPrefix", "type": "string" },
        { "name": "honorificSuffix", "type": "string" }
      ]
    },
    {
      "name": "displayName",
      "type": "string",
      "multiValued": false,
      "required": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "nickName",
      "type": "string",
      "multiValued": false,
      "required": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "title",
      "type": "string",
      "multiValued": false,
      "required": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "userType",
      "type": "string",
      "multiValued": false,
      "required": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "active",
      "type": "boolean",
      "multiValued": false,
      "required": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "password",
      "type": "string",
      "multiValued": false,
      "required": false,
      "caseExact": true,
      "mutability": "writeOnly",
      "returned": "never"
    },
    {
      "name": "emails",
      "type": "complex",
      "multiValued": true,
      "required": false,
      "mutability": "readWrite",
      "returned": "default",
      "subAttributes": [
        { "name": "value", "type": "string" },
        { "name": "display", "type": "string" },
        {
          "name": "type",
          "type": "string",
          "canonicalValues": ["work", "home", "other"]
        },
        { "name": "primary", "type": "boolean" }
      ]
    },
    {
      "name": "phoneNumbers",
      "type": "complex",
      "multiValued": true,
      "required": false,
      "mutability": "readWrite",
      "returned": "default",
      "subAttributes": [
        { "name": "value", "type": "string" },
        { "name": "display", "type": "string" },
        {
          "name": "type",
          "type": "string",
          "canonicalValues": ["work", "home", "mobile", "fax", "pager", "other"]
        },
        { "name": "primary", "type": "boolean" }
      ]
    },
    {
      "name": "groups",
      "type": "complex",
      "multiValued": true,
      "required": false,
      "mutability": "readOnly",
      "returned": "default",
      "subAttributes": [
        { "name": "value", "type": "string", "mutability": "readOnly" },
        {
          "name": "$ref",
          "type": "reference",
          "referenceTypes": ["User", "Group"],
          "mutability": "readOnly"
        },
        { "name": "display", "type": "string", "mutability": "readOnly" },
        {
          "name": "type",
          "type": "string",
          "canonicalValues": ["direct", "indirect"],
          "mutability": "readOnly"
        }
      ]
    }
  ]
}"#
}

/// The enterprise User extension schema (RFC 7643 §4.3).
pub fn enterprise_user_schema() -> &'static str {
    r#"{
  "id": "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User",
  "name": "EnterpriseUser",
  "description": "Enterprise User",
  "attributes": [
    {
      "name": "employeeNumber",
      "type": "string",
      "multiValued": false,
      "required": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "costCenter",
      "type": "string",
      "multiValued": false,
      "required": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "organization",
      "type": "string",
      "multiValued": false,
      "required": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "division",
      "type": "string",
      "multiValued": false,
      "required": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "department",
      "type": "string",
      "multiValued": false,
      "required": false,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "manager",
      "type": "complex",
      "multiValued": false,
      "required": false,
      "mutability": "readWrite",
      "returned": "default",
      "subAttributes": [
        { "name": "value", "type": "string" },
        {
          "name": "$ref",
          "type": "reference",
          "referenceTypes": ["User"]
        },
        { "name": "displayName", "type": "string", "mutability": "readOnly" }
      ]
    }
  ]
}"#
}

/// The core Group schema (RFC 7643 §4.2).
pub fn group_schema() -> &'static str {
    r#"{
  "id": "urn:ietf:params:scim:schemas:core:2.0:Group",
  "name": "Group",
  "description": "Group",
  "attributes": [
    {
      "name": "id",
      "type": "string",
      "multiValued": false,
      "required": false,
      "caseExact": true,
      "mutability": "readOnly",
      "returned": "always",
      "uniqueness": "server"
    },
    {
      "name": "externalId",
      "type": "string",
      "multiValued": false,
      "required": false,
      "caseExact": true,
      "mutability": "readWrite",
      "returned": "default",
      "uniqueness": "none"
    },
    {
      "name": "meta",
      "type": "complex",
      "multiValued": false,
      "required": false,
      "mutability": "readOnly",
      "returned": "default",
      "subAttributes": [
        { "name": "resourceType", "type": "string", "mutability": "readOnly" },
        { "name": "created", "type": "dateTime", "mutability": "readOnly" },
        { "name": "lastModified", "type": "dateTime", "mutability": "readOnly" },
        { "name": "location", "type": "reference", "mutability": "readOnly" },
        { "name": "version", "type": "string", "mutability": "readOnly" }
      ]
    },
    {
      "name": "displayName",
      "type": "string",
      "multiValued": false,
      "required": true,
      "mutability": "readWrite",
      "returned": "default"
    },
    {
      "name": "members",
      "type": "complex",
      "multiValued": true,
      "required": false,
      "mutability": "readWrite",
      "returned": "default",
      "subAttributes": [
        { "name": "value", "type": "string", "mutability": "immutable" },
        {
          "name": "$ref",
          "type": "reference",
          "referenceTypes": ["User", "Group"],
          "mutability": "immutable"
        },
        {
          "name": "type",
          "type": "string",
          "canonicalValues": ["User", "Group"],
          "mutability": "immutable"
        },
        { "name": "display", "type": "string" }
      ]
    }
  ]
}"#
}

/// The resource-type document binding the User schema to `/Users` with the
/// enterprise extension attached as optional.
pub fn user_resource_type() -> &'static str {
    r#"{
  "schemas": ["urn:ietf:params:scim:schemas:core:2.0:ResourceType"],
  "id": "User",
  "name": "User",
  "description": "User Account",
  "endpoint": "/Users",
  "schema": "urn:ietf:params:scim:schemas:core:2.0:User",
  "schemaExtensions": [
    {
      "schema": "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User",
      "required": false
    }
  ]
}"#
}

/// The resource-type document binding the Group schema to `/Groups`.
pub fn group_resource_type() -> &'static str {
    r#"{
  "schemas": ["urn:ietf:params:scim:schemas:core:2.0:ResourceType"],
  "id": "Group",
  "name": "Group",
  "description": "Group",
  "endpoint": "/Groups",
  "schema": "urn:ietf:params:scim:schemas:core:2.0:Group"
}"#
}

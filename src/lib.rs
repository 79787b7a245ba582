//! SCIM 2.0 protocol engine for Rust.
//!
//! Implements the resource-side of RFC 7643/7644: schema-driven documents,
//! the filter language, PATCH, bulk processing with `bulkId` resolution,
//! ETag versioning and a transport-neutral endpoint dispatcher. Storage is
//! pluggable behind the [`ResourceHandler`] trait.
//!
//! # Core Components
//!
//! - [`ResourceEndpoint`] - dispatcher turning requests into responses
//! - [`ResourceHandler`] - trait for implementing storage backends
//! - [`ResourceType`] / [`Schema`] - the resource model
//!
//! # Quick Start
//!
//! ```rust
//! use scim_protocol::endpoints::{ResourceEndpoint, ScimRequest};
//! use scim_protocol::auth::AnonymousAuthorization;
//! use scim_protocol::resource_handlers::InMemoryUserHandler;
//! use scim_protocol::resource_type::{HttpMethod, ResourceType};
//! use scim_protocol::schema::{embedded, Schema};
//! use scim_protocol::service_provider::ServiceProviderConfig;
//! use std::sync::Arc;
//!
//! # fn example() -> scim_protocol::ScimResult<()> {
//! let mut endpoint = ResourceEndpoint::new(ServiceProviderConfig::default());
//! let user_type = ResourceType::from_document(
//!     serde_json::from_str(embedded::user_resource_type()).unwrap(),
//!     Schema::from_json(embedded::user_schema())?,
//!     vec![Schema::from_json(embedded::enterprise_user_schema())?],
//! )?;
//! endpoint.register(user_type, Arc::new(InMemoryUserHandler::new()))?;
//!
//! let request = ScimRequest::new(HttpMethod::Post, "/Users")
//!     .with_body(r#"{"schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
//!                    "userName": "chuck"}"#);
//! let response = endpoint.handle(&request, &AnonymousAuthorization::default());
//! assert_eq!(response.status, 201);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod auth;
pub mod bulk;
pub mod document;
pub mod endpoints;
pub mod error;
pub mod etag;
pub mod filter;
pub mod handler;
pub mod patch;
pub mod resource_handlers;
pub mod resource_type;
pub mod schema;
pub mod service_provider;

// Re-export commonly used types for convenience
pub use auth::{AnonymousAuthorization, Authorization, ClientAuthorization};
pub use document::{Document, Meta, MultiValuedEntry};
pub use endpoints::{ResourceEndpoint, ScimRequest, ScimResponse};
pub use error::{ScimError, ScimResult, ScimType};
pub use handler::{ListRequest, ListResult, ResourceHandler, SortOrder};
pub use resource_type::{HttpMethod, ResourceType, ResourceTypeRegistry};
pub use schema::{Schema, SchemaAttribute};
pub use service_provider::ServiceProviderConfig;

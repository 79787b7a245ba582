//! Resource types bind endpoints to schemas and carry the per-type
//! feature configuration. The registry holds every known type and the URI
//! resolver maps raw request URLs onto them.

mod registry;
mod types;
mod uri;

pub use registry::ResourceTypeRegistry;
pub use types::{
    EndpointControl, ResourceType, ResourceTypeAuthorization, ResourceTypeFeatures,
    SchemaExtension, SchemaExtensionRef,
};
pub use uri::{BULK_ENDPOINT, HttpMethod, SEARCH_SUFFIX, UriInfo, resolve};

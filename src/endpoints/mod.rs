//! The protocol endpoint layer: a transport-neutral dispatcher that turns
//! [`ScimRequest`]s into [`ScimResponse`]s by way of the registered
//! resource types and their storage handlers.

mod dispatch;
mod list;
mod projection;
mod request;
#[cfg(test)]
mod tests;

pub use dispatch::ResourceEndpoint;
pub use list::{LIST_RESPONSE_URI, ListParams, SEARCH_REQUEST_URI};
pub use projection::project;
pub use request::{
    CONTENT_TYPE_HEADER, ETAG_HEADER, LOCATION_HEADER, SCIM_CONTENT_TYPE, ScimRequest,
    ScimResponse,
};

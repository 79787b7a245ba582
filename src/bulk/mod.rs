//! Bulk operation processing (RFC 7644 §3.7): request validation,
//! `bulkId` dependency resolution and execution ordering. The endpoint
//! dispatcher drives the actual per-operation execution.

mod graph;
mod types;

pub use graph::{
    ResolvedResource, execution_order, path_reference, resolve_path, resolve_references,
};
pub use types::{
    BULK_ID_PREFIX, BULK_REQUEST_URI, BULK_RESPONSE_URI, BulkRequest, BulkRequestOperation,
    BulkResponse, BulkResponseOperation,
};

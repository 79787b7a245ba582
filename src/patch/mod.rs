//! Partial resource modification (RFC 7644 §3.5.2): add, replace and
//! remove operations with optional attribute paths and value filters.

mod apply;
mod types;

pub use apply::{PatchHandler, PatchOutcome};
pub use types::{PATCH_OP_URI, PatchOp, PatchOperation, PatchRequest};

//! The `ResourceHandler` collaborator trait.
//!
//! The protocol engine owns validation, filtering, sorting, projection and
//! ETag handling; actual storage lives behind this trait. Implementations
//! are registered per resource type and are responsible for their own
//! concurrency control.

use crate::auth::Authorization;
use crate::document::Document;
use crate::error::ScimResult;
use crate::filter::FilterNode;

/// Sort direction for list/search requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn from_param(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("ascending") {
            Some(SortOrder::Ascending)
        } else if raw.eq_ignore_ascii_case("descending") {
            Some(SortOrder::Descending)
        } else {
            None
        }
    }
}

/// Query parameters forwarded to `ResourceHandler::list`.
///
/// When the resource type enables auto-filtering/auto-sorting the handler
/// may ignore `filter`, `sort_by` and `sort_order` and return its full
/// result set; the dispatcher then applies them in memory.
#[derive(Debug, Clone, Default)]
pub struct ListRequest<'a> {
    pub start_index: usize,
    pub count: usize,
    pub filter: Option<&'a FilterNode>,
    pub sort_by: Option<&'a str>,
    pub sort_order: SortOrder,
    pub attributes: &'a [String],
    pub excluded_attributes: &'a [String],
}

/// The handler's answer to a list request.
#[derive(Debug, Clone, Default)]
pub struct ListResult {
    pub resources: Vec<Document>,
    /// Total matching resources, independent of pagination.
    pub total_results: usize,
}

impl ListResult {
    /// A full, unpaginated result set; the dispatcher derives
    /// `total_results` from the resource count.
    pub fn of(resources: Vec<Document>) -> Self {
        let total_results = resources.len();
        Self {
            resources,
            total_results,
        }
    }
}

/// Storage contract implemented externally per resource type.
pub trait ResourceHandler: Send + Sync {
    /// Store a new resource and return it with its server-assigned id.
    fn create(&self, resource: Document, auth: &dyn Authorization) -> ScimResult<Document>;

    /// Fetch a resource by id; `Ok(None)` when it does not exist.
    fn get(
        &self,
        id: &str,
        attributes: &[String],
        excluded_attributes: &[String],
        auth: &dyn Authorization,
    ) -> ScimResult<Option<Document>>;

    /// List resources. Handlers with auto-filtering/sorting enabled on their
    /// resource type may return everything and let the dispatcher narrow it.
    fn list(&self, request: &ListRequest<'_>, auth: &dyn Authorization) -> ScimResult<ListResult>;

    /// Replace the stored resource (the id is already set on the document).
    fn update(&self, resource: Document, auth: &dyn Authorization) -> ScimResult<Document>;

    /// Remove a resource by id.
    fn delete(&self, id: &str, auth: &dyn Authorization) -> ScimResult<()>;
}

//! Authorization collaborator contract.
//!
//! The engine only performs the role-check part of authorization: a request
//! passes when the intersection of the resource type's required roles and
//! the authenticated client's roles is non-empty. How the client was
//! authenticated is the transport layer's concern.

use std::collections::BTreeSet;
use std::collections::HashMap;

/// Authentication/authorization details of the requesting client.
pub trait Authorization: Send + Sync {
    /// Identifier of the authenticated client, for logging.
    fn client_id(&self) -> &str;

    /// The roles granted to the client.
    fn client_roles(&self) -> &BTreeSet<String>;

    /// Authenticate the request from its headers and query parameters.
    /// The default accepts everything; deployments override this.
    fn authenticate(
        &self,
        _headers: &HashMap<String, String>,
        _query: &HashMap<String, String>,
    ) -> bool {
        true
    }
}

/// Authorization context that grants everything. Useful for tests and for
/// deployments that do authentication entirely in the transport layer.
#[derive(Debug, Clone, Default)]
pub struct AnonymousAuthorization {
    roles: BTreeSet<String>,
}

impl Authorization for AnonymousAuthorization {
    fn client_id(&self) -> &str {
        "anonymous"
    }

    fn client_roles(&self) -> &BTreeSet<String> {
        &self.roles
    }
}

/// A static client identity with a fixed role set.
#[derive(Debug, Clone)]
pub struct ClientAuthorization {
    client_id: String,
    roles: BTreeSet<String>,
}

impl ClientAuthorization {
    pub fn new(
        client_id: impl Into<String>,
        roles: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

impl Authorization for ClientAuthorization {
    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn client_roles(&self) -> &BTreeSet<String> {
        &self.roles
    }
}

//! Authenticated user principal.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use janus_backend::UserRecord;

/// The identity produced by a successful handshake.
///
/// Immutable once constructed; the attribute map is empty-but-present when
/// the backend supplies none.
#[derive(Debug, Clone)]
pub struct UserPrincipal {
    name: String,
    attributes: Map<String, Value>,
    authorities: BTreeSet<String>,
}

impl UserPrincipal {
    /// Builds a principal from the backend's user record and locally
    /// granted authorities.
    pub fn from_record(record: UserRecord, authorities: BTreeSet<String>) -> Self {
        Self {
            name: record.user_id,
            attributes: record.attributes,
            authorities,
        }
    }

    /// Login name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backend-supplied attributes (read-only).
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Granted authorities (read-only).
    pub fn authorities(&self) -> &BTreeSet<String> {
        &self.authorities
    }
}

//! Backend user payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User record returned by the backend after a validated session.
///
/// `attributes` is empty-but-present when the backend supplies none; the
/// serialized field names follow the backend's wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Backend user identifier.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Backend-supplied user attributes.
    #[serde(rename = "userAttribute", default)]
    pub attributes: Map<String, Value>,
    /// Opaque per-session token, when the backend issues one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl UserRecord {
    /// Creates a record with no attributes and no token.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            attributes: Map::new(),
            token: None,
        }
    }
}

//! Service records.

use serde::{Deserialize, Serialize};

/// Collection path for service records.
///
/// Item paths are formed by appending the identifier directly, with no
/// separator: `api/servicesweb`.
pub const SERVICES_URI: &str = "api/services";

/// A named service and its access-control string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Unique identifier, also used as the path segment.
    pub id: String,
    /// Opaque access-control string, passed through verbatim.
    pub acl: String,
}

impl Service {
    /// Create a service record.
    pub fn new(id: impl Into<String>, acl: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            acl: acl.into(),
        }
    }

    /// Path of the item resource for `id`.
    pub(crate) fn item_path(id: &str) -> String {
        format!("{}{}", SERVICES_URI, id)
    }
}

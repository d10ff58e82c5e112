//! Shared entity types for the Trellis control plane.
//!
//! Wire structs live here, apart from the per-resource API logic in
//! `trellis-resources`, so that the server boundary and the adapters can
//! speak the same types without pulling in SQL or validation code.

use serde::Serialize;

pub mod cachegroup;
pub mod delivery_service;

pub use cachegroup::CacheGroup;
pub use delivery_service::DeliveryService;

/// Stable key fields of a resource, used for routing decisions and logging.
///
/// Identity is independent of mutable attributes: once `id` is assigned by
/// the store it never changes for the lifetime of the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Registry key of the resource type, e.g. `"cachegroup"`.
    pub kind: &'static str,
    /// Generated primary key; `None` until the row exists.
    pub id: Option<i64>,
    /// Human-readable name for audit lines, when the entity carries one.
    pub name: Option<String>,
}

impl Identity {
    pub fn new(kind: &'static str, id: Option<i64>, name: Option<String>) -> Self {
        Self { kind, id, name }
    }

    /// Whether the entity addresses an existing row.
    pub fn has_key(&self) -> bool {
        self.id.is_some()
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.id, &self.name) {
            (Some(id), Some(name)) => write!(f, "{} {} ({})", self.kind, id, name),
            (Some(id), None) => write!(f, "{} {}", self.kind, id),
            (None, Some(name)) => write!(f, "{} ({})", self.kind, name),
            (None, None) => write!(f, "{} (unassigned)", self.kind),
        }
    }
}

//! Cache group wire type.
//!
//! Every field is optional so that "not set" and "set to the zero value"
//! stay distinguishable through JSON decoding and validation. The
//! `parentName` / `secondaryParentName` fields are denormalized from the
//! parent rows and populated only on read; they are never written back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Resolved name of the parent cache group. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_cachegroup_id: Option<i64>,
    /// Resolved name of the secondary parent cache group. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_parent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_parent_cachegroup_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_to_closest: Option<bool>,
    /// Resolved name of the group's type. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

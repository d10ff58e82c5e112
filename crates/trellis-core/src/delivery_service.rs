//! Delivery service wire type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryService {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Unique key used in generated cache configuration. Lowercase
    /// alphanumeric with interior dashes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// DSCP marking applied to delivered traffic, 0..=63.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dscp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn_id: Option<i64>,
    /// Resolved name of the CDN. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

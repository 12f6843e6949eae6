//! Outage, device and site records

use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

// ============================================================================
// Outage
// ============================================================================

/// A period during which a device was unavailable
///
/// `id` is the id of the device the outage happened on, not an id of the
/// outage itself; one device usually has several outages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outage {
    pub id: String,
    pub begin: Timestamp,
    pub end: Timestamp,
}

impl Outage {
    pub fn new(id: impl Into<String>, begin: Timestamp, end: Timestamp) -> Self {
        Self {
            id: id.into(),
            begin,
            end,
        }
    }
}

// ============================================================================
// Site inventory
// ============================================================================

/// A device installed at a site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
}

impl Device {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Device inventory of one site
///
/// Device ids are not guaranteed to be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub devices: Vec<Device>,
}

// ============================================================================
// Enriched outage
// ============================================================================

/// An outage with the display name of its device attached
///
/// Serializes as the outage's own fields plus `name`; `name` is left out of
/// the JSON entirely when no device matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutageWithDeviceName {
    #[serde(flatten)]
    pub outage: Outage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl OutageWithDeviceName {
    pub fn new(outage: Outage, name: Option<String>) -> Self {
        Self { outage, name }
    }
}

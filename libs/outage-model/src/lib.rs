//! Outage Model Library
//!
//! Wire types exchanged with the outage API. Records are request-scoped: they
//! are decoded from a response, filtered and enriched in memory, and written
//! back out in the submission body.
//!
//! # Modules
//!
//! - `timestamp`: ISO-8601 instants that remember the exact text they came from
//! - `types`: outages, devices and site inventories

pub mod timestamp;
pub mod types;

// Re-exports for convenience
pub use timestamp::Timestamp;
pub use types::{Device, Outage, OutageWithDeviceName, SiteInfo};

//! Outage pipeline
//!
//! Fetches the outage list and a site's device inventory concurrently, keeps
//! the outages that match the site's devices and start on or after a given
//! instant, attaches device names and submits the result for the site.
//!
//! # Modules
//!
//! - `filter`: outage selection by start time and device
//! - `enrich`: device name join
//! - `pipeline`: the end-to-end workflow over an [`outage_client::OutageApi`]

pub mod enrich;
pub mod filter;
pub mod pipeline;

// Re-exports for convenience
pub use enrich::attach_device_name_to_outages;
pub use filter::{filter_outages, FilterCriteria};
pub use pipeline::{OutagePipeline, RunSummary};

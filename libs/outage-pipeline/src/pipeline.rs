//! End-to-end outage workflow

use crate::enrich::attach_device_name_to_outages;
use crate::filter::{filter_outages, FilterCriteria};
use errors::{OutageError, OutageResult};
use outage_client::OutageApi;
use outage_model::{Outage, SiteInfo, Timestamp};
use tracing::{debug, info, warn};

/// What a successful run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Outages returned by the API before filtering
    pub fetched: usize,
    /// Devices registered to the site
    pub devices: usize,
    /// Outages submitted for the site
    pub submitted: usize,
}

/// Fetch, filter, enrich and submit outages for one site
pub struct OutagePipeline<A> {
    api: A,
}

impl<A: OutageApi> OutagePipeline<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetch all outages, failing with `NotFound` when the API has none
    pub async fn fetch_outages(&self) -> OutageResult<Vec<Outage>> {
        match self.api.list_outages().await? {
            Some(outages) if !outages.is_empty() => Ok(outages),
            _ => Err(OutageError::not_found("Outages")),
        }
    }

    /// Fetch a site's device inventory, failing with `NotFound` when absent
    pub async fn fetch_site_info(&self, site_id: &str) -> OutageResult<SiteInfo> {
        self.api
            .get_site_info(site_id)
            .await?
            .ok_or_else(|| OutageError::not_found(format!("Site info for '{}'", site_id)))
    }

    /// Run the workflow for `site_id`, keeping outages that begin at or after `after`
    ///
    /// Both reads run concurrently; the first failure aborts the run and
    /// nothing is submitted. The filtered list is submitted even when empty.
    pub async fn run(&self, site_id: &str, after: Timestamp) -> OutageResult<RunSummary> {
        if site_id.trim().is_empty() {
            return Err(OutageError::invalid_input("Site id cannot be empty"));
        }

        info!(site_id, after = %after, "Creating site outages");

        let (outages, site_info) =
            tokio::try_join!(self.fetch_outages(), self.fetch_site_info(site_id))?;
        let fetched = outages.len();
        let devices = site_info.devices.len();
        debug!(site_id, fetched, devices, "Fetched outages and site info");

        let malformed = outages.iter().filter(|o| !o.begin.is_valid()).count();
        if malformed > 0 {
            warn!(site_id, malformed, "Outages with an unreadable begin date are skipped");
        }

        let criteria = FilterCriteria::new()
            .after(after)
            .devices(site_info.devices.clone());
        let filtered = filter_outages(&criteria, &outages);
        let enriched = attach_device_name_to_outages(&site_info.devices, &filtered);
        debug!(site_id, kept = enriched.len(), "Filtered outages");

        self.api.create_site_outages(site_id, &enriched).await?;

        let summary = RunSummary {
            fetched,
            devices,
            submitted: enriched.len(),
        };
        info!(
            site_id,
            fetched = summary.fetched,
            submitted = summary.submitted,
            "Site outages created"
        );
        Ok(summary)
    }
}

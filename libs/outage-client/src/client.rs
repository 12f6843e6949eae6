//! Outage API client

use crate::config::ClientConfig;
use crate::retry::RetryPolicy;
use crate::transport::{ApiRequest, HttpTransport, ReqwestTransport};
use async_trait::async_trait;
use bytes::Bytes;
use errors::{OutageError, OutageErrorTrait, OutageResult};
use outage_model::{Outage, OutageWithDeviceName, SiteInfo};
use serde_json::Value;
use tracing::{debug, error, info, warn, Level};

const OUTAGES_PATH: &str = "outages";
const SITE_INFO_PATH: &str = "site-info";
const SITE_OUTAGES_PATH: &str = "site-outages";

/// Operations the outage pipeline needs from the remote API
///
/// Absent results are `Ok(None)`, never errors; deciding whether absence is
/// acceptable is left to the caller.
#[async_trait]
pub trait OutageApi: Send + Sync {
    /// `GET /outages`
    async fn list_outages(&self) -> OutageResult<Option<Vec<Outage>>>;

    /// `GET /site-info/{site_id}`; an empty JSON object counts as absent
    async fn get_site_info(&self, site_id: &str) -> OutageResult<Option<SiteInfo>>;

    /// `POST /site-outages/{site_id}`
    async fn create_site_outages(
        &self,
        site_id: &str,
        outages: &[OutageWithDeviceName],
    ) -> OutageResult<()>;
}

/// Client for the outage API
///
/// Reads go through the configured [`RetryPolicy`]; the submission is
/// attempted once because repeating a POST could create duplicate records.
pub struct OutageClient<T = ReqwestTransport> {
    transport: T,
    retry: RetryPolicy,
}

impl OutageClient<ReqwestTransport> {
    /// Create a client talking HTTP to `config.base_url`
    pub fn new(config: &ClientConfig, api_key: &str) -> OutageResult<Self> {
        config.validate()?;
        if api_key.trim().is_empty() {
            return Err(OutageError::invalid_input("API key cannot be empty"));
        }

        let transport = ReqwestTransport::new(config, api_key)?;
        info!(
            base_url = %transport.base_url(),
            timeout_ms = config.timeout_ms,
            max_retries = config.retry.max_retries,
            "Outage client ready"
        );
        Ok(Self::with_transport(transport, config.retry.clone()))
    }
}

impl<T: HttpTransport> OutageClient<T> {
    /// Create a client over any transport
    pub fn with_transport(transport: T, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch every outage known to the API
    pub async fn list_outages(&self) -> OutageResult<Option<Vec<Outage>>> {
        let request = ApiRequest::get([OUTAGES_PATH]);
        let body = self.execute(&request, &self.retry).await?;

        if is_blank(&body) {
            debug!("Outage list response had no body");
            return Ok(None);
        }

        let outages: Option<Vec<Outage>> = decode(&request, &body)?;
        debug!(
            count = outages.as_ref().map_or(0, Vec::len),
            "Fetched outages"
        );
        Ok(outages)
    }

    /// Fetch the device inventory of one site
    pub async fn get_site_info(&self, site_id: &str) -> OutageResult<Option<SiteInfo>> {
        let request = ApiRequest::get([SITE_INFO_PATH, site_id]);
        let body = self.execute(&request, &self.retry).await?;

        if is_blank(&body) {
            debug!(site_id, "Site info response had no body");
            return Ok(None);
        }

        let value: Value = decode(&request, &body)?;
        let is_empty = match &value {
            Value::Null => true,
            Value::Object(fields) => fields.is_empty(),
            _ => false,
        };
        if is_empty {
            debug!(site_id, "Site info response was empty");
            return Ok(None);
        }

        let site_info: SiteInfo = serde_json::from_value(value).map_err(|e| OutageError::Decode {
            endpoint: request.path(),
            reason: e.to_string(),
        })?;
        debug!(site_id, devices = site_info.devices.len(), "Fetched site info");
        Ok(Some(site_info))
    }

    /// Submit enriched outages for a site
    pub async fn create_site_outages(
        &self,
        site_id: &str,
        outages: &[OutageWithDeviceName],
    ) -> OutageResult<()> {
        let request = ApiRequest::post([SITE_OUTAGES_PATH, site_id], serde_json::to_value(outages)?);
        self.execute(&request, &RetryPolicy::none()).await?;

        info!(site_id, count = outages.len(), "Submitted site outages");
        Ok(())
    }

    /// Send `request` under `policy`, turning non-2xx statuses into errors
    async fn execute(&self, request: &ApiRequest, policy: &RetryPolicy) -> OutageResult<Bytes> {
        let label = request.describe();
        let transport = &self.transport;

        let result = policy
            .execute(&label, move || async move {
                let response = transport.send(request).await?;
                if response.is_success() {
                    Ok(response.body)
                } else {
                    Err(OutageError::Status {
                        method: request.method.as_str(),
                        endpoint: request.path(),
                        status: response.status,
                    })
                }
            })
            .await;

        if let Err(e) = &result {
            log_failure(&label, e);
        }
        result
    }
}

fn log_failure(label: &str, e: &OutageError) {
    match e.log_level() {
        Level::ERROR => error!(request = label, code = e.error_code(), error = %e, "Request failed"),
        Level::WARN => warn!(request = label, code = e.error_code(), error = %e, "Request failed"),
        _ => info!(request = label, code = e.error_code(), error = %e, "Request failed"),
    }
}

fn is_blank(body: &Bytes) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

fn decode<D: serde::de::DeserializeOwned>(request: &ApiRequest, body: &Bytes) -> OutageResult<D> {
    serde_json::from_slice(body).map_err(|e| OutageError::Decode {
        endpoint: request.path(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl<T: HttpTransport> OutageApi for OutageClient<T> {
    async fn list_outages(&self) -> OutageResult<Option<Vec<Outage>>> {
        OutageClient::list_outages(self).await
    }

    async fn get_site_info(&self, site_id: &str) -> OutageResult<Option<SiteInfo>> {
        OutageClient::get_site_info(self, site_id).await
    }

    async fn create_site_outages(
        &self,
        site_id: &str,
        outages: &[OutageWithDeviceName],
    ) -> OutageResult<()> {
        OutageClient::create_site_outages(self, site_id, outages).await
    }
}

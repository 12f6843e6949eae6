//! HTTP transport seam
//!
//! [`HttpTransport`] performs exactly one HTTP exchange. Status handling,
//! decoding and retries live in [`crate::OutageClient`], which keeps them
//! testable against scripted transports.

use crate::config::{ClientConfig, API_KEY_HEADER};
use async_trait::async_trait;
use bytes::Bytes;
use errors::{OutageError, OutageResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

/// HTTP methods used by the outage API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// One outbound request, relative to the configured base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Unencoded path segments, e.g. `["site-info", "norwich-pear-tree"]`
    pub segments: Vec<String>,
    /// JSON body, sent for POST requests
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method: HttpMethod::Get,
            segments: segments.into_iter().map(Into::into).collect(),
            body: None,
        }
    }

    pub fn post<I, S>(segments: I, body: Value) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method: HttpMethod::Post,
            segments: segments.into_iter().map(Into::into).collect(),
            body: Some(body),
        }
    }

    /// Path for logs and error messages, e.g. `/site-info/norwich-pear-tree`
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// `GET /outages` style label
    pub fn describe(&self) -> String {
        format!("{} {}", self.method.as_str(), self.path())
    }
}

/// Raw response: status code and body bytes
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a single request
///
/// Implementations report a timed-out attempt as [`OutageError::Timeout`] and
/// an unreachable server as [`OutageError::Connection`]; non-2xx statuses are
/// returned as ordinary responses.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> OutageResult<ApiResponse>;
}

/// [`HttpTransport`] backed by a pooled `reqwest::Client`
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
}

impl ReqwestTransport {
    /// Create a transport with the configured timeout and the API key header
    pub fn new(config: &ClientConfig, api_key: &str) -> OutageResult<Self> {
        let base_url = Url::parse(config.base_url.trim()).map_err(|e| {
            OutageError::Configuration(format!("Invalid base_url '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(OutageError::Configuration(format!(
                "base_url '{}' cannot carry a path",
                config.base_url
            )));
        }

        let mut api_key_value = HeaderValue::from_str(api_key).map_err(|_| {
            OutageError::invalid_input("API key contains characters not allowed in an HTTP header")
        })?;
        api_key_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key_value);

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append the request's segments to the base URL, percent-encoding each
    fn url_for(&self, request: &ApiRequest) -> OutageResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                OutageError::Configuration(format!("base_url '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(&request.segments);
        Ok(url)
    }
}

/// Classify a reqwest failure so the retry policy can tell transient from terminal
fn map_send_error(endpoint: String, err: reqwest::Error) -> OutageError {
    if err.is_timeout() {
        OutageError::Timeout { endpoint }
    } else if err.is_connect() || err.is_request() || err.is_body() {
        OutageError::Connection {
            endpoint,
            reason: err.to_string(),
        }
    } else {
        OutageError::HttpClient(err)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> OutageResult<ApiResponse> {
        let url = self.url_for(request)?;
        debug!(request = %request.describe(), url = %url, "Sending request");

        let builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| map_send_error(request.path(), e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_send_error(request.path(), e))?;

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn transport(base_url: &str) -> ReqwestTransport {
        ReqwestTransport::new(&ClientConfig::default().with_base_url(base_url), "key").unwrap()
    }

    #[test]
    fn test_request_labels() {
        let request = ApiRequest::get(["site-info", "norwich-pear-tree"]);
        assert_eq!(request.path(), "/site-info/norwich-pear-tree");
        assert_eq!(request.describe(), "GET /site-info/norwich-pear-tree");
        assert!(request.body.is_none());
    }

    #[test]
    fn test_url_keeps_base_path() {
        let t = transport("https://api.example.com/interview-tests-mock-api/v1");
        let url = t.url_for(&ApiRequest::get(["outages"])).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/interview-tests-mock-api/v1/outages"
        );

        let t = transport("https://api.example.com/v1/");
        let url = t.url_for(&ApiRequest::get(["outages"])).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/outages");
    }

    #[test]
    fn test_url_encodes_segments() {
        let t = transport("http://localhost:8080");
        let url = t
            .url_for(&ApiRequest::get(["site-info", "north/east site"]))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/site-info/north%2Feast%20site");
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert!(matches!(
            ReqwestTransport::new(&ClientConfig::default().with_base_url("not a url"), "key"),
            Err(OutageError::Configuration(_))
        ));
        assert!(matches!(
            ReqwestTransport::new(&ClientConfig::default(), "bad\nkey"),
            Err(OutageError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_response_success_range() {
        assert!(ApiResponse::new(200, "[]").is_success());
        assert!(ApiResponse::new(204, Bytes::new()).is_success());
        assert!(!ApiResponse::new(404, Bytes::new()).is_success());
        assert!(!ApiResponse::new(500, Bytes::new()).is_success());
    }
}

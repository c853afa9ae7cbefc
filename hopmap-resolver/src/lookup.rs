use crate::error::{ResolveError, Result};
use crate::record::GeoPoint;
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use tracing::debug;

/// Default geolocation lookup service.
pub const DEFAULT_ENDPOINT: &str = "https://ipapi.co";

/// A capability that maps one address to geographic coordinates.
///
/// The sequential resolve fold is written against this trait so the network
/// can be swapped out in tests.
pub trait GeoLookup {
    fn lookup(&self, address: &str) -> impl Future<Output = Result<GeoPoint>> + Send;
}

/// Shape consumed from the lookup service response. Anything beyond the
/// coordinate pair and the error envelope is ignored.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

/// HTTP client for a per-address JSON lookup endpoint
/// (`GET {endpoint}/{address}/json/`). No API key, no rate-limit handling,
/// no retry.
pub struct IpApiClient {
    client: Client,
    endpoint: String,
}

impl IpApiClient {
    pub fn new() -> Self {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent("hopmap/0.1 (https://github.com/halvar-sec/hopmap)")
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(timeout_secs.div_ceil(2)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for IpApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoLookup for IpApiClient {
    async fn lookup(&self, address: &str) -> Result<GeoPoint> {
        let url = format!("{}/{}/json/", self.endpoint, address);
        debug!("Looking up {}", address);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::LookupFailed {
                address: address.to_string(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| ResolveError::ParseError(format!("{}: {}", address, e)))?;

        if body.error {
            return Err(ResolveError::LookupFailed {
                address: address.to_string(),
                reason: body.reason.unwrap_or_else(|| "unspecified".to_string()),
            });
        }

        Ok(GeoPoint {
            latitude: body.latitude,
            longitude: body.longitude,
            address: address.to_string(),
        })
    }
}

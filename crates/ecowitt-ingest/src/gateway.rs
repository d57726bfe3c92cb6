//! HTTP client for the gateway's `get_livedata_info` endpoint

use crate::{FetchError, FetchResult, TelemetrySource};
use reqwest::Client;
use serde_json::Value;
use tokio::time::{timeout, Duration};
use url::Url;

pub const LIVEDATA_PATH: &str = "get_livedata_info";

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

pub struct GatewayClient {
    client: Client,
    url: Url,
    fetch_timeout: Duration,
}

impl GatewayClient {
    /// `address` is what the user typed: `192.168.1.40`, `gw.local:8080`, or a full URL
    pub fn new(address: &str, fetch_timeout: Duration) -> FetchResult<Self> {
        let url = livedata_url(address)?;
        let client = Client::builder()
            .connect_timeout(fetch_timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self {
            client,
            url,
            fetch_timeout,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn request(&self) -> FetchResult<Value> {
        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(map_reqwest)?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }
        let body = resp.bytes().await.map_err(map_reqwest)?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl TelemetrySource for GatewayClient {
    fn name(&self) -> &str {
        "gateway-http"
    }

    async fn fetch(&mut self) -> FetchResult<Value> {
        timeout(self.fetch_timeout, self.request())
            .await
            .map_err(|_| FetchError::Timeout)?
    }
}

fn map_reqwest(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e.to_string())
    }
}

/// Build the live-data URL for a gateway address
pub fn livedata_url(address: &str) -> FetchResult<Url> {
    let address = address.trim();
    if address.is_empty() {
        return Err(FetchError::InvalidAddress("empty address".into()));
    }
    let base = if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{address}/")
    };
    let base = Url::parse(&base).map_err(|e| FetchError::InvalidAddress(format!("{address}: {e}")))?;
    if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
        return Err(FetchError::InvalidAddress(address.to_string()));
    }
    base.join(LIVEDATA_PATH)
        .map_err(|e| FetchError::InvalidAddress(format!("{address}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_livedata_url_forms() {
        assert_eq!(
            livedata_url("192.168.1.40").unwrap().as_str(),
            "http://192.168.1.40/get_livedata_info"
        );
        assert_eq!(
            livedata_url(" gw.local:8080 ").unwrap().as_str(),
            "http://gw.local:8080/get_livedata_info"
        );
        assert_eq!(
            livedata_url("http://10.0.0.2").unwrap().as_str(),
            "http://10.0.0.2/get_livedata_info"
        );
    }

    #[test]
    fn test_livedata_url_rejects_garbage() {
        assert!(matches!(livedata_url(""), Err(FetchError::InvalidAddress(_))));
        assert!(matches!(livedata_url("ftp://gw"), Err(FetchError::InvalidAddress(_))));
        assert!(matches!(livedata_url("http://"), Err(FetchError::InvalidAddress(_))));
    }

    #[test]
    fn test_client_keeps_url() {
        let client = GatewayClient::new("10.1.1.1", DEFAULT_FETCH_TIMEOUT).unwrap();
        assert_eq!(client.url().path(), "/get_livedata_info");
        assert_eq!(client.name(), "gateway-http");
    }
}

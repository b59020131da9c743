use async_trait::async_trait;
use log::debug;
use std::time::Duration;
use url::Url;

use crate::domain::{ResolveError, Result};
use crate::ports::HttpClientPort;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub struct ReqwestHttpClient {
    timeout: Duration,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientPort for ReqwestHttpClient {
    async fn get_text(&self, url: &Url) -> Result<String> {
        debug!("Attempting to download PAC file at {}", url);

        // The PAC location must be reachable without the proxies it describes
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ResolveError::FetchFailed(format!("HTTP client error: {}", e)))?;

        let response = client.get(url.as_str()).send().await.map_err(|e| {
            if e.is_timeout() {
                ResolveError::Timeout
            } else {
                ResolveError::FetchFailed(format!("{}: {}", url, e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::HttpStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ResolveError::FetchFailed(format!("PAC read error: {}", e)))?;

        debug!("Downloaded PAC file from {} ({} bytes)", url, body.len());
        Ok(body)
    }
}

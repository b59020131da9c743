use crate::domain::ProxyEndpoint;
use async_trait::async_trait;
use url::Url;

/// Port for reading a simple, non-scripted proxy from OS or environment settings
#[async_trait]
pub trait SystemProxyPort: Send + Sync {
    /// The proxy configured for `target_url`, if any.
    ///
    /// Blank or malformed addresses and bypassed hosts yield `None`.
    async fn system_proxy(&self, target_url: &Url) -> Option<ProxyEndpoint>;
}

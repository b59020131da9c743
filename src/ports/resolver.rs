use crate::domain::Resolution;
use async_trait::async_trait;
use url::Url;

/// Port for resolving which proxy to use for a given URL
#[async_trait]
pub trait ProxyResolverPort: Send + Sync {
    /// Resolve the proxy for `target_url`. Never fails: every failure is
    /// reported as `Resolution::NoProxy`.
    async fn resolve(&self, target_url: &Url) -> Resolution;
}

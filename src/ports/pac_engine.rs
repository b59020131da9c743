use crate::domain::Result;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

/// A loaded PAC script, ready to answer `FindProxyForURL` calls
#[async_trait]
pub trait PacEnginePort: Send + Sync {
    /// Call `FindProxyForURL(url, host)`.
    ///
    /// Returns `None` when the entry point returns something other than a string.
    async fn find_proxy(&self, target_url: &Url) -> Result<Option<String>>;

    /// False once the engine can no longer answer, for example after an
    /// evaluation overran its time limit. A dead engine is replaced.
    fn is_alive(&self) -> bool {
        true
    }
}

/// Port for building script environments from PAC source text
#[async_trait]
pub trait PacEngineLoaderPort: Send + Sync {
    /// Load the utility library and `pac_script`. Any script error fails the load.
    async fn load(&self, pac_script: String) -> Result<Arc<dyn PacEnginePort>>;
}

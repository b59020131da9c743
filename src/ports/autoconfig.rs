use async_trait::async_trait;

/// Port for reading the location of the proxy auto-config script
#[async_trait]
pub trait AutoConfigPort: Send + Sync {
    /// The configured autoconfig URL, unvalidated.
    async fn autoconfig_url(&self) -> Option<String>;
}

use crate::domain::Result;
use async_trait::async_trait;
use url::Url;

/// Port for downloading PAC scripts
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    /// GET `url` and return the body as text
    ///
    /// Any status outside 2xx is an error.
    async fn get_text(&self, url: &Url) -> Result<String>;
}

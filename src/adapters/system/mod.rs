mod bypass;
mod env;
mod gnome;
pub mod wininet;

use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

use crate::config::AppConfig;
use crate::domain::{Capabilities, ProxyEndpoint};
use crate::ports::{AutoConfigPort, SystemProxyPort};

pub use bypass::BypassList;
pub use env::EnvProxySource;
pub use gnome::GnomeProxySettings;
#[cfg(windows)]
pub use wininet::WinInetSettings;

/// A fixed autoconfig location, typically from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticAutoConfig {
    pac_url: Option<String>,
}

impl StaticAutoConfig {
    pub fn new(pac_url: Option<String>) -> Self {
        Self { pac_url }
    }
}

#[async_trait]
impl AutoConfigPort for StaticAutoConfig {
    async fn autoconfig_url(&self) -> Option<String> {
        self.pac_url.clone()
    }
}

/// Asks each source in order; the first configured proxy wins.
#[derive(Default)]
pub struct ChainedSystemProxy {
    sources: Vec<Arc<dyn SystemProxyPort>>,
}

impl ChainedSystemProxy {
    pub fn new(sources: Vec<Arc<dyn SystemProxyPort>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl SystemProxyPort for ChainedSystemProxy {
    async fn system_proxy(&self, target_url: &Url) -> Option<ProxyEndpoint> {
        for source in &self.sources {
            if let Some(endpoint) = source.system_proxy(target_url).await {
                return Some(endpoint);
            }
        }
        None
    }
}

/// OS collaborators for the running platform.
pub struct PlatformSources {
    pub system_proxy: Arc<dyn SystemProxyPort>,
    pub autoconfig: Arc<dyn AutoConfigPort>,
    pub capabilities: Capabilities,
}

impl PlatformSources {
    pub fn detect(config: &AppConfig) -> Self {
        let mut sources: Vec<Arc<dyn SystemProxyPort>> = Vec::new();
        if config.use_environment {
            sources.push(Arc::new(EnvProxySource::new()));
        }

        #[cfg(windows)]
        let platform_autoconfig: Arc<dyn AutoConfigPort> = {
            let settings = Arc::new(WinInetSettings::new());
            sources.push(settings.clone());
            settings
        };

        #[cfg(target_os = "linux")]
        let platform_autoconfig: Arc<dyn AutoConfigPort> = {
            let settings = Arc::new(GnomeProxySettings::new());
            sources.push(settings.clone());
            settings
        };

        #[cfg(not(any(windows, target_os = "linux")))]
        let platform_autoconfig: Arc<dyn AutoConfigPort> = Arc::new(StaticAutoConfig::default());

        let mut capabilities = Capabilities::current();
        let autoconfig = match config.pac_url.clone().filter(|v| !v.trim().is_empty()) {
            Some(pac_url) => {
                capabilities.auto_discovery = true;
                Arc::new(StaticAutoConfig::new(Some(pac_url))) as Arc<dyn AutoConfigPort>
            }
            None => platform_autoconfig,
        };

        Self {
            system_proxy: Arc::new(ChainedSystemProxy::new(sources)),
            autoconfig,
            capabilities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<ProxyEndpoint>);

    #[async_trait]
    impl SystemProxyPort for Fixed {
        async fn system_proxy(&self, _: &Url) -> Option<ProxyEndpoint> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_chain_returns_first_configured() {
        let chain = ChainedSystemProxy::new(vec![
            Arc::new(Fixed(None)),
            Arc::new(Fixed(Some(ProxyEndpoint::new("second", Some(2))))),
            Arc::new(Fixed(Some(ProxyEndpoint::new("third", Some(3))))),
        ]);

        let endpoint = chain.system_proxy(&"http://example.com/".parse().unwrap()).await;

        assert_eq!(endpoint, Some(ProxyEndpoint::new("second", Some(2))));
    }

    #[tokio::test]
    async fn test_pac_url_override_enables_discovery() {
        let config = AppConfig {
            pac_url: Some("http://wpad.example/wpad.dat".into()),
            use_environment: false,
            ..AppConfig::default()
        };

        let sources = PlatformSources::detect(&config);

        assert!(sources.capabilities.auto_discovery);
        assert_eq!(
            sources.autoconfig.autoconfig_url().await.as_deref(),
            Some("http://wpad.example/wpad.dat")
        );
    }
}

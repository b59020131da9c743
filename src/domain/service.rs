use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use super::{
    parse_directive, Capabilities, NoProxyReason, ProxyDecision, ProxyOrigin, Resolution, ResolveError, Result,
};
use crate::ports::{AutoConfigPort, HttpClientPort, PacEngineLoaderPort, PacEnginePort, ProxyResolverPort, SystemProxyPort};

/// Decides which proxy, if any, reaches a target URL.
///
/// A simple system proxy always wins. Otherwise the PAC script named by the
/// platform autoconfig setting is fetched once, loaded into a script
/// environment that is kept while it stays responsive, and asked about the
/// target.
pub struct ProxyResolver {
    system_proxy: Arc<dyn SystemProxyPort>,
    autoconfig: Arc<dyn AutoConfigPort>,
    http_client: Arc<dyn HttpClientPort>,
    engine_loader: Arc<dyn PacEngineLoaderPort>,
    capabilities: Capabilities,
    engine: Mutex<EngineSlot>,
}

#[derive(Default)]
struct EngineSlot {
    engine: Option<Arc<dyn PacEnginePort>>,
    /// A script whose load overran the time limit. Its loader thread may still
    /// be running, so the same text is never loaded again.
    timed_out_script: Option<String>,
}

impl ProxyResolver {
    pub fn new(
        system_proxy: Arc<dyn SystemProxyPort>,
        autoconfig: Arc<dyn AutoConfigPort>,
        http_client: Arc<dyn HttpClientPort>,
        engine_loader: Arc<dyn PacEngineLoaderPort>,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            system_proxy,
            autoconfig,
            http_client,
            engine_loader,
            capabilities,
            engine: Mutex::new(EngineSlot::default()),
        }
    }

    pub async fn resolve(&self, target_url: &Url) -> Resolution {
        if let Some(endpoint) = self.system_proxy.system_proxy(target_url).await {
            debug!("Using system proxy {} for {}", endpoint, target_url);
            return Resolution::Proxy {
                endpoint,
                origin: ProxyOrigin::System,
            };
        }

        if !self.capabilities.auto_discovery {
            debug!("Automatic proxy discovery is not supported on this platform");
            return Resolution::NoProxy(NoProxyReason::Unsupported);
        }

        match self.resolve_with_pac(target_url).await {
            Ok(resolution) => resolution,
            Err(ResolveError::NotConfigured) => {
                debug!("No autoconfig URL configured");
                Resolution::NoProxy(NoProxyReason::NotConfigured)
            }
            Err(e) => {
                warn!("Automatic proxy resolution for {} failed: {}", target_url, e);
                Resolution::NoProxy(NoProxyReason::Failed(e))
            }
        }
    }

    async fn resolve_with_pac(&self, target_url: &Url) -> Result<Resolution> {
        let engine = self.engine().await?;

        let directive = engine
            .find_proxy(target_url)
            .await?
            .ok_or_else(|| ResolveError::Unparseable("FindProxyForURL did not return a string".into()))?;
        debug!("FindProxyForURL({}) = {:?}", target_url, directive);

        match parse_directive(&directive)? {
            ProxyDecision::Direct => Ok(Resolution::NoProxy(NoProxyReason::Direct)),
            ProxyDecision::Proxy(endpoint) => Ok(Resolution::Proxy {
                endpoint,
                origin: ProxyOrigin::AutoConfig,
            }),
        }
    }

    /// The cached script environment, built on first use.
    ///
    /// Concurrent first callers wait for a single construction. A failed
    /// construction leaves the slot empty so the next call starts over, and an
    /// engine that stopped responding is dropped and built again.
    async fn engine(&self) -> Result<Arc<dyn PacEnginePort>> {
        let mut slot = self.engine.lock().await;
        if let Some(engine) = slot.engine.as_ref().filter(|engine| engine.is_alive()) {
            return Ok(engine.clone());
        }
        if slot.engine.take().is_some() {
            warn!("PAC engine stopped responding, loading the script again");
        }

        let engine = self.load_engine(&mut slot).await?;
        slot.engine = Some(engine.clone());
        Ok(engine)
    }

    async fn load_engine(&self, slot: &mut EngineSlot) -> Result<Arc<dyn PacEnginePort>> {
        let pac_location = self
            .autoconfig
            .autoconfig_url()
            .await
            .filter(|v| !v.trim().is_empty())
            .ok_or(ResolveError::NotConfigured)?;

        let pac_url = Url::parse(pac_location.trim())
            .map_err(|e| ResolveError::InvalidPacUrl(format!("{}: {}", pac_location, e)))?;

        let pac_script = self.http_client.get_text(&pac_url).await?;
        if pac_script.trim().is_empty() {
            return Err(ResolveError::EmptyScript);
        }

        if slot.timed_out_script.as_deref() == Some(pac_script.as_str()) {
            debug!("Not loading {} again, it timed out before", pac_url);
            return Err(ResolveError::Timeout);
        }

        match self.engine_loader.load(pac_script.clone()).await {
            Ok(engine) => {
                info!("Loaded PAC script from {}", pac_url);
                slot.timed_out_script = None;
                Ok(engine)
            }
            Err(ResolveError::Timeout) => {
                slot.timed_out_script = Some(pac_script);
                Err(ResolveError::Timeout)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl ProxyResolverPort for ProxyResolver {
    async fn resolve(&self, target_url: &Url) -> Resolution {
        ProxyResolver::resolve(self, target_url).await
    }
}

use async_trait::async_trait;
use log::debug;
use url::Url;

use super::bypass::BypassList;
use crate::domain::ProxyEndpoint;
use crate::ports::SystemProxyPort;

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// System proxy from the conventional `*_PROXY` environment variables.
pub struct EnvProxySource {
    lookup: Lookup,
}

impl EnvProxySource {
    pub fn new() -> Self {
        Self::with_lookup(|name| std::env::var(name).ok())
    }

    pub fn with_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Lowercase first, as curl does.
    fn var(&self, name: &str) -> Option<String> {
        (self.lookup)(&name.to_ascii_lowercase())
            .or_else(|| (self.lookup)(&name.to_ascii_uppercase()))
            .filter(|v| !v.trim().is_empty())
    }

    fn proxy_variables(scheme: &str) -> &'static [&'static str] {
        match scheme {
            "https" | "wss" => &["https_proxy", "all_proxy"],
            "http" | "ws" => &["http_proxy", "all_proxy"],
            _ => &["all_proxy"],
        }
    }
}

impl Default for EnvProxySource {
    fn default() -> Self {
        Self::new()
    }
}

/// Only HTTP proxies can be expressed as a `ProxyEndpoint`.
fn is_http_proxy(address: &str) -> bool {
    match address.split_once("://") {
        Some((scheme, _)) => scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https"),
        None => true,
    }
}

#[async_trait]
impl SystemProxyPort for EnvProxySource {
    async fn system_proxy(&self, target_url: &Url) -> Option<ProxyEndpoint> {
        let host = target_url.host_str()?;

        if let Some(no_proxy) = self.var("no_proxy") {
            if BypassList::parse(&no_proxy, &[',', ' ']).matches(host) {
                debug!("{} is excluded by NO_PROXY", host);
                return None;
            }
        }

        Self::proxy_variables(target_url.scheme())
            .iter()
            .filter_map(|name| self.var(name))
            .find(|address| is_http_proxy(address))
            .and_then(|address| ProxyEndpoint::from_address(&address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(vars: &[(&str, &str)]) -> EnvProxySource {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        EnvProxySource::with_lookup(move |name| vars.get(name).cloned())
    }

    fn url(value: &str) -> Url {
        value.parse().unwrap()
    }

    #[tokio::test]
    async fn test_proxy_by_scheme() {
        let env = source(&[("http_proxy", "http://plain:3128"), ("HTTPS_PROXY", "secure:8443")]);

        assert_eq!(
            env.system_proxy(&url("http://example.com/")).await,
            Some(ProxyEndpoint::new("plain", Some(3128)))
        );
        assert_eq!(
            env.system_proxy(&url("https://example.com/")).await,
            Some(ProxyEndpoint::new("secure", Some(8443)))
        );
    }

    #[tokio::test]
    async fn test_all_proxy_fallback() {
        let env = source(&[("ALL_PROXY", "fallback:8080")]);

        assert_eq!(
            env.system_proxy(&url("https://example.com/")).await,
            Some(ProxyEndpoint::new("fallback", Some(8080)))
        );
    }

    #[tokio::test]
    async fn test_no_proxy_excludes_host() {
        let env = source(&[("http_proxy", "plain:3128"), ("no_proxy", "localhost,.internal")]);

        assert_eq!(env.system_proxy(&url("http://wiki.internal/")).await, None);
        assert_eq!(env.system_proxy(&url("http://localhost:8000/")).await, None);
        assert!(env.system_proxy(&url("http://example.com/")).await.is_some());
    }

    #[tokio::test]
    async fn test_blank_and_socks_values_are_ignored() {
        let env = source(&[("http_proxy", "  "), ("all_proxy", "socks5://127.0.0.1:1080")]);

        assert_eq!(env.system_proxy(&url("http://example.com/")).await, None);
    }
}

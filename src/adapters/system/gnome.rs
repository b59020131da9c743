use async_trait::async_trait;
use log::debug;
use tokio::process::Command;
use url::Url;

use super::bypass::BypassList;
use crate::domain::ProxyEndpoint;
use crate::ports::{AutoConfigPort, SystemProxyPort};

const PROXY_SCHEMA: &str = "org.gnome.system.proxy";

/// GNOME proxy settings, read through `gsettings`.
///
/// Mode `manual` provides a system proxy, mode `auto` an autoconfig URL.
#[derive(Debug, Default)]
pub struct GnomeProxySettings;

impl GnomeProxySettings {
    pub fn new() -> Self {
        Self
    }

    async fn get(schema: &str, key: &str) -> Option<String> {
        let output = Command::new("gsettings")
            .args(["get", schema, key])
            .output()
            .await
            .map_err(|e| debug!("gsettings is not available: {}", e))
            .ok()?;

        if !output.status.success() {
            return None;
        }
        Some(parse_gsettings_value(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn mode() -> Option<String> {
        Self::get(PROXY_SCHEMA, "mode").await
    }
}

/// Strip the GVariant quoting around a string value: `'auto'` becomes `auto`.
pub fn parse_gsettings_value(raw: &str) -> String {
    let value = raw.trim();
    let value = value.strip_prefix("@as ").unwrap_or(value);
    value.trim_matches('\'').to_string()
}

#[async_trait]
impl SystemProxyPort for GnomeProxySettings {
    async fn system_proxy(&self, target_url: &Url) -> Option<ProxyEndpoint> {
        if Self::mode().await.as_deref() != Some("manual") {
            return None;
        }

        let host = target_url.host_str()?;
        if let Some(ignored) = Self::get(PROXY_SCHEMA, "ignore-hosts").await {
            if BypassList::parse(&ignored, &[',', '[', ']']).matches(host) {
                debug!("{} is excluded by ignore-hosts", host);
                return None;
            }
        }

        let schema = match target_url.scheme() {
            "https" => format!("{}.https", PROXY_SCHEMA),
            _ => format!("{}.http", PROXY_SCHEMA),
        };
        let proxy_host = Self::get(&schema, "host").await.filter(|h| !h.is_empty())?;
        let port = Self::get(&schema, "port")
            .await
            .and_then(|p| p.parse::<u16>().ok())
            .filter(|p| *p != 0);

        Some(ProxyEndpoint::new(proxy_host, port))
    }
}

#[async_trait]
impl AutoConfigPort for GnomeProxySettings {
    async fn autoconfig_url(&self) -> Option<String> {
        if Self::mode().await.as_deref() != Some("auto") {
            return None;
        }
        Self::get(PROXY_SCHEMA, "autoconfig-url").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quoted_string() {
        assert_eq!(parse_gsettings_value("'auto'\n"), "auto");
        assert_eq!(parse_gsettings_value("''\n"), "");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_gsettings_value("3128\n"), "3128");
    }

    #[test]
    fn test_parse_empty_array() {
        assert_eq!(parse_gsettings_value("@as []\n"), "[]");
    }
}

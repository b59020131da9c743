//! WinINet per-user proxy settings, as stored in
//! `HKCU\Software\Microsoft\Windows\CurrentVersion\Internet Settings`.

#[cfg(windows)]
pub use registry::WinInetSettings;

/// Pick the address for `scheme` out of a `ProxyServer` value.
///
/// The value is either one `host:port` used for every protocol or a list such
/// as `http=proxy:80;https=proxy:443;socks=proxy:1080`.
pub fn select_proxy_server(proxy_server: &str, scheme: &str) -> Option<String> {
    let proxy_server = proxy_server.trim();
    if proxy_server.is_empty() {
        return None;
    }

    if !proxy_server.contains('=') {
        return Some(proxy_server.to_string());
    }

    let wanted = if scheme.eq_ignore_ascii_case("https") { "https" } else { "http" };
    proxy_server
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(protocol, _)| protocol.trim().eq_ignore_ascii_case(wanted))
        .map(|(_, address)| address.trim().to_string())
        .filter(|address| !address.is_empty())
}

#[cfg(windows)]
mod registry {
    use async_trait::async_trait;
    use log::debug;
    use url::Url;
    use winreg::enums::HKEY_CURRENT_USER;
    use winreg::RegKey;

    use super::select_proxy_server;
    use crate::adapters::system::bypass::BypassList;
    use crate::domain::ProxyEndpoint;
    use crate::ports::{AutoConfigPort, SystemProxyPort};

    const INTERNET_SETTINGS: &str = "Software\\Microsoft\\Windows\\CurrentVersion\\Internet Settings";

    /// Reads the registry on every query so that changes apply immediately.
    #[derive(Debug, Default)]
    pub struct WinInetSettings;

    impl WinInetSettings {
        pub fn new() -> Self {
            Self
        }

        fn open() -> Option<RegKey> {
            RegKey::predef(HKEY_CURRENT_USER)
                .open_subkey(INTERNET_SETTINGS)
                .map_err(|e| debug!("Cannot open Internet Settings: {}", e))
                .ok()
        }
    }

    #[async_trait]
    impl SystemProxyPort for WinInetSettings {
        async fn system_proxy(&self, target_url: &Url) -> Option<ProxyEndpoint> {
            let settings = Self::open()?;

            let enabled: u32 = settings.get_value("ProxyEnable").unwrap_or(0);
            if enabled == 0 {
                return None;
            }

            let host = target_url.host_str()?;
            let overrides: String = settings.get_value("ProxyOverride").unwrap_or_default();
            if BypassList::parse(&overrides, &[';']).matches(host) {
                debug!("{} is excluded by ProxyOverride", host);
                return None;
            }

            let proxy_server: String = settings.get_value("ProxyServer").ok()?;
            select_proxy_server(&proxy_server, target_url.scheme())
                .and_then(|address| ProxyEndpoint::from_address(&address))
        }
    }

    #[async_trait]
    impl AutoConfigPort for WinInetSettings {
        async fn autoconfig_url(&self) -> Option<String> {
            let settings = Self::open()?;
            settings.get_value::<String, _>("AutoConfigURL").ok()
        }
    }
}

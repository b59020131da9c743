use std::fmt;
use url::Url;

use super::{ResolveError, Result};

/// Address of an HTTP proxy. A missing port means the scheme default applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    pub host: String,
    pub port: Option<u16>,
}

impl ProxyEndpoint {
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse a proxy address as found in OS settings or environment variables:
    /// `host`, `host:port` or `scheme://host[:port][/]`.
    ///
    /// Returns `None` for blank or malformed addresses, which callers treat as
    /// "not configured".
    pub fn from_address(address: &str) -> Option<Self> {
        let address = address.trim();
        if address.is_empty() {
            return None;
        }

        let has_scheme = address.contains("://");
        let url = if has_scheme {
            Url::parse(address).ok()?
        } else {
            Url::parse(&format!("http://{}", address)).ok()?
        };

        let host = url.host_str().filter(|h| !h.is_empty())?.to_string();
        let port = if has_scheme {
            url.port_or_known_default()
        } else {
            url.port()
        };

        Some(Self { host, port })
    }

    /// URL form understood by HTTP clients, e.g. `http://10.0.0.1:3128/`.
    pub fn proxy_url(&self) -> Result<Url> {
        Url::parse(&format!("http://{}", self))
            .map_err(|e| ResolveError::InvalidUri(format!("Invalid proxy endpoint {}: {}", self, e)))
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => write!(f, "{}", self.host),
        }
    }
}

/// Typed result of a PAC directive string.
///
/// Adding a variant requires updating `ProxyResolver::resolve_with_pac`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyDecision {
    Direct,
    Proxy(ProxyEndpoint),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyOrigin {
    System,
    AutoConfig,
}

impl fmt::Display for ProxyOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyOrigin::System => write!(f, "system"),
            ProxyOrigin::AutoConfig => write!(f, "autoconfig"),
        }
    }
}

/// Why no proxy was returned. Diagnostic only: every variant means the caller
/// connects without a proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoProxyReason {
    /// The PAC script asked for a direct connection.
    Direct,
    NotConfigured,
    Unsupported,
    Failed(ResolveError),
}

impl fmt::Display for NoProxyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoProxyReason::Direct => write!(f, "pac: direct"),
            NoProxyReason::NotConfigured => write!(f, "not configured"),
            NoProxyReason::Unsupported => write!(f, "auto-discovery unsupported on this platform"),
            NoProxyReason::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Proxy { endpoint: ProxyEndpoint, origin: ProxyOrigin },
    NoProxy(NoProxyReason),
}

impl Resolution {
    pub fn endpoint(&self) -> Option<&ProxyEndpoint> {
        match self {
            Resolution::Proxy { endpoint, .. } => Some(endpoint),
            Resolution::NoProxy(_) => None,
        }
    }

    pub fn is_no_proxy(&self) -> bool {
        matches!(self, Resolution::NoProxy(_))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Proxy { endpoint, origin } => write!(f, "PROXY {} (via {})", endpoint, origin),
            Resolution::NoProxy(reason) => write!(f, "DIRECT ({})", reason),
        }
    }
}

/// What the current platform lets the resolver do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub auto_discovery: bool,
}

impl Capabilities {
    /// Automatic discovery needs an OS store that publishes an autoconfig URL:
    /// the WinINet registry on Windows, GNOME settings on Linux.
    pub fn current() -> Self {
        Self {
            auto_discovery: cfg!(any(windows, target_os = "linux")),
        }
    }
}

use super::{ProxyDecision, ProxyEndpoint, ResolveError, Result};

/// Parse the string returned by `FindProxyForURL`.
///
/// Only the first directive of a list such as `"PROXY a:3128; PROXY b:3128; DIRECT"`
/// is considered. There is no reachability check of proxies, so the fallbacks
/// that follow are never tried.
pub fn parse_directive(directive: &str) -> Result<ProxyDecision> {
    let directive = directive.trim();
    if directive.is_empty() {
        return Err(ResolveError::Unparseable("empty directive".into()));
    }

    if directive.to_ascii_lowercase().starts_with("direct") {
        return Ok(ProxyDecision::Direct);
    }

    let first = directive
        .split(';')
        .map(str::trim)
        .find(|v| !v.is_empty())
        .ok_or_else(|| ResolveError::Unparseable(directive.to_string()))?;

    // "PROXY 127.0.0.1:8080": keyword and address, nothing else
    let parts: Vec<&str> = first.split_whitespace().collect();
    let (keyword, address) = match parts.as_slice() {
        [keyword, address] => (*keyword, *address),
        _ => return Err(ResolveError::Unparseable(first.to_string())),
    };

    if !keyword.eq_ignore_ascii_case("PROXY") && !keyword.eq_ignore_ascii_case("HTTP") {
        return Err(ResolveError::Unparseable(format!("unsupported keyword {}", keyword)));
    }

    let endpoint = match address.split(':').collect::<Vec<_>>().as_slice() {
        [host] => ProxyEndpoint::new(*host, None),
        [host, port] => {
            let port = port
                .parse::<u16>()
                .map_err(|e| ResolveError::Unparseable(format!("invalid port in {}: {}", address, e)))?;
            ProxyEndpoint::new(*host, Some(port))
        }
        _ => return Err(ResolveError::Unparseable(address.to_string())),
    };

    if endpoint.host.is_empty() {
        return Err(ResolveError::Unparseable(address.to_string()));
    }

    Ok(ProxyDecision::Proxy(endpoint))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy(host: &str, port: Option<u16>) -> ProxyDecision {
        ProxyDecision::Proxy(ProxyEndpoint::new(host, port))
    }

    #[test]
    fn test_direct_any_case() {
        for input in ["DIRECT", "direct", "  Direct  ", "DIRECT; PROXY a:1"] {
            assert_eq!(parse_directive(input).unwrap(), ProxyDecision::Direct, "{input}");
        }
    }

    #[test]
    fn test_proxy_with_port() {
        assert_eq!(
            parse_directive("PROXY 127.0.0.1:8080").unwrap(),
            proxy("127.0.0.1", Some(8080))
        );
    }

    #[test]
    fn test_proxy_without_port() {
        assert_eq!(parse_directive("PROXY proxy.corp").unwrap(), proxy("proxy.corp", None));
    }

    #[test]
    fn test_first_directive_wins() {
        assert_eq!(parse_directive("PROXY a:1; PROXY b:2").unwrap(), proxy("a", Some(1)));
        assert_eq!(parse_directive("PROXY a:1; DIRECT").unwrap(), proxy("a", Some(1)));
        assert_eq!(parse_directive(";;PROXY a:1").unwrap(), proxy("a", Some(1)));
    }

    #[test]
    fn test_keyword_case_insensitive() {
        assert_eq!(parse_directive("proxy a:1").unwrap(), proxy("a", Some(1)));
    }

    #[test]
    fn test_unparseable_inputs() {
        for input in ["", "   ", ";", "PROXY", "PROXY a:1 extra", "SOCKS a:1080", "PROXY a:1:2", "PROXY :8080"] {
            assert!(
                matches!(parse_directive(input), Err(ResolveError::Unparseable(_))),
                "{input:?} should be unparseable"
            );
        }
    }

    #[test]
    fn test_malformed_port_is_unparseable() {
        assert!(matches!(
            parse_directive("PROXY a:http"),
            Err(ResolveError::Unparseable(_))
        ));
        assert!(matches!(
            parse_directive("PROXY a:70000"),
            Err(ResolveError::Unparseable(_))
        ));
    }
}

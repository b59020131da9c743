use ipnet::IpNet;
use std::net::IpAddr;

/// Hosts that must be reached without the system proxy.
///
/// Understands the entries found in `NO_PROXY`, WinINet `ProxyOverride` and
/// GNOME `ignore-hosts`: `*`, `<local>`, CIDR blocks, `*` wildcards, leading-dot
/// domains and plain domains (which also cover their subdomains).
#[derive(Debug, Clone, Default)]
pub struct BypassList {
    entries: Vec<String>,
}

impl BypassList {
    pub fn parse(list: &str, separators: &[char]) -> Self {
        let entries = list
            .split(|c| separators.contains(&c))
            .map(|v| v.trim().trim_matches('\'').to_ascii_lowercase())
            .filter(|v| !v.is_empty())
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn matches(&self, host: &str) -> bool {
        let host = host.trim_start_matches('[').trim_end_matches(']').to_ascii_lowercase();
        let ip = host.parse::<IpAddr>().ok();
        self.entries.iter().any(|entry| entry_matches(entry, &host, ip))
    }
}

fn entry_matches(entry: &str, host: &str, ip: Option<IpAddr>) -> bool {
    if entry == "*" {
        return true;
    }
    if entry == "<local>" {
        return !host.contains('.') && ip.is_none();
    }
    if entry.contains('/') {
        return match (entry.parse::<IpNet>(), ip) {
            (Ok(net), Some(ip)) => net.contains(&ip),
            _ => false,
        };
    }
    if entry.contains('*') {
        return wildcard_match(entry, host);
    }

    let domain = entry.trim_start_matches('.');
    host == domain || (host.len() > domain.len() && host.ends_with(domain) && host[..host.len() - domain.len()].ends_with('.'))
}

/// Glob match where `*` stands for any run of characters.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let mut pieces = pattern.split('*');
    let first = pieces.next().unwrap_or_default();
    if !text.starts_with(first) {
        return false;
    }
    let mut rest = &text[first.len()..];

    let pieces: Vec<&str> = pieces.collect();
    let Some((last, middle)) = pieces.split_last() else {
        return rest.is_empty();
    };

    for piece in middle {
        match rest.find(piece) {
            Some(pos) => rest = &rest[pos + piece.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}

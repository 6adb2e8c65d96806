//! Host header parsing.

/// Lowercases a host and strips any port and trailing dot.
///
/// `Tenant1.Example.com:8080` becomes `tenant1.example.com`. Bracketed IPv6
/// literals keep their address and lose the port.
#[must_use]
pub fn normalize_host(raw: &str) -> String {
    let raw = raw.trim();
    let host = if let Some(rest) = raw.strip_prefix('[') {
        rest.split(']').next().unwrap_or(rest)
    } else {
        raw.split(':').next().unwrap_or(raw)
    };
    host.trim_end_matches('.').to_ascii_lowercase()
}

/// Returns the subdomain label of a host with at least three labels.
///
/// `tenant1.example.com` yields `tenant1`; `example.com` yields nothing.
#[must_use]
pub fn host_subdomain(host: &str) -> Option<&str> {
    let mut labels = host.split('.');
    let first = labels.next()?;
    if labels.count() < 2 || first.is_empty() {
        return None;
    }
    Some(first)
}

//! FQDN normalization.
//!
//! Every name that enters the system (zone names, record keys, query
//! names) is normalized to lowercase with a trailing dot so lookups are
//! a plain string match.

/// Normalize a domain name: lowercase, exactly one trailing dot.
pub fn normalize_fqdn(name: &str) -> String {
    let trimmed = name.trim_end_matches('.');
    let mut fqdn = trimmed.to_ascii_lowercase();
    fqdn.push('.');
    fqdn
}

/// True when `fqdn` falls under `zone` (both normalized). Matching is
/// label-aware: `web.notexample.com.` is not under `example.com.`.
pub fn in_zone(fqdn: &str, zone: &str) -> bool {
    fqdn == zone || fqdn.ends_with(&format!(".{zone}"))
}

//! The answer selector: a pure function of record snapshot, query
//! family and client address.
//!
//! Round-robin takes the current counter value and hands the next one
//! back so the caller can commit both together with the selection it
//! produced; random takes the RNG so tests can seed it.

use std::net::IpAddr;

use rand::seq::SliceRandom;
use rand::RngCore;

use gslb_domain::{LocationMap, SelectionMode};

use crate::ports::GeoLookup;
use crate::views::{BackendView, Family};

/// Geo context threaded through from the registry.
pub struct SelectorInputs<'a> {
    pub geo: Option<&'a dyn GeoLookup>,
    pub location_map: &'a LocationMap,
}

impl SelectorInputs<'_> {
    pub fn none(location_map: &LocationMap) -> SelectorInputs<'_> {
        SelectorInputs {
            geo: None,
            location_map,
        }
    }
}

/// Result of one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Addresses in answer order; empty when no healthy backend matched.
    pub addresses: Vec<IpAddr>,
    /// New round-robin counter value to commit, if the mode advanced it.
    pub next_rr_index: Option<usize>,
}

impl Selection {
    fn empty() -> Self {
        Self {
            addresses: Vec::new(),
            next_rr_index: None,
        }
    }

    fn of(addresses: Vec<IpAddr>) -> Self {
        Self {
            addresses,
            next_rr_index: None,
        }
    }
}

/// Pick the answer set for one query.
pub fn select(
    mode: SelectionMode,
    backends: &[BackendView],
    family: Family,
    client_ip: Option<IpAddr>,
    rr_index: usize,
    rng: &mut dyn RngCore,
    inputs: &SelectorInputs<'_>,
) -> Selection {
    // Common pre-filter: healthy and family-matching, config order kept.
    let candidates: Vec<&BackendView> = backends
        .iter()
        .filter(|b| b.is_healthy() && family.matches(b.address))
        .collect();

    if candidates.is_empty() {
        return Selection::empty();
    }

    match mode {
        SelectionMode::Failover => Selection::of(failover(&candidates)),
        SelectionMode::RoundRobin => {
            let picked = candidates[rr_index % candidates.len()];
            Selection {
                addresses: vec![picked.address],
                next_rr_index: Some((rr_index + 1) % candidates.len()),
            }
        }
        SelectionMode::Random => {
            let mut shuffled: Vec<IpAddr> = candidates.iter().map(|b| b.address).collect();
            shuffled.shuffle(rng);
            Selection::of(shuffled)
        }
        SelectionMode::GeoIp => Selection::of(geoip(&candidates, client_ip, inputs)),
    }
}

/// All candidates sharing the lowest priority, in config order.
fn failover(candidates: &[&BackendView]) -> Vec<IpAddr> {
    let mut sorted: Vec<&BackendView> = candidates.to_vec();
    sorted.sort_by_key(|b| b.priority);

    let min_priority = match sorted.first() {
        Some(b) => b.priority,
        None => return Vec::new(),
    };
    sorted
        .iter()
        .take_while(|b| b.priority == min_priority)
        .map(|b| b.address)
        .collect()
}

/// Country → city → ASN → custom map, one address per tier, first
/// non-empty tier wins; failover closes the chain.
fn geoip(
    candidates: &[&BackendView],
    client_ip: Option<IpAddr>,
    inputs: &SelectorInputs<'_>,
) -> Vec<IpAddr> {
    let Some(ip) = client_ip else {
        return failover(candidates);
    };

    if let Some(geo) = inputs.geo {
        if let Some(code) = geo.country_code(ip) {
            if let Some(hit) = candidates.iter().find(|b| b.countries.contains(&code)) {
                return vec![hit.address];
            }
        }
        if let Some(city) = geo.city_name(ip) {
            if let Some(hit) = candidates.iter().find(|b| b.cities.contains(&city)) {
                return vec![hit.address];
            }
        }
        if let Some(asn) = geo.asn(ip) {
            if let Some(hit) = candidates.iter().find(|b| b.asns.contains(&asn)) {
                return vec![hit.address];
            }
        }
    }

    if let Some(label) = inputs.location_map.lookup(ip) {
        if let Some(hit) = candidates
            .iter()
            .find(|b| b.locations.iter().any(|l| l == label))
        {
            return vec![hit.address];
        }
    }

    failover(candidates)
}

/// No-healthy fallback: every enabled backend of the right family,
/// regardless of `alive`. Trying a possibly-dead backend beats SERVFAIL.
pub fn all_enabled(backends: &[BackendView], family: Family) -> Vec<IpAddr> {
    backends
        .iter()
        .filter(|b| b.enabled && family.matches(b.address))
        .map(|b| b.address)
        .collect()
}

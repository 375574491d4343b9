use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use gslb_domain::ProbeParams;

/// Backend attributes a probe may need (script environments, Host
/// headers, default dial targets).
#[derive(Debug, Clone)]
pub struct ProbeTarget {
    pub fqdn: String,
    pub address: IpAddr,
    pub priority: i32,
    pub enable: bool,
}

/// One health-check instance bound to a backend.
///
/// `perform` runs up to `retries` additional attempts after the first
/// failure; the first success short-circuits. Each attempt is bounded by
/// the check's own timeout, and the caller additionally bounds the whole
/// call with the record's scrape timeout. A probe never panics through
/// this interface.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn perform(&self, target: &ProbeTarget, retries: u32) -> bool;

    /// Type label for logs and metrics (`icmp`, `tcp/443`, ...).
    fn kind(&self) -> String;

    /// The typed parameters this probe was built from. Probe identity is
    /// structural equality over these.
    fn params(&self) -> &ProbeParams;
}

/// Structural equality between a running probe list and freshly parsed
/// params, used by the reload diff.
pub fn probes_equal(running: &[Arc<dyn HealthProbe>], parsed: &[ProbeParams]) -> bool {
    running.len() == parsed.len()
        && running
            .iter()
            .zip(parsed.iter())
            .all(|(probe, params)| probe.params() == params)
}

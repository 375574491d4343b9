//! Read models the selector and the overview work on: immutable
//! snapshots taken from the live registry under its shared locks.

use std::net::IpAddr;
use std::time::SystemTime;

use gslb_domain::SelectionMode;

/// Address family of a query (A or AAAA).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    V4,
    V6,
}

impl Family {
    pub fn matches(&self, address: IpAddr) -> bool {
        match self {
            Family::V4 => address.is_ipv4(),
            Family::V6 => address.is_ipv6(),
        }
    }
}

/// Point-in-time snapshot of one backend.
#[derive(Debug, Clone)]
pub struct BackendView {
    pub address: IpAddr,
    pub priority: i32,
    pub alive: bool,
    pub enabled: bool,
    pub countries: Vec<String>,
    pub cities: Vec<String>,
    pub asns: Vec<u32>,
    pub locations: Vec<String>,
    pub last_healthcheck: Option<SystemTime>,
}

impl BackendView {
    pub fn is_healthy(&self) -> bool {
        self.alive && self.enabled
    }
}

/// Point-in-time snapshot of one record, backends in config order.
#[derive(Debug, Clone)]
pub struct RecordView {
    pub fqdn: String,
    pub zone: String,
    pub mode: SelectionMode,
    pub record_ttl: u32,
    pub backends: Vec<BackendView>,
}

impl RecordView {
    /// A record is healthy when at least one backend is.
    pub fn is_healthy(&self) -> bool {
        self.backends.iter().any(BackendView::is_healthy)
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::GslbError;

/// How a record picks its answers among healthy backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// All healthy backends sharing the lowest priority.
    Failover,
    /// One backend per query, rotating over the healthy set.
    RoundRobin,
    /// All healthy backends in shuffled order.
    Random,
    /// Country → city → ASN → custom subnet map, then failover.
    GeoIp,
}

impl Default for SelectionMode {
    fn default() -> Self {
        SelectionMode::Failover
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SelectionMode::Failover => "failover",
            SelectionMode::RoundRobin => "roundrobin",
            SelectionMode::Random => "random",
            SelectionMode::GeoIp => "geoip",
        };
        f.write_str(s)
    }
}

impl FromStr for SelectionMode {
    type Err = GslbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "failover" => Ok(SelectionMode::Failover),
            "roundrobin" => Ok(SelectionMode::RoundRobin),
            "random" => Ok(SelectionMode::Random),
            "geoip" => Ok(SelectionMode::GeoIp),
            other => Err(GslbError::UnsupportedMode(other.to_string())),
        }
    }
}

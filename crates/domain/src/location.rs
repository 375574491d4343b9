//! Custom location map: ordered CIDR → label pairs used by geoip mode as
//! a deterministic fallback when MaxMind lookups yield nothing useful.

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::errors::GslbError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubnetLocation {
    pub subnet: String,
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationMapConfig {
    #[serde(default)]
    pub subnets: Vec<SubnetLocation>,
}

/// Parsed form of the map, ready for longest-prefix lookups.
#[derive(Debug, Clone, Default)]
pub struct LocationMap {
    entries: Vec<(IpNetwork, String)>,
}

impl LocationMap {
    pub fn from_config(config: &LocationMapConfig) -> Result<Self, GslbError> {
        let mut entries = Vec::with_capacity(config.subnets.len());
        for pair in &config.subnets {
            let network: IpNetwork = pair
                .subnet
                .parse()
                .map_err(|_| GslbError::InvalidSubnet(pair.subnet.clone()))?;
            entries.push((network, pair.location.clone()));
        }
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Label of the longest prefix containing `ip`, if any.
    pub fn lookup(&self, ip: IpAddr) -> Option<&str> {
        let mut best: Option<(u8, &str)> = None;
        for (network, label) in &self.entries {
            if network.contains(ip) {
                let prefix = network.prefix();
                match best {
                    None => best = Some((prefix, label)),
                    Some((existing, _)) if prefix > existing => best = Some((prefix, label)),
                    _ => {}
                }
            }
        }
        best.map(|(_, label)| label)
    }
}

//! Zone-file model.
//!
//! One YAML document per zone: a table of named healthcheck profiles plus
//! a map of FQDN → record. Backend order inside a record is preserved; it
//! drives round-robin indexing and failover tie-breaking.

use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::duration::{parse_duration, parse_duration_or};
use crate::errors::GslbError;
use crate::probe::{HealthCheckSpec, ProbeParams};
use crate::selection_mode::SelectionMode;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Zone-scoped probe templates, referenced from backends by name.
    #[serde(default)]
    pub healthcheck_profiles: HashMap<String, HealthCheckSpec>,
    #[serde(default)]
    pub records: BTreeMap<String, RecordConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordConfig {
    pub mode: SelectionMode,
    pub owner: String,
    pub description: String,
    pub record_ttl: u32,
    pub scrape_interval: String,
    pub scrape_retries: u32,
    pub scrape_timeout: String,
    /// Record-local profiles; looked up before the zone table.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub healthcheck_profiles: HashMap<String, HealthCheckSpec>,
    pub backends: Vec<BackendConfig>,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            mode: SelectionMode::Failover,
            owner: String::new(),
            description: String::new(),
            record_ttl: 30,
            scrape_interval: "10s".to_string(),
            scrape_retries: 1,
            scrape_timeout: "5s".to_string(),
            healthcheck_profiles: HashMap::new(),
            backends: Vec::new(),
        }
    }
}

impl RecordConfig {
    pub fn scrape_interval(&self) -> Duration {
        parse_duration_or(&self.scrape_interval, Duration::from_secs(10))
    }

    pub fn scrape_timeout(&self) -> Duration {
        parse_duration_or(&self.scrape_timeout, Duration::from_secs(5))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub address: IpAddr,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_enable")]
    pub enable: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_backend_timeout")]
    pub timeout: String,
    #[serde(default)]
    pub healthchecks: Vec<HealthCheckEntry>,
    #[serde(default)]
    pub location_countries: Vec<String>,
    #[serde(default)]
    pub location_cities: Vec<String>,
    #[serde(default)]
    pub location_asns: Vec<u32>,
    #[serde(default)]
    pub locations_custom: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_enable() -> bool {
    true
}

fn default_backend_timeout() -> String {
    "5s".to_string()
}

impl BackendConfig {
    pub fn is_ipv4(&self) -> bool {
        self.address.is_ipv4()
    }

    /// First custom location label; the bulk API matches on this.
    pub fn location(&self) -> Option<&str> {
        self.locations_custom.first().map(String::as_str)
    }

    /// Resolve every healthcheck entry to typed params, looking profile
    /// references up record-locally first, then in the zone table.
    pub fn resolve_probes(
        &self,
        local_profiles: &HashMap<String, HealthCheckSpec>,
        zone_profiles: &HashMap<String, HealthCheckSpec>,
    ) -> Result<Vec<ProbeParams>, GslbError> {
        let mut resolved = Vec::with_capacity(self.healthchecks.len());
        for entry in &self.healthchecks {
            let spec = match entry {
                HealthCheckEntry::Inline(spec) => spec,
                HealthCheckEntry::Profile(name) => local_profiles
                    .get(name)
                    .or_else(|| zone_profiles.get(name))
                    .ok_or_else(|| GslbError::UnresolvedProfile(name.clone()))?,
            };
            let params = ProbeParams::from_spec(spec)?;
            params.validate()?;
            resolved.push(params);
        }
        Ok(resolved)
    }
}

/// A backend healthcheck is either a profile reference or inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HealthCheckEntry {
    Profile(String),
    Inline(HealthCheckSpec),
}

impl ZoneConfig {
    /// Full §-by-§ validation: durations parse, every profile reference
    /// resolves, every probe decodes. Mixed address families inside one
    /// record are allowed.
    pub fn validate(&self) -> Result<(), GslbError> {
        for (fqdn, record) in &self.records {
            parse_duration(&format!("{fqdn} scrape_interval"), &record.scrape_interval)?;
            parse_duration(&format!("{fqdn} scrape_timeout"), &record.scrape_timeout)?;
            for backend in &record.backends {
                parse_duration(&format!("{} timeout", backend.address), &backend.timeout)?;
                backend
                    .resolve_probes(&record.healthcheck_profiles, &self.healthcheck_profiles)?;
            }
        }
        Ok(())
    }
}

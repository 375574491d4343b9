use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ApiConfig, GeoIpConfig};
use crate::duration::{parse_duration, parse_duration_or};
use crate::errors::GslbError;
use crate::fqdn::normalize_fqdn;

/// Main daemon configuration (TOML file).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Zone name → zone file path. Required, non-empty.
    pub zones: BTreeMap<String, String>,

    pub dns_listen_addr: String,
    pub dns_listen_port: u16,

    /// Prefer the EDNS Client Subnet address over the transport peer.
    pub use_edns_csubnet: bool,

    /// Total window over which initial scheduler starts are spread.
    pub max_stagger_start: String,
    /// Records per startup batch.
    pub batch_size_start: usize,
    /// Idle time after which probing slows down.
    pub resolution_idle_timeout: String,
    /// Interval multiplier applied while a record is idle.
    pub healthcheck_idle_multiplier: u32,

    /// Suppress the TXT debugging records.
    pub disable_txt: bool,

    pub geoip: GeoIpConfig,
    pub api: ApiConfig,

    /// Optional Prometheus exporter bind address (`host:port`).
    pub metrics_listen_addr: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            zones: BTreeMap::new(),
            dns_listen_addr: "0.0.0.0".to_string(),
            dns_listen_port: 53,
            use_edns_csubnet: false,
            max_stagger_start: "60s".to_string(),
            batch_size_start: 100,
            resolution_idle_timeout: "3600s".to_string(),
            healthcheck_idle_multiplier: 10,
            disable_txt: false,
            geoip: GeoIpConfig::default(),
            api: ApiConfig::default(),
            metrics_listen_addr: None,
        }
    }
}

/// Settings the command line may override.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dns_listen_addr: Option<String>,
    pub dns_listen_port: Option<u16>,
    pub api_listen_port: Option<u16>,
}

impl Config {
    /// Load from a TOML file and apply CLI overrides. Validation is the
    /// caller's next step.
    pub fn load(path: &str, overrides: CliOverrides) -> Result<Self, GslbError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| GslbError::Io(format!("{path}: {e}")))?;
        let mut config = Self::from_toml(&raw)?;
        if let Some(addr) = overrides.dns_listen_addr {
            config.dns_listen_addr = addr;
        }
        if let Some(port) = overrides.dns_listen_port {
            config.dns_listen_port = port;
        }
        if let Some(port) = overrides.api_listen_port {
            config.api.listen_port = port;
        }
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, GslbError> {
        toml::from_str(raw).map_err(|e| GslbError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), GslbError> {
        if self.zones.is_empty() {
            return Err(GslbError::ConfigValidation(
                "zones table is required and must not be empty".to_string(),
            ));
        }
        if self.batch_size_start == 0 {
            return Err(GslbError::ConfigValidation(
                "batch_size_start must be greater than zero".to_string(),
            ));
        }
        if self.healthcheck_idle_multiplier < 1 {
            return Err(GslbError::ConfigValidation(
                "healthcheck_idle_multiplier must be at least 1".to_string(),
            ));
        }
        parse_duration("max_stagger_start", &self.max_stagger_start)?;
        parse_duration("resolution_idle_timeout", &self.resolution_idle_timeout)?;
        Ok(())
    }

    /// Zones with normalized names (lowercase, trailing dot).
    pub fn normalized_zones(&self) -> Vec<(String, String)> {
        self.zones
            .iter()
            .map(|(zone, path)| (normalize_fqdn(zone), path.clone()))
            .collect()
    }

    pub fn max_stagger_start(&self) -> Duration {
        parse_duration_or(&self.max_stagger_start, Duration::from_secs(60))
    }

    pub fn resolution_idle_timeout(&self) -> Duration {
        parse_duration_or(&self.resolution_idle_timeout, Duration::from_secs(3600))
    }
}

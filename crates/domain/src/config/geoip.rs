use serde::{Deserialize, Serialize};

/// MaxMind database paths. Any subset may be configured; a missing
/// database simply disables that geo tier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MaxMindConfig {
    pub country_db: Option<String>,
    pub city_db: Option<String>,
    pub asn_db: Option<String>,
}

impl MaxMindConfig {
    pub fn any_configured(&self) -> bool {
        self.country_db.is_some() || self.city_db.is_some() || self.asn_db.is_some()
    }
}

/// GeoIP configuration: MaxMind databases plus the custom CIDR map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoIpConfig {
    /// Path to the custom location map YAML.
    pub custom: Option<String>,
    pub maxmind: MaxMindConfig,
}

//! GeoIP adapters: MaxMind databases behind the [`GeoLookup`] port and
//! the custom location map loader.

pub mod maxmind;

use gslb_domain::{GslbError, LocationMap, LocationMapConfig};

pub use maxmind::MaxMindGeo;

/// Load and parse the custom location map YAML.
pub fn load_location_map(path: &str) -> Result<LocationMap, GslbError> {
    let raw =
        std::fs::read_to_string(path).map_err(|e| GslbError::Io(format!("{path}: {e}")))?;
    let config: LocationMapConfig =
        serde_yaml::from_str(&raw).map_err(|e| GslbError::ConfigParse(e.to_string()))?;
    LocationMap::from_config(&config)
}

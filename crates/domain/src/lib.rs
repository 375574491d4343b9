//! GSLB Domain Layer
//!
//! Pure data model shared by every other crate: zone-file records and
//! backends, typed health-check parameters, selection modes, the custom
//! location map and the daemon configuration. No I/O happens here.
pub mod config;
pub mod duration;
pub mod errors;
pub mod fqdn;
pub mod location;
pub mod probe;
pub mod selection_mode;
pub mod zone;

pub use config::{ApiConfig, CliOverrides, Config, GeoIpConfig, MaxMindConfig};
pub use duration::{format_rfc3339, parse_duration, parse_duration_or};
pub use errors::GslbError;
pub use fqdn::{in_zone, normalize_fqdn};
pub use location::{LocationMap, LocationMapConfig, SubnetLocation};
pub use probe::{HealthCheckSpec, ProbeParams};
pub use selection_mode::SelectionMode;
pub use zone::{BackendConfig, HealthCheckEntry, RecordConfig, ZoneConfig};

pub mod geo_lookup;
pub mod probe;
pub mod zone_store;

pub use geo_lookup::GeoLookup;
pub use probe::{probes_equal, HealthProbe, ProbeTarget};
pub use zone_store::{BackendMatchCriteria, ModifiedBackend, ZoneFileStore};

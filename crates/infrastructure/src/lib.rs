//! GSLB Infrastructure Layer
//!
//! Everything that touches the outside world: probe implementations, the
//! live registry with its per-record schedulers, the hickory DNS request
//! handler, zone-file access, MaxMind lookups and metrics emission.
pub mod dns;
pub mod geoip;
pub mod gslb;
pub mod metrics;
pub mod probes;
pub mod zonefile;

pub use dns::GslbHandler;
pub use gslb::{Backend, Record, Registry, RegistrySettings};
pub use zonefile::YamlZoneFileStore;

//! GSLB background jobs: filesystem watchers feeding the reconciler.
pub mod location_watch;
pub mod runner;
pub mod watch;
pub mod zone_watch;

pub use location_watch::LocationMapWatcherJob;
pub use runner::JobRunner;
pub use zone_watch::ZoneWatcherJob;

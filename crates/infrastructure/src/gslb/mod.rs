//! Live GSLB state: backend cells, records with their schedulers, and
//! the registry that reconciles configuration against all of it.

pub mod backend;
pub mod record;
pub mod registry;

pub use backend::Backend;
pub use record::{next_interval, Record, SchedulerContext};
pub use registry::{Registry, RegistrySettings, Resolution};

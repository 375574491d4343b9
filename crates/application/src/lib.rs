//! GSLB Application Layer
//!
//! Ports consumed by the infrastructure adapters, the read models the
//! query path works on, the stateless answer selector and the
//! control-plane use cases.
pub mod ports;
pub mod services;
pub mod use_cases;
pub mod views;

pub use ports::{
    BackendMatchCriteria, GeoLookup, HealthProbe, ModifiedBackend, ProbeTarget, ZoneFileStore,
};
pub use services::selector::{self, Selection, SelectorInputs};
pub use use_cases::BulkSetBackendEnableUseCase;
pub use views::{BackendView, Family, RecordView};

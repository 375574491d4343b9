pub mod backends;
pub mod overview;

pub use backends::{BulkBackendRequest, BulkBackendResponse};
pub use overview::{BackendStatus, RecordStatus};

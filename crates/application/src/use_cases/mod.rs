pub mod bulk_backends;

pub use bulk_backends::BulkSetBackendEnableUseCase;

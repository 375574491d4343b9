use serde::Serialize;

use gslb_application::views::{BackendView, RecordView};
use gslb_domain::format_rfc3339;

const STATUS_HEALTHY: &str = "healthy";
const STATUS_UNHEALTHY: &str = "unhealthy";

/// One backend in the overview.
#[derive(Debug, Clone, Serialize)]
pub struct BackendStatus {
    pub address: String,
    pub alive: String,
    pub last_healthcheck: String,
}

impl BackendStatus {
    pub fn from_view(view: &BackendView) -> Self {
        Self {
            address: view.address.to_string(),
            alive: if view.is_healthy() {
                STATUS_HEALTHY.to_string()
            } else {
                STATUS_UNHEALTHY.to_string()
            },
            last_healthcheck: view
                .last_healthcheck
                .map(format_rfc3339)
                .unwrap_or_else(|| "never".to_string()),
        }
    }
}

/// One record in the overview: aggregate status plus its backends.
#[derive(Debug, Clone, Serialize)]
pub struct RecordStatus {
    pub record: String,
    pub status: String,
    pub backends: Vec<BackendStatus>,
}

impl RecordStatus {
    pub fn from_view(view: &RecordView) -> Self {
        Self {
            record: view.fqdn.clone(),
            status: if view.is_healthy() {
                STATUS_HEALTHY.to_string()
            } else {
                STATUS_UNHEALTHY.to_string()
            },
            backends: view.backends.iter().map(BackendStatus::from_view).collect(),
        }
    }
}

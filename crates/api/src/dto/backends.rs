use serde::{Deserialize, Serialize};

use gslb_application::ports::{BackendMatchCriteria, ModifiedBackend};

/// Request body for the bulk enable/disable endpoints. At least one
/// criterion must be populated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkBackendRequest {
    pub location: Option<String>,
    pub address_prefix: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl BulkBackendRequest {
    pub fn into_criteria(self) -> BackendMatchCriteria {
        BackendMatchCriteria {
            location: self.location,
            address_prefix: self.address_prefix,
            tags: self.tags,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkBackendResponse {
    pub success: bool,
    pub backends: Vec<ModifiedBackend>,
}

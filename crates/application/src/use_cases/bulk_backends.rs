use std::sync::Arc;

use gslb_domain::GslbError;
use tracing::info;

use crate::ports::{BackendMatchCriteria, ModifiedBackend, ZoneFileStore};

/// Bulk enable/disable of backends across every configured zone file.
///
/// Only the files are mutated; the live state follows through the zone
/// watcher so there is a single write path into the running registry.
pub struct BulkSetBackendEnableUseCase {
    store: Arc<dyn ZoneFileStore>,
}

impl BulkSetBackendEnableUseCase {
    pub fn new(store: Arc<dyn ZoneFileStore>) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        zone_files: &[String],
        criteria: &BackendMatchCriteria,
        enable: bool,
    ) -> Result<Vec<ModifiedBackend>, GslbError> {
        if criteria.is_empty() {
            return Err(GslbError::ConfigValidation(
                "location, address_prefix, or tags required".to_string(),
            ));
        }

        let mut modified = Vec::new();
        for path in zone_files {
            modified.extend(
                self.store
                    .set_backends_enable(path, criteria, enable)
                    .await?,
            );
        }

        info!(
            enable,
            backends = modified.len(),
            "Bulk backend enable flag applied"
        );
        Ok(modified)
    }
}

use async_trait::async_trait;
use gslb_domain::{GslbError, ZoneConfig};
use serde::Serialize;

/// Criteria for the bulk enable/disable endpoints. A backend matches
/// when ANY populated criterion hits (OR semantics).
#[derive(Debug, Clone, Default)]
pub struct BackendMatchCriteria {
    /// Exact match on the backend's custom location.
    pub location: Option<String>,
    /// String prefix match on the backend address.
    pub address_prefix: Option<String>,
    /// Match when any listed tag is in the backend's tag set.
    pub tags: Vec<String>,
}

impl BackendMatchCriteria {
    pub fn is_empty(&self) -> bool {
        self.location.as_deref().map_or(true, str::is_empty)
            && self.address_prefix.as_deref().map_or(true, str::is_empty)
            && self.tags.is_empty()
    }
}

/// A backend the bulk mutation touched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModifiedBackend {
    pub record: String,
    pub address: String,
}

/// Zone-file access: parsing for the reconciler, in-place enable flips
/// for the control plane.
#[async_trait]
pub trait ZoneFileStore: Send + Sync {
    async fn load(&self, path: &str) -> Result<ZoneConfig, GslbError>;

    /// Set `enable` on every backend matching `criteria` in the file at
    /// `path`, rewriting the document. Returns the touched backends.
    async fn set_backends_enable(
        &self,
        path: &str,
        criteria: &BackendMatchCriteria,
        enable: bool,
    ) -> Result<Vec<ModifiedBackend>, GslbError>;
}

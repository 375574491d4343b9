use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use gslb_application::BulkSetBackendEnableUseCase;
use gslb_infrastructure::gslb::Registry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub bulk_backends: Arc<BulkSetBackendEnableUseCase>,
    /// Credentials enforced on every endpoint when set.
    pub basic_auth: Option<(String, String)>,
    /// Render handle for `/metrics`; `None` disables the endpoint.
    pub prometheus: Option<PrometheusHandle>,
}

use std::net::SocketAddr;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

use gslb_infrastructure::metrics;

/// Install the Prometheus recorder.
///
/// With `metrics_listen_addr` set, the exporter serves its own listener
/// and the API's `/metrics` endpoint stays off. Otherwise the recorder
/// handle is returned for the API to render.
pub fn init_metrics(metrics_listen_addr: Option<&str>) -> anyhow::Result<Option<PrometheusHandle>> {
    let handle = match metrics_listen_addr {
        Some(addr) => {
            let addr: SocketAddr = addr.parse()?;
            PrometheusBuilder::new().with_http_listener(addr).install()?;
            info!(%addr, "Prometheus exporter listening");
            None
        }
        None => Some(PrometheusBuilder::new().install_recorder()?),
    };

    metrics::set_version_info(env!("CARGO_PKG_VERSION"));
    Ok(handle)
}

use std::net::SocketAddr;
use std::time::Instant;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::debug;

use gslb_application::ports::{HealthProbe, ProbeTarget};
use gslb_domain::probe::TcpProbeParams;
use gslb_domain::ProbeParams;

use crate::metrics::{self, FailureReason};

/// TCP health check: the three-way handshake must complete.
pub struct TcpProbe {
    cfg: TcpProbeParams,
    params: ProbeParams,
}

impl TcpProbe {
    pub fn new(cfg: TcpProbeParams) -> Self {
        Self {
            params: ProbeParams::Tcp(cfg.clone()),
            cfg,
        }
    }
}

#[async_trait]
impl HealthProbe for TcpProbe {
    async fn perform(&self, target: &ProbeTarget, retries: u32) -> bool {
        let kind = self.kind();
        let address = target.address.to_string();
        let addr = SocketAddr::new(target.address, self.cfg.port);
        let timeout = self.params.timeout();
        let start = Instant::now();

        let mut reason = FailureReason::Other;
        for attempt in 0..=retries {
            debug!(record = %target.fqdn, %addr, attempt, "Attempting TCP health check");
            match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
                Ok(Ok(_stream)) => {
                    debug!(record = %target.fqdn, %addr, "TCP health check successful");
                    metrics::observe_healthcheck(&target.fqdn, &kind, &address, start, true);
                    return true;
                }
                Ok(Err(e)) => {
                    debug!(record = %target.fqdn, %addr, attempt, error = %e, "TCP health check failed");
                    reason = FailureReason::Connection;
                }
                Err(_) => {
                    debug!(record = %target.fqdn, %addr, attempt, "TCP health check timed out");
                    reason = FailureReason::Timeout;
                }
            }
        }

        metrics::inc_healthcheck_failure(&kind, &address, reason);
        metrics::observe_healthcheck(&target.fqdn, &kind, &address, start, false);
        false
    }

    fn kind(&self) -> String {
        self.params.kind()
    }

    fn params(&self) -> &ProbeParams {
        &self.params
    }
}

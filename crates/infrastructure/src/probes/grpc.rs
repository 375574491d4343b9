use std::time::Instant;

use async_trait::async_trait;
use tonic::transport::Endpoint;
use tonic_health::pb::health_check_response::ServingStatus;
use tonic_health::pb::health_client::HealthClient;
use tonic_health::pb::HealthCheckRequest;
use tracing::debug;

use gslb_application::ports::{HealthProbe, ProbeTarget};
use gslb_domain::probe::GrpcProbeParams;
use gslb_domain::ProbeParams;

use crate::metrics::{self, FailureReason};

/// gRPC health check against the standard `grpc.health.v1` service.
pub struct GrpcProbe {
    cfg: GrpcProbeParams,
    params: ProbeParams,
}

impl GrpcProbe {
    pub fn new(cfg: GrpcProbeParams) -> Self {
        Self {
            params: ProbeParams::Grpc(cfg.clone()),
            cfg,
        }
    }

    async fn attempt(&self, target: &ProbeTarget) -> Result<(), FailureReason> {
        let host = match &self.cfg.host {
            Some(host) => host.clone(),
            None if target.address.is_ipv6() => format!("[{}]", target.address),
            None => target.address.to_string(),
        };
        let uri = format!("http://{host}:{}", self.cfg.port);

        let endpoint = Endpoint::from_shared(uri)
            .map_err(|_| FailureReason::Other)?
            .connect_timeout(self.params.timeout())
            .timeout(self.params.timeout());

        let channel = endpoint
            .connect()
            .await
            .map_err(|_| FailureReason::Connection)?;

        let mut client = HealthClient::new(channel);
        let response = client
            .check(HealthCheckRequest {
                service: self.cfg.service.clone(),
            })
            .await
            .map_err(|_| FailureReason::Connection)?;

        if response.into_inner().status() == ServingStatus::Serving {
            Ok(())
        } else {
            Err(FailureReason::Protocol)
        }
    }
}

#[async_trait]
impl HealthProbe for GrpcProbe {
    async fn perform(&self, target: &ProbeTarget, retries: u32) -> bool {
        let kind = self.kind();
        let address = target.address.to_string();
        let timeout = self.params.timeout();
        let start = Instant::now();

        let mut reason = FailureReason::Other;
        for attempt in 0..=retries {
            debug!(record = %target.fqdn, backend = %address, attempt, "Attempting gRPC health check");
            match tokio::time::timeout(timeout, self.attempt(target)).await {
                Ok(Ok(())) => {
                    metrics::observe_healthcheck(&target.fqdn, &kind, &address, start, true);
                    return true;
                }
                Ok(Err(why)) => reason = why,
                Err(_) => reason = FailureReason::Timeout,
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

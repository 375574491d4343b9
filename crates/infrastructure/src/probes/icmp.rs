use std::time::Instant;

use async_trait::async_trait;
use surge_ping::{Client, Config, PingIdentifier, PingSequence, ICMP};
use tracing::{debug, error};

use gslb_application::ports::{HealthProbe, ProbeTarget};
use gslb_domain::probe::IcmpProbeParams;
use gslb_domain::ProbeParams;

use crate::metrics::{self, FailureReason};

/// ICMP health check: at least one echo reply out of `count` echoes.
///
/// Needs a raw/ICMP socket; when the process lacks the privilege the
/// check is a permanent failure and retrying is pointless.
pub struct IcmpProbe {
    cfg: IcmpProbeParams,
    params: ProbeParams,
}

impl IcmpProbe {
    pub fn new(cfg: IcmpProbeParams) -> Self {
        Self {
            params: ProbeParams::Icmp(cfg.clone()),
            cfg,
        }
    }

    async fn attempt(&self, target: &ProbeTarget) -> Result<bool, FailureReason> {
        let config = if target.address.is_ipv6() {
            Config::builder().kind(ICMP::V6).build()
        } else {
            Config::default()
        };

        let client = Client::new(&config).map_err(|e| {
            error!(backend = %target.address, error = %e, "ICMP socket unavailable (missing privilege?)");
            FailureReason::Connection
        })?;

        let payload = [0u8; 56];
        let mut pinger = client
            .pinger(target.address, PingIdentifier(rand::random()))
            .await;
        pinger.timeout(self.params.timeout());

        for seq in 0..self.cfg.count {
            if let Ok((_packet, rtt)) = pinger.ping(PingSequence(seq as u16), &payload).await {
                debug!(backend = %target.address, ?rtt, "ICMP echo reply received");
                return Ok(true);
            }
        }
        Err(FailureReason::Timeout)
    }
}

#[async_trait]
impl HealthProbe for IcmpProbe {
    async fn perform(&self, target: &ProbeTarget, retries: u32) -> bool {
        let kind = self.kind();
        let address = target.address.to_string();
        let start = Instant::now();

        let mut reason = FailureReason::Other;
        for attempt in 0..=retries {
            debug!(record = %target.fqdn, backend = %address, attempt, "Starting ICMP health check");
            match tokio::time::timeout(self.params.timeout(), self.attempt(target)).await {
                Ok(Ok(_)) => {
                    metrics::observe_healthcheck(&target.fqdn, &kind, &address, start, true);
                    return true;
                }
                Ok(Err(FailureReason::Connection)) => {
                    // No raw socket: permanent, skip remaining retries.
                    reason = FailureReason::Connection;
                    break;
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

use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use gslb_application::ports::{HealthProbe, ProbeTarget};
use gslb_domain::probe::CustomProbeParams;
use gslb_domain::ProbeParams;

use crate::metrics::{self, FailureReason};

/// Scripted health check: `/bin/sh -c <script>`, exit code 0 = healthy.
/// Backend attributes are passed through the environment. The script is
/// trusted operator code.
pub struct CustomProbe {
    cfg: CustomProbeParams,
    params: ProbeParams,
}

impl CustomProbe {
    pub fn new(cfg: CustomProbeParams) -> Self {
        Self {
            params: ProbeParams::Custom(cfg.clone()),
            cfg,
        }
    }

    async fn attempt(&self, target: &ProbeTarget) -> Result<bool, FailureReason> {
        let status = Command::new("/bin/sh")
            .arg("-c")
            .arg(&self.cfg.script)
            .env("BACKEND_ADDRESS", target.address.to_string())
            .env("BACKEND_FQDN", &target.fqdn)
            .env("BACKEND_PRIORITY", target.priority.to_string())
            .env("BACKEND_ENABLE", target.enable.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|_| FailureReason::Other)?;

        Ok(status.success())
    }
}

#[async_trait]
impl HealthProbe for CustomProbe {
    async fn perform(&self, target: &ProbeTarget, retries: u32) -> bool {
        let kind = self.kind();
        let address = target.address.to_string();
        let timeout = self.params.timeout();
        let start = Instant::now();

        let mut reason = FailureReason::Other;
        for attempt in 0..=retries {
            debug!(record = %target.fqdn, backend = %address, attempt, "Running custom health check script");
            match tokio::time::timeout(timeout, self.attempt(target)).await {
                Ok(Ok(true)) => {
                    metrics::observe_healthcheck(&target.fqdn, &kind, &address, start, true);
                    return true;
                }
                Ok(Ok(false)) => reason = FailureReason::Protocol,
                Ok(Err(why)) => reason = why,
                Err(_) => {
                    // kill_on_drop reaps the child once the future drops.
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

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> ProbeTarget {
        ProbeTarget {
            fqdn: "web.example.com.".to_string(),
            address: "192.0.2.1".parse().unwrap(),
            priority: 3,
            enable: true,
        }
    }

    fn probe(script: &str, timeout: &str) -> CustomProbe {
        CustomProbe::new(CustomProbeParams {
            script: script.to_string(),
            timeout: timeout.to_string(),
        })
    }

    #[tokio::test]
    async fn exit_zero_is_healthy() {
        assert!(probe("exit 0", "5s").perform(&target(), 0).await);
    }

    #[tokio::test]
    async fn exit_nonzero_is_unhealthy() {
        assert!(!probe("exit 7", "5s").perform(&target(), 1).await);
    }

    #[tokio::test]
    async fn backend_attributes_are_in_the_environment() {
        let script = r#"[ "$BACKEND_ADDRESS" = "192.0.2.1" ] && [ "$BACKEND_PRIORITY" = "3" ] && [ "$BACKEND_ENABLE" = "true" ]"#;
        assert!(probe(script, "5s").perform(&target(), 0).await);
    }

    #[tokio::test]
    async fn deadline_kills_slow_scripts() {
        assert!(!probe("sleep 5", "100ms").perform(&target(), 0).await);
    }
}

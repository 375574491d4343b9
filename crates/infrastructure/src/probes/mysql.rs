use std::time::Instant;

use async_trait::async_trait;
use sqlx::mysql::MySqlConnectOptions;
use sqlx::{ConnectOptions, Connection};
use tracing::debug;

use gslb_application::ports::{HealthProbe, ProbeTarget};
use gslb_domain::probe::MysqlProbeParams;
use gslb_domain::ProbeParams;

use crate::metrics::{self, FailureReason};

/// MySQL health check: connect, ping, run the probe query and read one
/// row, all within the timeout.
pub struct MysqlProbe {
    cfg: MysqlProbeParams,
    params: ProbeParams,
}

impl MysqlProbe {
    pub fn new(cfg: MysqlProbeParams) -> Self {
        Self {
            params: ProbeParams::Mysql(cfg.clone()),
            cfg,
        }
    }

    async fn attempt(&self, target: &ProbeTarget) -> Result<(), FailureReason> {
        let host = self
            .cfg
            .host
            .clone()
            .unwrap_or_else(|| target.address.to_string());

        let options = MySqlConnectOptions::new()
            .host(&host)
            .port(self.cfg.port)
            .username(&self.cfg.user)
            .password(&self.cfg.password)
            .database(&self.cfg.database);

        let mut conn = options
            .connect()
            .await
            .map_err(|_| FailureReason::Connection)?;

        conn.ping().await.map_err(|_| FailureReason::Connection)?;

        sqlx::query(&self.cfg.query)
            .fetch_one(&mut conn)
            .await
            .map_err(|_| FailureReason::Protocol)?;

        let _ = conn.close().await;
        Ok(())
    }
}

#[async_trait]
impl HealthProbe for MysqlProbe {
    async fn perform(&self, target: &ProbeTarget, retries: u32) -> bool {
        let kind = self.kind();
        let address = target.address.to_string();
        let timeout = self.params.timeout();
        let start = Instant::now();

        let mut reason = FailureReason::Other;
        for attempt in 0..=retries {
            debug!(record = %target.fqdn, backend = %address, attempt, "Attempting MySQL health check");
            match tokio::time::timeout(timeout, self.attempt(target)).await {
                Ok(Ok(())) => {
                    metrics::observe_healthcheck(&target.fqdn, &kind, &address, start, true);
                    return true;
                }
                Ok(Err(why)) => {
                    debug!(record = %target.fqdn, backend = %address, attempt, reason = why.label(), "MySQL health check failed");
                    reason = why;
                }
                Err(_) => {
                    debug!(record = %target.fqdn, backend = %address, attempt, "MySQL health check timed out");
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

use std::net::IpAddr;
use std::time::Instant;

use async_trait::async_trait;
use tracing::debug;

use gslb_application::ports::{HealthProbe, ProbeTarget};
use gslb_domain::probe::HttpProbeParams;
use gslb_domain::ProbeParams;

use crate::metrics::{self, FailureReason};

/// HTTP(S) health check: expected status set plus an optional body
/// substring.
pub struct HttpProbe {
    cfg: HttpProbeParams,
    https: bool,
    params: ProbeParams,
}

impl HttpProbe {
    pub fn new(cfg: HttpProbeParams, https: bool) -> Self {
        let params = if https {
            ProbeParams::Https(cfg.clone())
        } else {
            ProbeParams::Http(cfg.clone())
        };
        Self { cfg, https, params }
    }

    fn url_for(&self, address: IpAddr) -> String {
        let scheme = if self.https { "https" } else { "http" };
        let port = self.cfg.port(self.https);
        let host = match &self.cfg.host {
            Some(host) => host.clone(),
            None if address.is_ipv6() => format!("[{address}]"),
            None => address.to_string(),
        };
        let uri = if self.cfg.uri.starts_with('/') {
            self.cfg.uri.clone()
        } else {
            format!("/{}", self.cfg.uri)
        };
        format!("{scheme}://{host}:{port}{uri}")
    }

    async fn attempt(&self, url: &str) -> Result<bool, FailureReason> {
        let client = reqwest::Client::builder()
            .timeout(self.params.timeout())
            .danger_accept_invalid_certs(self.cfg.skip_tls_verify)
            .build()
            .map_err(|_| FailureReason::Other)?;

        let method = reqwest::Method::from_bytes(self.cfg.method.as_bytes())
            .unwrap_or(reqwest::Method::GET);
        let mut request = client.request(method, url);
        if let Some(user) = &self.cfg.basic_auth_user {
            request = request.basic_auth(user, self.cfg.basic_auth_pass.as_deref());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                FailureReason::Timeout
            } else {
                FailureReason::Connection
            }
        })?;

        let status = response.status().as_u16();
        if !self.cfg.expected_codes.contains(&status) {
            return Err(FailureReason::Protocol);
        }

        if let Some(needle) = &self.cfg.expected_body {
            let body = response.text().await.map_err(|_| FailureReason::Protocol)?;
            if !body.contains(needle.as_str()) {
                return Err(FailureReason::Protocol);
            }
        }

        Ok(true)
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    async fn perform(&self, target: &ProbeTarget, retries: u32) -> bool {
        let kind = self.kind();
        let address = target.address.to_string();
        let url = self.url_for(target.address);
        let start = Instant::now();

        let mut reason = FailureReason::Other;
        for attempt in 0..=retries {
            debug!(record = %target.fqdn, %url, attempt, "Attempting HTTP health check");
            match self.attempt(&url).await {
                Ok(_) => {
                    debug!(record = %target.fqdn, %url, "HTTP health check successful");
                    metrics::observe_healthcheck(&target.fqdn, &kind, &address, start, true);
                    return true;
                }
                Err(why) => {
                    debug!(record = %target.fqdn, %url, attempt, reason = why.label(), "HTTP health check failed");
                    reason = why;
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

use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::debug;

use gslb_application::ports::{probes_equal, HealthProbe, ProbeTarget};
use gslb_application::views::BackendView;
use gslb_domain::{BackendConfig, ProbeParams};

use crate::metrics;
use crate::probes;

/// One backend and its mutable health/enable state.
///
/// The address is the backend's identity: reload diffing matches on it
/// and it never changes for a live cell. Everything else sits behind the
/// cell's lock; the scheduler takes it exclusively to commit a probe
/// round, the query path takes it shared.
pub struct Backend {
    fqdn: String,
    address: IpAddr,
    state: RwLock<BackendState>,
}

struct BackendState {
    priority: i32,
    enable: bool,
    description: String,
    countries: Vec<String>,
    cities: Vec<String>,
    asns: Vec<u32>,
    locations: Vec<String>,
    tags: Vec<String>,
    probes: Vec<Arc<dyn HealthProbe>>,
    alive: bool,
    last_healthcheck: Option<SystemTime>,
}

impl Backend {
    pub fn from_config(fqdn: &str, cfg: &BackendConfig, probe_params: Vec<ProbeParams>) -> Self {
        Self::with_probes(fqdn, cfg, probes::build_probes(probe_params))
    }

    /// Build a cell around pre-instantiated probes.
    pub fn with_probes(
        fqdn: &str,
        cfg: &BackendConfig,
        probes: Vec<Arc<dyn HealthProbe>>,
    ) -> Self {
        Self {
            fqdn: fqdn.to_string(),
            address: cfg.address,
            state: RwLock::new(BackendState {
                priority: cfg.priority,
                enable: cfg.enable,
                description: cfg.description.clone(),
                countries: cfg.location_countries.clone(),
                cities: cfg.location_cities.clone(),
                asns: cfg.location_asns.clone(),
                locations: cfg.locations_custom.clone(),
                tags: cfg.tags.clone(),
                probes,
                alive: false,
                last_healthcheck: None,
            }),
        }
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    /// `alive AND enable`, under the shared lock.
    pub async fn is_healthy(&self) -> bool {
        let state = self.state.read().await;
        state.alive && state.enable
    }

    pub async fn is_enabled(&self) -> bool {
        self.state.read().await.enable
    }

    pub async fn view(&self) -> BackendView {
        let state = self.state.read().await;
        BackendView {
            address: self.address,
            priority: state.priority,
            alive: state.alive,
            enabled: state.enable,
            countries: state.countries.clone(),
            cities: state.cities.clone(),
            asns: state.asns.clone(),
            locations: state.locations.clone(),
            last_healthcheck: state.last_healthcheck,
        }
    }

    /// Copy mutable scalars from a fresh config; the probe list is only
    /// rebuilt when it structurally changed.
    pub async fn update_from(&self, cfg: &BackendConfig, probe_params: Vec<ProbeParams>) {
        let mut state = self.state.write().await;

        if state.priority != cfg.priority {
            debug!(
                record = %self.fqdn, backend = %self.address,
                from = state.priority, to = cfg.priority,
                "Backend priority changed"
            );
            state.priority = cfg.priority;
        }
        if state.enable != cfg.enable {
            debug!(
                record = %self.fqdn, backend = %self.address,
                from = state.enable, to = cfg.enable,
                "Backend enable changed"
            );
            state.enable = cfg.enable;
        }
        if !probes_equal(&state.probes, &probe_params) {
            debug!(record = %self.fqdn, backend = %self.address, "Backend health checks changed");
            state.probes = probes::build_probes(probe_params);
        }

        state.description = cfg.description.clone();
        state.countries = cfg.location_countries.clone();
        state.cities = cfg.location_cities.clone();
        state.asns = cfg.location_asns.clone();
        state.locations = cfg.locations_custom.clone();
        state.tags = cfg.tags.clone();
    }

    /// One probe round: every configured check runs in parallel, each
    /// bounded by the scrape timeout, and the backend is alive iff all
    /// of them succeeded. A check that panics counts as failed.
    pub async fn run_probes(&self, retries: u32, scrape_timeout: Duration) {
        let (probes, target) = {
            let state = self.state.read().await;
            let target = ProbeTarget {
                fqdn: self.fqdn.clone(),
                address: self.address,
                priority: state.priority,
                enable: state.enable,
            };
            (state.probes.clone(), target)
        };

        debug!(record = %self.fqdn, backend = %self.address, checks = probes.len(), "Starting health checks");

        let mut tasks = Vec::with_capacity(probes.len());
        for probe in &probes {
            let probe = probe.clone();
            let target = target.clone();
            tasks.push(tokio::spawn(async move {
                tokio::time::timeout(scrape_timeout, probe.perform(&target, retries))
                    .await
                    .unwrap_or(false)
            }));
        }

        let mut alive = true;
        for (probe, task) in probes.iter().zip(join_all(tasks).await) {
            let ok = task.unwrap_or(false);
            metrics::set_healthcheck_status(
                &self.fqdn,
                &self.address.to_string(),
                &probe.kind(),
                ok,
            );
            if !ok {
                alive = false;
            }
        }

        let mut state = self.state.write().await;
        state.alive = alive;
        state.last_healthcheck = Some(SystemTime::now());
        debug!(
            record = %self.fqdn, backend = %self.address,
            alive, checks = state.probes.len(),
            "Backend status updated"
        );
    }

    pub async fn probe_count(&self) -> usize {
        self.state.read().await.probes.len()
    }

    pub async fn description(&self) -> String {
        self.state.read().await.description.clone()
    }

    pub async fn tags(&self) -> Vec<String> {
        self.state.read().await.tags.clone()
    }

    /// Test hook: force the aggregate state without running probes.
    #[doc(hidden)]
    pub async fn set_alive(&self, alive: bool) {
        self.state.write().await.alive = alive;
    }
}

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::{watch, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use gslb_application::views::RecordView;
use gslb_domain::{GslbError, RecordConfig, SelectionMode};

use crate::gslb::backend::Backend;
use crate::metrics;

/// Everything the per-record scheduler needs from the registry.
#[derive(Clone)]
pub struct SchedulerContext {
    pub last_resolution: Arc<DashMap<String, Instant>>,
    pub resolution_idle_timeout: Duration,
    pub idle_multiplier: u32,
}

/// The probe interval a scheduler should run at next.
pub fn next_interval(base: Duration, idle: bool, multiplier: u32) -> Duration {
    if idle {
        base * multiplier.max(1)
    } else {
        base
    }
}

/// One GSLB record: scalars, its backends in config order, and the
/// cancel handle of its scheduler task.
pub struct Record {
    fqdn: String,
    zone: String,
    cancel: CancellationToken,
    interval_tx: watch::Sender<Duration>,
    state: RwLock<RecordState>,
}

struct RecordState {
    mode: SelectionMode,
    owner: String,
    description: String,
    record_ttl: u32,
    scrape_retries: u32,
    scrape_timeout: Duration,
    backends: Vec<Arc<Backend>>,
}

impl Record {
    pub fn from_config(
        zone: &str,
        fqdn: &str,
        cfg: &RecordConfig,
        zone_profiles: &std::collections::HashMap<String, gslb_domain::HealthCheckSpec>,
    ) -> Result<Arc<Self>, GslbError> {
        let mut backends = Vec::with_capacity(cfg.backends.len());
        for backend_cfg in &cfg.backends {
            let params =
                backend_cfg.resolve_probes(&cfg.healthcheck_profiles, zone_profiles)?;
            backends.push(Arc::new(Backend::from_config(fqdn, backend_cfg, params)));
        }

        let (interval_tx, _) = watch::channel(cfg.scrape_interval());
        Ok(Arc::new(Self {
            fqdn: fqdn.to_string(),
            zone: zone.to_string(),
            cancel: CancellationToken::new(),
            interval_tx,
            state: RwLock::new(RecordState {
                mode: cfg.mode,
                owner: cfg.owner.clone(),
                description: cfg.description.clone(),
                record_ttl: cfg.record_ttl,
                scrape_retries: cfg.scrape_retries,
                scrape_timeout: cfg.scrape_timeout(),
                backends,
            }),
        }))
    }

    pub fn fqdn(&self) -> &str {
        &self.fqdn
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub async fn owner(&self) -> String {
        self.state.read().await.owner.clone()
    }

    pub async fn description(&self) -> String {
        self.state.read().await.description.clone()
    }

    /// Stop the scheduler. In-flight probes finish on their own; they
    /// are deadline-bounded.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub async fn view(&self) -> RecordView {
        let state = self.state.read().await;
        let mut backends = Vec::with_capacity(state.backends.len());
        for backend in &state.backends {
            backends.push(backend.view().await);
        }
        RecordView {
            fqdn: self.fqdn.clone(),
            zone: self.zone.clone(),
            mode: state.mode,
            record_ttl: state.record_ttl,
            backends,
        }
    }

    /// Backend cells in config order.
    pub async fn backends(&self) -> Vec<Arc<Backend>> {
        self.state.read().await.backends.clone()
    }

    pub async fn counts(&self) -> (usize, usize) {
        let state = self.state.read().await;
        let mut probes = 0;
        for backend in &state.backends {
            probes += backend.probe_count().await;
        }
        (state.backends.len(), probes)
    }

    /// Incremental update from a freshly parsed record.
    ///
    /// Scalars are copied; an interval change is pushed to the running
    /// scheduler so it resets its ticker. Backends are diffed by
    /// address: matched cells update in place, added cells start probing
    /// immediately when enabled, removed cells are dropped.
    pub async fn update_from(
        &self,
        cfg: &RecordConfig,
        zone_profiles: &std::collections::HashMap<String, gslb_domain::HealthCheckSpec>,
    ) -> Result<(), GslbError> {
        let mut state = self.state.write().await;

        if state.mode != cfg.mode {
            debug!(record = %self.fqdn, from = %state.mode, to = %cfg.mode, "Record mode changed");
            state.mode = cfg.mode;
        }
        if state.record_ttl != cfg.record_ttl {
            debug!(record = %self.fqdn, from = state.record_ttl, to = cfg.record_ttl, "Record TTL changed");
            state.record_ttl = cfg.record_ttl;
        }
        state.owner = cfg.owner.clone();
        state.description = cfg.description.clone();
        state.scrape_retries = cfg.scrape_retries;
        state.scrape_timeout = cfg.scrape_timeout();

        let new_interval = cfg.scrape_interval();
        if *self.interval_tx.borrow() != new_interval {
            debug!(record = %self.fqdn, interval = ?new_interval, "Scrape interval changed, resetting ticker");
            // send_replace stores even while the scheduler has not
            // subscribed yet (stagger delay).
            self.interval_tx.send_replace(new_interval);
        }

        // Update or add backends.
        for backend_cfg in &cfg.backends {
            let params =
                backend_cfg.resolve_probes(&cfg.healthcheck_profiles, zone_profiles)?;
            let existing = state
                .backends
                .iter()
                .find(|b| b.address() == backend_cfg.address)
                .cloned();
            match existing {
                Some(backend) => backend.update_from(backend_cfg, params).await,
                None => {
                    debug!(record = %self.fqdn, backend = %backend_cfg.address, "New backend added");
                    let backend =
                        Arc::new(Backend::from_config(&self.fqdn, backend_cfg, params));
                    state.backends.push(backend.clone());
                    if backend_cfg.enable {
                        let retries = state.scrape_retries;
                        let timeout = state.scrape_timeout;
                        tokio::spawn(async move {
                            backend.run_probes(retries, timeout).await;
                        });
                    }
                }
            }
        }

        // Drop backends that disappeared from the file.
        let keep: Vec<std::net::IpAddr> = cfg.backends.iter().map(|b| b.address).collect();
        state.backends.retain(|backend| {
            let keep_it = keep.contains(&backend.address());
            if !keep_it {
                debug!(record = %self.fqdn, backend = %backend.address(), "Backend removed");
            }
            keep_it
        });

        Ok(())
    }

    /// The long-running scheduler: tick, probe every enabled backend,
    /// publish the healthy count, adapt the interval while idle.
    pub async fn run_scheduler(self: Arc<Self>, ctx: SchedulerContext) {
        let mut interval_rx = self.interval_tx.subscribe();
        let mut base = *interval_rx.borrow();
        let mut current = base;
        let mut ticker = new_ticker(current);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!(record = %self.fqdn, "Stopping health checks");
                    return;
                }
                changed = interval_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    base = *interval_rx.borrow();
                    current = base;
                    ticker = new_ticker(current);
                    continue;
                }
                _ = ticker.tick() => {}
            }

            // Slow down while nobody is asking for this record.
            let idle = ctx
                .last_resolution
                .get(&self.fqdn)
                .map(|stamp| stamp.elapsed() > ctx.resolution_idle_timeout)
                .unwrap_or(false);
            let desired = next_interval(base, idle, ctx.idle_multiplier);
            if desired != current {
                current = desired;
                ticker = new_ticker(current);
                if idle {
                    debug!(record = %self.fqdn, interval = ?current, "Slowing down scrape interval");
                } else {
                    debug!(record = %self.fqdn, interval = ?current, "Resuming normal scrape interval");
                }
            }

            let (retries, timeout, backends) = {
                let state = self.state.read().await;
                (
                    state.scrape_retries,
                    state.scrape_timeout,
                    state.backends.clone(),
                )
            };

            for backend in &backends {
                if !backend.is_enabled().await {
                    continue;
                }
                backend.run_probes(retries, timeout).await;
            }

            let mut healthy = 0;
            for backend in &backends {
                let is_healthy = backend.is_healthy().await;
                metrics::set_backend_health(&self.fqdn, &backend.address().to_string(), is_healthy);
                if is_healthy {
                    healthy += 1;
                }
            }
            metrics::set_active_backends(&self.fqdn, healthy);
            metrics::set_record_health(&self.fqdn, healthy > 0);
        }
    }
}

/// A ticker whose first fire is one full period away.
fn new_ticker(period: Duration) -> tokio::time::Interval {
    let mut ticker =
        tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker
}

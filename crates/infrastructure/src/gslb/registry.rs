use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use gslb_application::ports::GeoLookup;
use gslb_application::selector::{self, SelectorInputs};
use gslb_application::views::{Family, RecordView};
use gslb_domain::{normalize_fqdn, GslbError, LocationMap, SelectionMode, ZoneConfig};

use crate::gslb::record::{Record, SchedulerContext};
use crate::metrics;

/// Knobs the registry needs from the daemon configuration.
#[derive(Debug, Clone)]
pub struct RegistrySettings {
    pub max_stagger_start: Duration,
    pub batch_size_start: usize,
    pub resolution_idle_timeout: Duration,
    pub healthcheck_idle_multiplier: u32,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            max_stagger_start: Duration::from_secs(60),
            batch_size_start: 100,
            resolution_idle_timeout: Duration::from_secs(3600),
            healthcheck_idle_multiplier: 10,
        }
    }
}

/// Outcome of one A/AAAA resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// No record under this name; the handler refuses the query.
    NotFound,
    /// Addresses in answer order plus the record TTL.
    Answers { addresses: Vec<IpAddr>, ttl: u32 },
    /// Record exists but even the all-enabled fallback is empty.
    NoBackend,
}

/// The process-wide GSLB state: every record of every zone, the
/// round-robin counters, the last-resolution stamps and the geo context.
pub struct Registry {
    /// (zone, zone file path), normalized zone names.
    zones: Vec<(String, String)>,
    records: RwLock<HashMap<String, Arc<Record>>>,
    last_resolution: Arc<DashMap<String, Instant>>,
    rr_index: DashMap<String, usize>,
    location_map: ArcSwap<LocationMap>,
    geo: Option<Arc<dyn GeoLookup>>,
    settings: RegistrySettings,
}

impl Registry {
    pub fn new(
        zones: Vec<(String, String)>,
        geo: Option<Arc<dyn GeoLookup>>,
        location_map: LocationMap,
        settings: RegistrySettings,
    ) -> Arc<Self> {
        Arc::new(Self {
            zones,
            records: RwLock::new(HashMap::new()),
            last_resolution: Arc::new(DashMap::new()),
            rr_index: DashMap::new(),
            location_map: ArcSwap::from_pointee(location_map),
            geo,
            settings,
        })
    }

    pub fn zones(&self) -> &[(String, String)] {
        &self.zones
    }

    pub fn zone_files(&self) -> Vec<String> {
        self.zones.iter().map(|(_, path)| path.clone()).collect()
    }

    pub fn has_zone(&self, zone: &str) -> bool {
        self.zones.iter().any(|(name, _)| name == zone)
    }

    /// Swap in a freshly parsed custom location map.
    pub fn set_location_map(&self, map: LocationMap) {
        info!(subnets = map.len(), "Custom location map updated");
        self.location_map.store(Arc::new(map));
    }

    /// Stamp the last-resolution time; the scheduler uses this for its
    /// idle detection.
    pub fn touch_last_resolution(&self, fqdn: &str) {
        self.last_resolution
            .insert(fqdn.to_string(), Instant::now());
    }

    fn scheduler_context(&self) -> SchedulerContext {
        SchedulerContext {
            last_resolution: self.last_resolution.clone(),
            resolution_idle_timeout: self.settings.resolution_idle_timeout,
            idle_multiplier: self.settings.healthcheck_idle_multiplier,
        }
    }

    /// Reconcile one zone's freshly parsed configuration against the
    /// running state. Parse and validation happen before this is called;
    /// nothing here performs I/O while the write lock is held.
    pub async fn load_zone(&self, zone: &str, config: &ZoneConfig) -> Result<(), GslbError> {
        let mut started = Vec::new();
        {
            let mut records = self.records.write().await;
            let mut seen = HashSet::new();

            for (raw_fqdn, record_cfg) in &config.records {
                let fqdn = normalize_fqdn(raw_fqdn);
                seen.insert(fqdn.clone());

                let existing = records.get(&fqdn).cloned();
                match existing {
                    Some(existing) if existing.zone() != zone => {
                        // First loaded zone wins.
                        warn!(
                            record = %fqdn, zone, existing_zone = %existing.zone(),
                            "Duplicate record across zones ignored"
                        );
                    }
                    Some(existing) => {
                        existing
                            .update_from(record_cfg, &config.healthcheck_profiles)
                            .await?;
                    }
                    None => {
                        let record = Record::from_config(
                            zone,
                            &fqdn,
                            record_cfg,
                            &config.healthcheck_profiles,
                        )?;
                        records.insert(fqdn.clone(), record.clone());
                        info!(record = %fqdn, zone, "Added new record");
                        started.push(record);
                    }
                }
            }

            // Cancel schedulers before the records become visible-absent.
            let stale: Vec<String> = records
                .iter()
                .filter(|(fqdn, record)| record.zone() == zone && !seen.contains(*fqdn))
                .map(|(fqdn, _)| (*fqdn).clone())
                .collect();
            for fqdn in stale {
                if let Some(record) = records.remove(&fqdn) {
                    record.cancel();
                    self.rr_index.remove(&fqdn);
                    self.last_resolution.remove(&fqdn);
                    info!(record = %fqdn, "Record removed");
                }
            }

            let mut backends_total = 0;
            let mut checks_total = 0;
            for record in records.values() {
                let (backends, checks) = record.counts().await;
                backends_total += backends;
                checks_total += checks;
            }
            metrics::set_configured_totals(
                records.len(),
                backends_total,
                checks_total,
                self.zones.len(),
            );
        }

        self.spawn_schedulers(started);
        Ok(())
    }

    /// Launch schedulers in batches: batch *i* starts after
    /// `i × (max_stagger / total_batches)` so a big (re)load does not
    /// probe-storm every backend at once.
    fn spawn_schedulers(&self, records: Vec<Arc<Record>>) {
        if records.is_empty() {
            return;
        }
        let batch_size = self.settings.batch_size_start.max(1);
        let batches: Vec<Vec<Arc<Record>>> =
            records.chunks(batch_size).map(<[_]>::to_vec).collect();
        let delay_step = self.settings.max_stagger_start / batches.len() as u32;

        for (index, batch) in batches.into_iter().enumerate() {
            let delay = delay_step * index as u32;
            let ctx = self.scheduler_context();
            tokio::spawn(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                for record in batch {
                    debug!(record = %record.fqdn(), "Starting health checks for backends");
                    tokio::spawn(record.run_scheduler(ctx.clone()));
                }
            });
        }
    }

    /// Answer one A/AAAA query: selector first, then the all-enabled
    /// fallback, then nothing.
    pub async fn resolve(
        &self,
        fqdn: &str,
        family: Family,
        client_ip: Option<IpAddr>,
    ) -> Resolution {
        let record = { self.records.read().await.get(fqdn).cloned() };
        let Some(record) = record else {
            return Resolution::NotFound;
        };

        let view = record.view().await;
        let location_map = self.location_map.load_full();
        let inputs = SelectorInputs {
            geo: self.geo.as_deref(),
            location_map: &location_map,
        };
        let mut rng = rand::thread_rng();

        let selection = if view.mode == SelectionMode::RoundRobin {
            // Counter update is atomic with the selection it produced.
            let mut entry = self.rr_index.entry(fqdn.to_string()).or_insert(0);
            let selection = selector::select(
                view.mode,
                &view.backends,
                family,
                client_ip,
                *entry,
                &mut rng,
                &inputs,
            );
            if let Some(next) = selection.next_rr_index {
                *entry = next;
            }
            selection
        } else {
            selector::select(
                view.mode,
                &view.backends,
                family,
                client_ip,
                0,
                &mut rng,
                &inputs,
            )
        };

        if !selection.addresses.is_empty() {
            for address in &selection.addresses {
                metrics::inc_backend_selected(fqdn, &address.to_string());
            }
            return Resolution::Answers {
                addresses: selection.addresses,
                ttl: view.record_ttl,
            };
        }

        debug!(record = %fqdn, "No healthy backend, falling back to all enabled");
        let fallback = selector::all_enabled(&view.backends, family);
        if fallback.is_empty() {
            Resolution::NoBackend
        } else {
            Resolution::Answers {
                addresses: fallback,
                ttl: view.record_ttl,
            }
        }
    }

    pub async fn record_view(&self, fqdn: &str) -> Option<RecordView> {
        let record = { self.records.read().await.get(fqdn).cloned() };
        match record {
            Some(record) => Some(record.view().await),
            None => None,
        }
    }

    /// Snapshot of every zone for the overview API. Configured zones
    /// always appear, even when they hold no records.
    pub async fn overview(&self) -> BTreeMap<String, Vec<RecordView>> {
        let mut out: BTreeMap<String, Vec<RecordView>> = self
            .zones
            .iter()
            .map(|(zone, _)| (zone.clone(), Vec::new()))
            .collect();

        let records: Vec<Arc<Record>> = self.records.read().await.values().cloned().collect();
        for record in records {
            let view = record.view().await;
            out.entry(view.zone.clone()).or_default().push(view);
        }
        for views in out.values_mut() {
            views.sort_by(|a, b| a.fqdn.cmp(&b.fqdn));
        }
        out
    }

    pub async fn zone_overview(&self, zone: &str) -> Option<Vec<RecordView>> {
        if !self.has_zone(zone) {
            return None;
        }
        Some(self.overview().await.remove(zone).unwrap_or_default())
    }

    /// Number of live records (all zones).
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Fetch a record cell; test and reconciliation helper.
    pub async fn record(&self, fqdn: &str) -> Option<Arc<Record>> {
        self.records.read().await.get(fqdn).cloned()
    }

    /// Cancel every scheduler; used on shutdown.
    pub async fn shutdown(&self) {
        let records = self.records.read().await;
        for record in records.values() {
            record.cancel();
        }
    }
}

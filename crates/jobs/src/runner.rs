use std::sync::Arc;

use tracing::info;

use crate::{LocationMapWatcherJob, ZoneWatcherJob};

/// Central orchestrator for all background jobs.
///
/// Register jobs with the builder, then call `.start()` once.
pub struct JobRunner {
    zone_watcher: Option<ZoneWatcherJob>,
    location_watcher: Option<LocationMapWatcherJob>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            zone_watcher: None,
            location_watcher: None,
        }
    }

    pub fn with_zone_watcher(mut self, job: ZoneWatcherJob) -> Self {
        self.zone_watcher = Some(job);
        self
    }

    pub fn with_location_watcher(mut self, job: LocationMapWatcherJob) -> Self {
        self.location_watcher = Some(job);
        self
    }

    /// Start all registered background jobs.
    pub async fn start(self) {
        info!("Starting background job runner");

        if let Some(job) = self.zone_watcher {
            Arc::new(job).start().await;
        }

        if let Some(job) = self.location_watcher {
            Arc::new(job).start().await;
        }

        info!("All background jobs started");
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}

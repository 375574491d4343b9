use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use gslb_application::ports::ZoneFileStore;
use gslb_infrastructure::gslb::Registry;
use gslb_infrastructure::metrics;

use crate::watch::FileWatch;

/// Watches every configured zone file and reconciles the registry on
/// change. A failed parse leaves the running state untouched.
pub struct ZoneWatcherJob {
    registry: Arc<Registry>,
    store: Arc<dyn ZoneFileStore>,
    shutdown: CancellationToken,
}

impl ZoneWatcherJob {
    pub fn new(registry: Arc<Registry>, store: Arc<dyn ZoneFileStore>) -> Self {
        Self {
            registry,
            store,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(zones = self.registry.zones().len(), "Starting zone file watchers");

        for (zone, path) in self.registry.zones().to_vec() {
            let job = Arc::clone(&self);
            let shutdown = self.shutdown.clone();
            tokio::spawn(async move {
                let mut watch = match FileWatch::new(&path, shutdown) {
                    Ok(watch) => watch,
                    Err(e) => {
                        error!(path, error = %e, "Failed to watch zone file");
                        return;
                    }
                };

                while watch.changed().await.is_some() {
                    debug!(path, zone, "Zone file modified");
                    job.reload(&zone, &path).await;
                }
                info!(zone, "Zone watcher shutting down");
            });
        }
    }

    /// One reload attempt: parse, validate, reconcile.
    pub async fn reload(&self, zone: &str, path: &str) {
        match self.store.load(path).await {
            Ok(config) => match self.registry.load_zone(zone, &config).await {
                Ok(()) => {
                    metrics::inc_config_reload(true);
                    debug!(zone, "Configuration reloaded successfully");
                }
                Err(e) => {
                    metrics::inc_config_reload(false);
                    error!(zone, error = %e, "Failed to apply reloaded config");
                }
            },
            Err(e) => {
                metrics::inc_config_reload(false);
                error!(zone, path, error = %e, "Failed to reload config");
            }
        }
    }
}

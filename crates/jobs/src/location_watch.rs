use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use gslb_infrastructure::geoip;
use gslb_infrastructure::gslb::Registry;

use crate::watch::FileWatch;

/// Watches the custom location map and swaps it into the registry on
/// change.
pub struct LocationMapWatcherJob {
    registry: Arc<Registry>,
    path: String,
    shutdown: CancellationToken,
}

impl LocationMapWatcherJob {
    pub fn new(registry: Arc<Registry>, path: String) -> Self {
        Self {
            registry,
            path,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(path = %self.path, "Starting custom location map watcher");

        let job = Arc::clone(&self);
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            let mut watch = match FileWatch::new(&job.path, shutdown) {
                Ok(watch) => watch,
                Err(e) => {
                    error!(path = %job.path, error = %e, "Failed to watch location map");
                    return;
                }
            };

            while watch.changed().await.is_some() {
                debug!(path = %job.path, "Custom location map modified");
                match geoip::load_location_map(&job.path) {
                    Ok(map) => job.registry.set_location_map(map),
                    Err(e) => {
                        error!(path = %job.path, error = %e, "Failed to reload custom location map")
                    }
                }
            }
            info!("Location map watcher shutting down");
        });
    }
}

//! GSLB daemon entry point: configuration, registry, watchers, and the
//! DNS + API servers.

mod bootstrap;
mod server;

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use gslb_api::AppState;
use gslb_application::ports::{GeoLookup, ZoneFileStore};
use gslb_application::BulkSetBackendEnableUseCase;
use gslb_domain::{CliOverrides, LocationMap};
use gslb_infrastructure::dns::GslbHandler;
use gslb_infrastructure::geoip::{self, MaxMindGeo};
use gslb_infrastructure::gslb::{Registry, RegistrySettings};
use gslb_infrastructure::zonefile::YamlZoneFileStore;
use gslb_jobs::{JobRunner, LocationMapWatcherJob, ZoneWatcherJob};

#[derive(Parser)]
#[command(name = "gslb")]
#[command(version)]
#[command(about = "Authoritative DNS responder with health-checked, geo-aware backends")]
struct Cli {
    /// Path to the daemon configuration file
    #[arg(short, long, default_value = "/etc/gslb/gslb.toml")]
    config: String,

    /// Override the DNS bind address
    #[arg(long)]
    dns_listen_addr: Option<String>,

    /// Override the DNS port
    #[arg(long)]
    dns_listen_port: Option<u16>,

    /// Override the API port
    #[arg(long)]
    api_listen_port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bootstrap::logging::init_logging();

    let cli = Cli::parse();
    let config = bootstrap::config::load_config(
        &cli.config,
        CliOverrides {
            dns_listen_addr: cli.dns_listen_addr,
            dns_listen_port: cli.dns_listen_port,
            api_listen_port: cli.api_listen_port,
        },
    )?;

    let prometheus = bootstrap::telemetry::init_metrics(config.metrics_listen_addr.as_deref())?;

    // Geo context: MaxMind databases and the custom location map.
    let geo: Option<Arc<dyn GeoLookup>> = if config.geoip.maxmind.any_configured() {
        Some(Arc::new(MaxMindGeo::open(&config.geoip.maxmind)?))
    } else {
        None
    };
    let location_map = match config.geoip.custom.as_deref() {
        Some(path) => geoip::load_location_map(path)?,
        None => LocationMap::default(),
    };

    let registry = Registry::new(
        config.normalized_zones(),
        geo,
        location_map,
        RegistrySettings {
            max_stagger_start: config.max_stagger_start(),
            batch_size_start: config.batch_size_start,
            resolution_idle_timeout: config.resolution_idle_timeout(),
            healthcheck_idle_multiplier: config.healthcheck_idle_multiplier,
        },
    );

    // Initial zone load; schedulers start stagger-batched.
    let store: Arc<dyn ZoneFileStore> = Arc::new(YamlZoneFileStore::new());
    for (zone, path) in registry.zones().to_vec() {
        let zone_config = store.load(&path).await?;
        registry.load_zone(&zone, &zone_config).await?;
    }
    info!(records = registry.record_count().await, "Initial zone load complete");

    // Background watchers keep the live state in sync with the files.
    let shutdown = CancellationToken::new();
    let mut runner = JobRunner::new().with_zone_watcher(
        ZoneWatcherJob::new(registry.clone(), store.clone())
            .with_cancellation(shutdown.clone()),
    );
    if let Some(path) = config.geoip.custom.clone() {
        runner = runner.with_location_watcher(
            LocationMapWatcherJob::new(registry.clone(), path)
                .with_cancellation(shutdown.clone()),
        );
    }
    runner.start().await;

    if config.api.enable {
        let state = AppState {
            registry: registry.clone(),
            bulk_backends: Arc::new(BulkSetBackendEnableUseCase::new(store.clone())),
            basic_auth: config
                .api
                .basic_auth()
                .map(|(user, pass)| (user.to_string(), pass.to_string())),
            prometheus,
        };
        let api_config = config.api.clone();
        tokio::spawn(async move {
            if let Err(e) = server::api::start_api_server(api_config, state).await {
                error!(error = %e, "API server terminated");
            }
        });
    }

    let handler = GslbHandler::new(
        registry.clone(),
        config.use_edns_csubnet,
        config.disable_txt,
    );
    let dns_bind = format!("{}:{}", config.dns_listen_addr, config.dns_listen_port);

    tokio::select! {
        result = server::dns::start_dns_server(dns_bind, handler) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    shutdown.cancel();
    registry.shutdown().await;
    info!("Shutdown complete");

    Ok(())
}

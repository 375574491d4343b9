use std::sync::Arc;
use std::time::Duration;

use gslb_application::ports::HealthProbe;
use gslb_domain::BackendConfig;
use gslb_infrastructure::gslb::Backend;

mod helpers;
use helpers::StaticProbe;

fn backend_config(address: &str) -> BackendConfig {
    let yaml = format!("address: {address}");
    serde_yaml::from_str(&yaml).unwrap()
}

fn cell(probes: Vec<Arc<dyn HealthProbe>>) -> Backend {
    Backend::with_probes("web.example.com.", &backend_config("192.0.2.1"), probes)
}

#[tokio::test]
async fn alive_requires_every_probe_to_succeed() {
    // Arrange
    let all_ok = cell(vec![StaticProbe::ok(), StaticProbe::ok()]);
    let one_failing = cell(vec![StaticProbe::ok(), StaticProbe::failing()]);

    // Act
    all_ok.run_probes(0, Duration::from_secs(1)).await;
    one_failing.run_probes(0, Duration::from_secs(1)).await;

    // Assert - AND aggregation
    assert!(all_ok.is_healthy().await);
    assert!(!one_failing.is_healthy().await);
}

#[tokio::test]
async fn no_probes_means_vacuously_alive() {
    let backend = cell(vec![]);
    backend.run_probes(0, Duration::from_secs(1)).await;
    assert!(backend.is_healthy().await);
}

#[tokio::test]
async fn panicking_probe_counts_as_failed() {
    let backend = cell(vec![StaticProbe::ok(), StaticProbe::panicking()]);
    backend.run_probes(0, Duration::from_secs(1)).await;
    assert!(!backend.is_healthy().await);
}

#[tokio::test]
async fn probe_exceeding_deadline_counts_as_failed() {
    let backend = cell(vec![StaticProbe::slow(true, Duration::from_secs(5))]);
    backend.run_probes(0, Duration::from_millis(50)).await;
    assert!(!backend.is_healthy().await);
}

#[tokio::test]
async fn one_slow_probe_does_not_fail_the_others() {
    // The slow probe times out; the fast one still reports its result,
    // and the aggregate correctly requires both.
    let backend = cell(vec![
        StaticProbe::ok(),
        StaticProbe::slow(true, Duration::from_secs(5)),
    ]);
    backend.run_probes(0, Duration::from_millis(50)).await;
    assert!(!backend.is_healthy().await);
}

#[tokio::test]
async fn last_healthcheck_is_stamped() {
    let backend = cell(vec![StaticProbe::ok()]);
    assert!(backend.view().await.last_healthcheck.is_none());

    backend.run_probes(0, Duration::from_secs(1)).await;
    assert!(backend.view().await.last_healthcheck.is_some());
}

#[tokio::test]
async fn disabled_backend_is_never_healthy() {
    let mut cfg = backend_config("192.0.2.1");
    cfg.enable = false;
    let backend = Backend::with_probes("web.example.com.", &cfg, vec![StaticProbe::ok()]);

    backend.run_probes(0, Duration::from_secs(1)).await;
    // Probes may still run, but enable gates health.
    assert!(!backend.is_healthy().await);
}

#[tokio::test]
async fn update_from_copies_scalars_but_keeps_address() {
    let backend = cell(vec![StaticProbe::ok()]);
    backend.run_probes(0, Duration::from_secs(1)).await;

    let mut new_cfg = backend_config("192.0.2.1");
    new_cfg.priority = 42;
    new_cfg.enable = false;
    backend.update_from(&new_cfg, vec![]).await;

    let view = backend.view().await;
    assert_eq!(view.priority, 42);
    assert!(!view.enabled);
    // Health survives a scalar update; only the enable gate changed.
    assert!(view.alive);
}

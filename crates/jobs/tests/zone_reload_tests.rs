use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tempfile::NamedTempFile;

use gslb_application::ports::ZoneFileStore;
use gslb_domain::LocationMap;
use gslb_infrastructure::gslb::{Registry, RegistrySettings};
use gslb_infrastructure::zonefile::YamlZoneFileStore;
use gslb_jobs::ZoneWatcherJob;

const GOOD: &str = r#"
records:
  web.example.com.:
    backends:
      - address: 192.0.2.10
  api.example.com.:
    backends:
      - address: 192.0.2.20
"#;

const GOOD_SMALLER: &str = r#"
records:
  web.example.com.:
    backends:
      - address: 192.0.2.10
"#;

const BROKEN: &str = r#"
records:
  web.example.com.:
    scrape_interval: whenever
    backends:
      - address: 192.0.2.10
"#;

fn write_zone(file: &NamedTempFile, content: &str) {
    std::fs::write(file.path(), content).unwrap();
}

fn registry_for(file: &NamedTempFile) -> Arc<Registry> {
    Registry::new(
        vec![(
            "example.com.".to_string(),
            file.path().to_str().unwrap().to_string(),
        )],
        None,
        LocationMap::default(),
        RegistrySettings {
            max_stagger_start: Duration::from_millis(10),
            ..RegistrySettings::default()
        },
    )
}

#[tokio::test]
async fn reload_applies_a_valid_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(GOOD.as_bytes()).unwrap();
    let registry = registry_for(&file);
    let store: Arc<dyn ZoneFileStore> = Arc::new(YamlZoneFileStore::new());
    let job = ZoneWatcherJob::new(registry.clone(), store);

    job.reload("example.com.", file.path().to_str().unwrap())
        .await;
    assert_eq!(registry.record_count().await, 2);

    write_zone(&file, GOOD_SMALLER);
    job.reload("example.com.", file.path().to_str().unwrap())
        .await;
    assert_eq!(registry.record_count().await, 1);
    assert!(registry.record("web.example.com.").await.is_some());
}

#[tokio::test]
async fn failed_parse_leaves_running_state_untouched() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(GOOD.as_bytes()).unwrap();
    let registry = registry_for(&file);
    let store: Arc<dyn ZoneFileStore> = Arc::new(YamlZoneFileStore::new());
    let job = ZoneWatcherJob::new(registry.clone(), store);

    job.reload("example.com.", file.path().to_str().unwrap())
        .await;
    let before = registry.record("web.example.com.").await.unwrap();

    write_zone(&file, BROKEN);
    job.reload("example.com.", file.path().to_str().unwrap())
        .await;

    // Both records survive, and the cells are the same objects.
    assert_eq!(registry.record_count().await, 2);
    let after = registry.record("web.example.com.").await.unwrap();
    assert!(Arc::ptr_eq(&before, &after));
}

use std::io::Write;

use tempfile::NamedTempFile;

use gslb_application::ports::{BackendMatchCriteria, ZoneFileStore};
use gslb_domain::GslbError;
use gslb_infrastructure::zonefile::YamlZoneFileStore;

const ZONE_FILE: &str = r#"
healthcheck_profiles:
  web_tcp:
    type: tcp
    params:
      port: 443
records:
  web.example.com.:
    mode: failover
    owner: platform-team
    backends:
      - address: 192.0.2.10
        priority: 1
        tags: [prod, ssd]
        healthchecks: [web_tcp]
      - address: 192.0.2.11
        tags: [test, hdd]
      - address: 192.0.2.12
        tags: [prod, hdd]
        locations_custom: [eu]
      - address: 192.0.2.13
        tags: [dev]
"#;

fn zone_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(ZONE_FILE.as_bytes()).unwrap();
    file
}

fn tag_criteria(tags: &[&str]) -> BackendMatchCriteria {
    BackendMatchCriteria {
        tags: tags.iter().map(ToString::to_string).collect(),
        ..Default::default()
    }
}

#[tokio::test]
async fn load_parses_and_validates() {
    let file = zone_file();
    let store = YamlZoneFileStore::new();

    let config = store.load(file.path().to_str().unwrap()).await.unwrap();
    let record = &config.records["web.example.com."];
    assert_eq!(record.owner, "platform-team");
    assert_eq!(record.backends.len(), 4);
}

#[tokio::test]
async fn load_rejects_empty_file() {
    let file = NamedTempFile::new().unwrap();
    let store = YamlZoneFileStore::new();

    let err = store.load(file.path().to_str().unwrap()).await.unwrap_err();
    assert!(matches!(err, GslbError::ConfigParse(_)));
}

#[tokio::test]
async fn load_rejects_unresolved_profile() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        br#"
records:
  a.example.com.:
    backends:
      - address: 192.0.2.1
        healthchecks: [missing_profile]
"#,
    )
    .unwrap();
    let store = YamlZoneFileStore::new();

    let err = store.load(file.path().to_str().unwrap()).await.unwrap_err();
    assert!(matches!(err, GslbError::UnresolvedProfile(_)));
}

#[tokio::test]
async fn bulk_disable_by_tags_matches_any_listed_tag() {
    // S5: tags [prod, ssd] over {prod,ssd}, {test,hdd}, {prod,hdd}, {dev}
    let file = zone_file();
    let path = file.path().to_str().unwrap();
    let store = YamlZoneFileStore::new();

    let modified = store
        .set_backends_enable(path, &tag_criteria(&["prod", "ssd"]), false)
        .await
        .unwrap();

    let addresses: Vec<&str> = modified.iter().map(|m| m.address.as_str()).collect();
    assert_eq!(addresses, vec!["192.0.2.10", "192.0.2.12"]);

    // The file reflects enable=false for exactly those two.
    let config = store.load(path).await.unwrap();
    let enables: Vec<bool> = config.records["web.example.com."]
        .backends
        .iter()
        .map(|b| b.enable)
        .collect();
    assert_eq!(enables, vec![false, true, false, true]);
}

#[tokio::test]
async fn enable_round_trip_restores_the_flag() {
    let file = zone_file();
    let path = file.path().to_str().unwrap();
    let store = YamlZoneFileStore::new();
    let criteria = tag_criteria(&["ssd"]);

    store.set_backends_enable(path, &criteria, false).await.unwrap();
    let disabled = store.load(path).await.unwrap();
    assert!(!disabled.records["web.example.com."].backends[0].enable);

    let modified = store.set_backends_enable(path, &criteria, true).await.unwrap();
    assert_eq!(modified.len(), 1);
    let restored = store.load(path).await.unwrap();
    assert!(restored.records["web.example.com."].backends[0].enable);
}

#[tokio::test]
async fn bulk_match_by_location_and_prefix() {
    let file = zone_file();
    let path = file.path().to_str().unwrap();
    let store = YamlZoneFileStore::new();

    let by_location = store
        .set_backends_enable(
            path,
            &BackendMatchCriteria {
                location: Some("eu".to_string()),
                ..Default::default()
            },
            false,
        )
        .await
        .unwrap();
    assert_eq!(by_location.len(), 1);
    assert_eq!(by_location[0].address, "192.0.2.12");

    let by_prefix = store
        .set_backends_enable(
            path,
            &BackendMatchCriteria {
                address_prefix: Some("192.0.2.1".to_string()),
                ..Default::default()
            },
            true,
        )
        .await
        .unwrap();
    // String prefix semantics: every address starting with 192.0.2.1.
    assert_eq!(by_prefix.len(), 4);
}

#[tokio::test]
async fn rewrite_preserves_unrelated_keys() {
    let file = zone_file();
    let path = file.path().to_str().unwrap();
    let store = YamlZoneFileStore::new();

    store
        .set_backends_enable(path, &tag_criteria(&["prod"]), false)
        .await
        .unwrap();

    let config = store.load(path).await.unwrap();
    let record = &config.records["web.example.com."];
    assert_eq!(record.owner, "platform-team");
    // Profile reference survived the rewrite.
    assert_eq!(record.backends[0].healthchecks.len(), 1);
    assert_eq!(record.backends[2].locations_custom, vec!["eu"]);
}

use std::time::Duration;

use gslb_domain::{HealthCheckEntry, RecordConfig, SelectionMode, ZoneConfig};

#[test]
fn record_defaults_match_contract() {
    let record = RecordConfig::default();

    assert_eq!(record.mode, SelectionMode::Failover);
    assert_eq!(record.record_ttl, 30);
    assert_eq!(record.scrape_interval(), Duration::from_secs(10));
    assert_eq!(record.scrape_retries, 1);
    assert_eq!(record.scrape_timeout(), Duration::from_secs(5));
    assert!(record.backends.is_empty());
}

#[test]
fn minimal_record_parses_with_defaults() {
    let yaml = r#"
records:
  web.example.com.:
    backends:
      - address: 192.0.2.1
"#;
    let zone: ZoneConfig = serde_yaml::from_str(yaml).unwrap();
    zone.validate().unwrap();

    let record = &zone.records["web.example.com."];
    assert_eq!(record.mode, SelectionMode::Failover);

    let backend = &record.backends[0];
    assert_eq!(backend.priority, 0);
    assert!(backend.enable);
    assert_eq!(backend.timeout, "5s");
    assert!(backend.tags.is_empty());
    assert!(backend.healthchecks.is_empty());
}

#[test]
fn unknown_mode_is_rejected_at_parse_time() {
    let yaml = r#"
records:
  web.example.com.:
    mode: weighted
    backends:
      - address: 192.0.2.1
"#;
    assert!(serde_yaml::from_str::<ZoneConfig>(yaml).is_err());
}

#[test]
fn mixed_families_in_one_record_are_allowed() {
    let yaml = r#"
records:
  web.example.com.:
    backends:
      - address: 192.0.2.1
      - address: 2001:db8::1
"#;
    let zone: ZoneConfig = serde_yaml::from_str(yaml).unwrap();
    zone.validate().unwrap();

    let record = &zone.records["web.example.com."];
    assert!(record.backends[0].is_ipv4());
    assert!(!record.backends[1].is_ipv4());
}

#[test]
fn healthcheck_entry_accepts_profile_names_and_inline_specs() {
    let yaml = r#"
backends:
  - address: 192.0.2.1
    healthchecks:
      - my_profile
      - type: tcp
        params:
          port: 8080
"#;
    #[derive(serde::Deserialize)]
    struct Wrapper {
        backends: Vec<gslb_domain::BackendConfig>,
    }
    let wrapper: Wrapper = serde_yaml::from_str(yaml).unwrap();
    let checks = &wrapper.backends[0].healthchecks;

    assert!(matches!(&checks[0], HealthCheckEntry::Profile(name) if name == "my_profile"));
    assert!(matches!(&checks[1], HealthCheckEntry::Inline(_)));
}

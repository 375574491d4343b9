use rand::rngs::StdRng;
use rand::SeedableRng;

use gslb_application::selector::{self, SelectorInputs};
use gslb_application::views::{BackendView, Family};
use gslb_domain::{LocationMap, LocationMapConfig, SelectionMode, SubnetLocation};

mod helpers;
use helpers::{addr, backend, backend_at, StaticGeoLookup};

fn empty_map() -> LocationMap {
    LocationMap::default()
}

fn select_simple(
    mode: SelectionMode,
    backends: &[BackendView],
    family: Family,
    rr_index: usize,
) -> selector::Selection {
    let map = empty_map();
    let inputs = SelectorInputs::none(&map);
    let mut rng = StdRng::seed_from_u64(7);
    selector::select(mode, backends, family, None, rr_index, &mut rng, &inputs)
}

// ============================================================================
// Failover
// ============================================================================

#[test]
fn failover_returns_all_backends_at_min_priority() {
    // S1: two prio-10 healthy, one prio-20 healthy
    let backends = vec![
        backend("1.1.1.1", 10, true),
        backend("1.1.1.2", 10, true),
        backend("1.1.1.3", 20, true),
    ];

    let selection = select_simple(SelectionMode::Failover, &backends, Family::V4, 0);
    assert_eq!(selection.addresses, vec![addr("1.1.1.1"), addr("1.1.1.2")]);
}

#[test]
fn failover_skips_unhealthy_tier() {
    let backends = vec![
        backend("1.1.1.1", 10, false),
        backend("1.1.1.2", 20, true),
    ];

    let selection = select_simple(SelectionMode::Failover, &backends, Family::V4, 0);
    assert_eq!(selection.addresses, vec![addr("1.1.1.2")]);
}

#[test]
fn failover_result_shares_min_priority_and_is_empty_iff_no_healthy() {
    let all_dead = vec![
        backend("1.1.1.1", 10, false),
        backend("1.1.1.2", 20, false),
    ];
    assert!(select_simple(SelectionMode::Failover, &all_dead, Family::V4, 0)
        .addresses
        .is_empty());

    let one_alive = vec![
        backend("1.1.1.1", 30, true),
        backend("1.1.1.2", 20, false),
    ];
    let selection = select_simple(SelectionMode::Failover, &one_alive, Family::V4, 0);
    assert_eq!(selection.addresses, vec![addr("1.1.1.1")]);
}

#[test]
fn failover_filters_by_family() {
    let backends = vec![
        backend("2001:db8::1", 10, true),
        backend("1.1.1.1", 20, true),
    ];

    let v4 = select_simple(SelectionMode::Failover, &backends, Family::V4, 0);
    assert_eq!(v4.addresses, vec![addr("1.1.1.1")]);

    let v6 = select_simple(SelectionMode::Failover, &backends, Family::V6, 0);
    assert_eq!(v6.addresses, vec![addr("2001:db8::1")]);
}

#[test]
fn disabled_backend_never_participates() {
    let mut disabled = backend("1.1.1.1", 0, true);
    disabled.enabled = false;
    let backends = vec![disabled, backend("1.1.1.2", 5, true)];

    let selection = select_simple(SelectionMode::Failover, &backends, Family::V4, 0);
    assert_eq!(selection.addresses, vec![addr("1.1.1.2")]);
}

// ============================================================================
// Round-robin
// ============================================================================

#[test]
fn roundrobin_cycles_in_config_order() {
    // S2: four consecutive queries over [A, B, C] -> A, B, C, A
    let backends = vec![
        backend("10.0.0.1", 0, true),
        backend("10.0.0.2", 0, true),
        backend("10.0.0.3", 0, true),
    ];

    let mut index = 0;
    let mut picked = Vec::new();
    for _ in 0..4 {
        let selection = select_simple(SelectionMode::RoundRobin, &backends, Family::V4, index);
        assert_eq!(selection.addresses.len(), 1);
        picked.push(selection.addresses[0]);
        index = selection.next_rr_index.unwrap();
    }

    assert_eq!(
        picked,
        vec![
            addr("10.0.0.1"),
            addr("10.0.0.2"),
            addr("10.0.0.3"),
            addr("10.0.0.1"),
        ]
    );
}

#[test]
fn roundrobin_is_fair_over_many_queries() {
    let backends = vec![
        backend("10.0.0.1", 0, true),
        backend("10.0.0.2", 0, true),
        backend("10.0.0.3", 0, true),
    ];

    let mut counts = std::collections::HashMap::new();
    let mut index = 0;
    for _ in 0..300 {
        let selection = select_simple(SelectionMode::RoundRobin, &backends, Family::V4, index);
        *counts.entry(selection.addresses[0]).or_insert(0u32) += 1;
        index = selection.next_rr_index.unwrap();
    }

    for backend in &backends {
        assert_eq!(counts[&backend.address], 100);
    }
}

#[test]
fn roundrobin_skips_unhealthy_members() {
    let backends = vec![
        backend("10.0.0.1", 0, true),
        backend("10.0.0.2", 0, false),
        backend("10.0.0.3", 0, true),
    ];

    let mut index = 0;
    let mut picked = Vec::new();
    for _ in 0..4 {
        let selection = select_simple(SelectionMode::RoundRobin, &backends, Family::V4, index);
        picked.push(selection.addresses[0]);
        index = selection.next_rr_index.unwrap();
    }

    assert_eq!(
        picked,
        vec![
            addr("10.0.0.1"),
            addr("10.0.0.3"),
            addr("10.0.0.1"),
            addr("10.0.0.3"),
        ]
    );
}

// ============================================================================
// Random
// ============================================================================

#[test]
fn random_returns_every_healthy_backend() {
    let backends = vec![
        backend("10.0.0.1", 0, true),
        backend("10.0.0.2", 0, true),
        backend("10.0.0.3", 0, false),
    ];

    let selection = select_simple(SelectionMode::Random, &backends, Family::V4, 0);
    let mut sorted = selection.addresses.clone();
    sorted.sort();
    assert_eq!(sorted, vec![addr("10.0.0.1"), addr("10.0.0.2")]);
}

#[test]
fn random_is_deterministic_under_a_seeded_rng() {
    let backends = vec![
        backend("10.0.0.1", 0, true),
        backend("10.0.0.2", 0, true),
        backend("10.0.0.3", 0, true),
        backend("10.0.0.4", 0, true),
    ];
    let map = empty_map();
    let inputs = SelectorInputs::none(&map);

    let mut first_rng = StdRng::seed_from_u64(42);
    let first = selector::select(
        SelectionMode::Random,
        &backends,
        Family::V4,
        None,
        0,
        &mut first_rng,
        &inputs,
    );

    let mut second_rng = StdRng::seed_from_u64(42);
    let second = selector::select(
        SelectionMode::Random,
        &backends,
        Family::V4,
        None,
        0,
        &mut second_rng,
        &inputs,
    );

    assert_eq!(first, second);
}

// ============================================================================
// Selector purity
// ============================================================================

#[test]
fn selection_is_pure_for_fixed_inputs() {
    let backends = vec![
        backend("1.1.1.1", 10, true),
        backend("1.1.1.2", 10, true),
        backend("1.1.1.3", 20, true),
    ];

    let first = select_simple(SelectionMode::Failover, &backends, Family::V4, 0);
    for _ in 0..10 {
        let again = select_simple(SelectionMode::Failover, &backends, Family::V4, 0);
        assert_eq!(first, again);
    }
}

// ============================================================================
// GeoIP
// ============================================================================

fn custom_map() -> LocationMap {
    // S3 map: 10.0.0.0/8 -> eu, 192.168.0.0/16 -> us
    let config = LocationMapConfig {
        subnets: vec![
            SubnetLocation {
                subnet: "10.0.0.0/8".to_string(),
                location: "eu".to_string(),
            },
            SubnetLocation {
                subnet: "192.168.0.0/16".to_string(),
                location: "us".to_string(),
            },
        ],
    };
    LocationMap::from_config(&config).unwrap()
}

#[test]
fn geoip_custom_map_matches_client_subnet() {
    // S3: client in 10.0.0.0/8 gets the eu backend
    let backends = vec![
        backend_at("203.0.113.1", "eu"),
        backend_at("203.0.113.2", "us"),
    ];
    let map = custom_map();
    let inputs = SelectorInputs::none(&map);
    let mut rng = StdRng::seed_from_u64(0);

    let selection = selector::select(
        SelectionMode::GeoIp,
        &backends,
        Family::V4,
        Some(addr("10.0.0.5")),
        0,
        &mut rng,
        &inputs,
    );
    assert_eq!(selection.addresses, vec![addr("203.0.113.1")]);
}

#[test]
fn geoip_falls_back_to_failover_when_no_tier_matches() {
    // S3: client 8.8.8.8 matches no subnet -> lowest priority wins
    let mut eu = backend_at("203.0.113.1", "eu");
    eu.priority = 10;
    let mut us = backend_at("203.0.113.2", "us");
    us.priority = 5;
    let backends = vec![eu, us];
    let map = custom_map();
    let inputs = SelectorInputs::none(&map);
    let mut rng = StdRng::seed_from_u64(0);

    let selection = selector::select(
        SelectionMode::GeoIp,
        &backends,
        Family::V4,
        Some(addr("8.8.8.8")),
        0,
        &mut rng,
        &inputs,
    );
    assert_eq!(selection.addresses, vec![addr("203.0.113.2")]);
}

#[test]
fn geoip_country_tier_takes_precedence_and_emits_one_address() {
    let mut fr_a = backend("203.0.113.1", 0, true);
    fr_a.countries = vec!["FR".to_string()];
    let mut fr_b = backend("203.0.113.2", 0, true);
    fr_b.countries = vec!["FR".to_string()];
    let backends = vec![fr_a, fr_b];

    let geo = StaticGeoLookup {
        country: Some("FR".to_string()),
        ..Default::default()
    };
    let map = custom_map();
    let inputs = SelectorInputs {
        geo: Some(&geo),
        location_map: &map,
    };
    let mut rng = StdRng::seed_from_u64(0);

    let selection = selector::select(
        SelectionMode::GeoIp,
        &backends,
        Family::V4,
        Some(addr("10.0.0.5")),
        0,
        &mut rng,
        &inputs,
    );
    // One address per tier: the first healthy match in config order.
    assert_eq!(selection.addresses, vec![addr("203.0.113.1")]);
}

#[test]
fn geoip_asn_tier_used_when_country_and_city_miss() {
    let mut hit = backend("203.0.113.9", 0, true);
    hit.asns = vec![64500];
    let backends = vec![backend("203.0.113.1", 0, true), hit];

    let geo = StaticGeoLookup {
        asn: Some(64500),
        ..Default::default()
    };
    let map = empty_map();
    let inputs = SelectorInputs {
        geo: Some(&geo),
        location_map: &map,
    };
    let mut rng = StdRng::seed_from_u64(0);

    let selection = selector::select(
        SelectionMode::GeoIp,
        &backends,
        Family::V4,
        Some(addr("10.0.0.5")),
        0,
        &mut rng,
        &inputs,
    );
    assert_eq!(selection.addresses, vec![addr("203.0.113.9")]);
}

// ============================================================================
// No-healthy fallback
// ============================================================================

#[test]
fn all_enabled_ignores_alive_but_honors_enable_and_family() {
    let mut disabled = backend("10.0.0.3", 0, false);
    disabled.enabled = false;
    let backends = vec![
        backend("10.0.0.1", 0, false),
        backend("2001:db8::1", 0, false),
        disabled,
    ];

    let fallback = selector::all_enabled(&backends, Family::V4);
    assert_eq!(fallback, vec![addr("10.0.0.1")]);
}

use std::net::IpAddr;

use gslb_application::ports::GeoLookup;
use gslb_application::views::BackendView;

/// Geo lookup returning canned answers for every address.
#[derive(Default)]
pub struct StaticGeoLookup {
    pub country: Option<String>,
    pub city: Option<String>,
    pub asn: Option<u32>,
}

impl GeoLookup for StaticGeoLookup {
    fn country_code(&self, _ip: IpAddr) -> Option<String> {
        self.country.clone()
    }

    fn city_name(&self, _ip: IpAddr) -> Option<String> {
        self.city.clone()
    }

    fn asn(&self, _ip: IpAddr) -> Option<u32> {
        self.asn.clone()
    }
}

pub fn backend(address: &str, priority: i32, alive: bool) -> BackendView {
    BackendView {
        address: address.parse().unwrap(),
        priority,
        alive,
        enabled: true,
        countries: Vec::new(),
        cities: Vec::new(),
        asns: Vec::new(),
        locations: Vec::new(),
        last_healthcheck: None,
    }
}

pub fn backend_at(address: &str, location: &str) -> BackendView {
    BackendView {
        locations: vec![location.to_string()],
        ..backend(address, 0, true)
    }
}

pub fn addr(s: &str) -> IpAddr {
    s.parse().unwrap()
}

use std::net::IpAddr;

/// Read-only geo lookup over the MaxMind databases.
///
/// Every method answers `None` when the corresponding database is not
/// loaded or the address is unknown; a tier answering `None` simply
/// hands over to the next one.
pub trait GeoLookup: Send + Sync {
    /// ISO 3166-1 alpha-2 country code.
    fn country_code(&self, ip: IpAddr) -> Option<String>;

    /// English city name.
    fn city_name(&self, ip: IpAddr) -> Option<String>;

    /// Autonomous system number.
    fn asn(&self, ip: IpAddr) -> Option<u32>;
}

use std::net::IpAddr;

use maxminddb::{geoip2, Reader};
use tracing::info;

use gslb_application::ports::GeoLookup;
use gslb_domain::{GslbError, MaxMindConfig};

/// MaxMind-backed geo lookup. Databases are optional; a missing one
/// just disables its tier.
pub struct MaxMindGeo {
    country: Option<Reader<Vec<u8>>>,
    city: Option<Reader<Vec<u8>>>,
    asn: Option<Reader<Vec<u8>>>,
}

impl MaxMindGeo {
    pub fn open(config: &MaxMindConfig) -> Result<Self, GslbError> {
        let open = |path: &Option<String>, label: &str| -> Result<Option<Reader<Vec<u8>>>, GslbError> {
            match path {
                Some(path) if !path.is_empty() => {
                    let reader = Reader::open_readfile(path).map_err(|e| {
                        GslbError::ConfigValidation(format!(
                            "failed to open {label} MaxMind DB {path}: {e}"
                        ))
                    })?;
                    info!(path, db = label, "MaxMind database loaded");
                    Ok(Some(reader))
                }
                _ => Ok(None),
            }
        };

        Ok(Self {
            country: open(&config.country_db, "country")?,
            city: open(&config.city_db, "city")?,
            asn: open(&config.asn_db, "asn")?,
        })
    }
}

impl GeoLookup for MaxMindGeo {
    fn country_code(&self, ip: IpAddr) -> Option<String> {
        let reader = self.country.as_ref()?;
        let country: geoip2::Country<'_> = reader.lookup(ip).ok()?;
        country
            .country
            .and_then(|c| c.iso_code)
            .map(str::to_string)
    }

    fn city_name(&self, ip: IpAddr) -> Option<String> {
        let reader = self.city.as_ref()?;
        let city: geoip2::City<'_> = reader.lookup(ip).ok()?;
        city.city
            .and_then(|c| c.names)
            .and_then(|names| names.get("en").copied())
            .map(str::to_string)
    }

    fn asn(&self, ip: IpAddr) -> Option<u32> {
        let reader = self.asn.as_ref()?;
        let asn: geoip2::Asn<'_> = reader.lookup(ip).ok()?;
        asn.autonomous_system_number
    }
}

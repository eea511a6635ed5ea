//! IP geolocation backed by MaxMind GeoLite2 databases.

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use maxminddb::{MaxMindDBError, Reader, geoip2};
use serde::Serialize;

use toolbox_core::config::network::NetworkConfig;
use toolbox_core::error::{AppError, ErrorKind};
use toolbox_core::result::AppResult;

use super::address::is_public;
use super::ipcalc::parse_ip;

/// Message when the address is absent from the database.
pub const NOT_IN_DATABASE: &str = "IP address not found in the database.";

/// Geographic and network owner information for one address.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeoRecord {
    /// The address that was looked up, as supplied.
    pub ip: String,
    /// Country name (English).
    pub country: Option<String>,
    /// Most specific subdivision name (English).
    pub region: Option<String>,
    /// City name (English).
    pub city: Option<String>,
    /// `"latitude, longitude"`.
    pub location: Option<String>,
    /// Autonomous system organization.
    pub org: Option<String>,
}

/// Source of geolocation data.
pub trait GeoLocator: Send + Sync + fmt::Debug + 'static {
    /// Look up a public address. `NotFound` when the address is unknown.
    fn locate(&self, ip: IpAddr) -> AppResult<GeoRecord>;
}

/// Validate a raw address and look it up.
///
/// Non-public addresses are rejected before any lookup.
pub fn locate_public(locator: &dyn GeoLocator, raw_ip: &str) -> AppResult<GeoRecord> {
    let ip = parse_ip(raw_ip)?;
    if !is_public(ip) {
        return Err(AppError::validation("The IP address must be public."));
    }
    let mut record = locator.locate(ip)?;
    record.ip = raw_ip.to_string();
    Ok(record)
}

/// Locator reading the GeoLite2 City database and, optionally, the ASN
/// database for the `org` field.
pub struct MaxMindLocator {
    city: Reader<Vec<u8>>,
    asn: Option<Reader<Vec<u8>>>,
}

impl fmt::Debug for MaxMindLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaxMindLocator")
            .field("city", &self.city.metadata.database_type)
            .field("asn", &self.asn.as_ref().map(|r| &r.metadata.database_type))
            .finish()
    }
}

impl MaxMindLocator {
    /// Open the databases. The ASN database is optional.
    pub fn open(city_path: impl AsRef<Path>, asn_path: Option<&Path>) -> AppResult<Self> {
        let city = open_reader(city_path.as_ref())?;
        let asn = asn_path.map(open_reader).transpose()?;
        Ok(Self { city, asn })
    }

    /// Open whatever the configuration points at.
    ///
    /// Returns `None` (and logs why) when the City database is not
    /// configured or cannot be opened; lookups then answer 503. A broken
    /// ASN database only disables the `org` field.
    pub fn from_config(config: &NetworkConfig) -> Option<Arc<dyn GeoLocator>> {
        if config.geoip_city_db.trim().is_empty() {
            tracing::info!("GeoIP city database not configured, IP locator disabled");
            return None;
        }

        let city = match open_reader(Path::new(&config.geoip_city_db)) {
            Ok(reader) => reader,
            Err(e) => {
                tracing::warn!(path = %config.geoip_city_db, error = %e, "IP locator disabled");
                return None;
            }
        };

        let asn = if config.geoip_asn_db.trim().is_empty() {
            None
        } else {
            match open_reader(Path::new(&config.geoip_asn_db)) {
                Ok(reader) => Some(reader),
                Err(e) => {
                    tracing::warn!(path = %config.geoip_asn_db, error = %e, "ASN lookups disabled");
                    None
                }
            }
        };

        tracing::info!(asn = asn.is_some(), "GeoIP databases loaded");
        let locator: Arc<dyn GeoLocator> = Arc::new(Self { city, asn });
        Some(locator)
    }

    fn organization(&self, ip: IpAddr) -> AppResult<Option<String>> {
        let Some(reader) = &self.asn else {
            return Ok(None);
        };
        match reader.lookup::<geoip2::Asn>(ip) {
            Ok(asn) => Ok(asn.autonomous_system_organization.map(str::to_string)),
            Err(MaxMindDBError::AddressNotFoundError(_)) => Ok(None),
            Err(e) => Err(lookup_error(e)),
        }
    }
}

impl GeoLocator for MaxMindLocator {
    fn locate(&self, ip: IpAddr) -> AppResult<GeoRecord> {
        let city: geoip2::City = match self.city.lookup(ip) {
            Ok(city) => city,
            Err(MaxMindDBError::AddressNotFoundError(_)) => {
                return Err(AppError::not_found(NOT_IN_DATABASE));
            }
            Err(e) => return Err(lookup_error(e)),
        };

        let location = city.location.as_ref().and_then(|loc| {
            match (loc.latitude, loc.longitude) {
                (Some(lat), Some(lon)) => Some(format!("{lat}, {lon}")),
                _ => None,
            }
        });

        Ok(GeoRecord {
            ip: ip.to_string(),
            country: english(city.country.as_ref().and_then(|c| c.names.as_ref())),
            region: english(
                city.subdivisions
                    .as_ref()
                    .and_then(|subs| subs.last())
                    .and_then(|s| s.names.as_ref()),
            ),
            city: english(city.city.as_ref().and_then(|c| c.names.as_ref())),
            location,
            org: self.organization(ip)?,
        })
    }
}

fn english(names: Option<&BTreeMap<&str, &str>>) -> Option<String> {
    names.and_then(|n| n.get("en")).map(|s| s.to_string())
}

fn open_reader(path: &Path) -> AppResult<Reader<Vec<u8>>> {
    Reader::open_readfile(path).map_err(|e| {
        AppError::with_source(
            ErrorKind::ServiceUnavailable,
            format!("Failed to open GeoIP database '{}'", path.display()),
            e,
        )
    })
}

fn lookup_error(e: MaxMindDBError) -> AppError {
    AppError::with_source(ErrorKind::ExternalService, format!("GeoIP lookup failed: {e}"), e)
}

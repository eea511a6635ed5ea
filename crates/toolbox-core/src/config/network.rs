//! Network diagnostics configuration.

use serde::{Deserialize, Serialize};

/// Settings for the IP locator and TLS certificate checker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Path to the MaxMind GeoLite2 City database. Empty disables lookups.
    #[serde(default = "default_city_db")]
    pub geoip_city_db: String,
    /// Path to the MaxMind GeoLite2 ASN database. Empty disables `org`.
    #[serde(default = "default_asn_db")]
    pub geoip_asn_db: String,
    /// Port used when connecting to inspect a certificate.
    #[serde(default = "default_tls_port")]
    pub tls_port: u16,
    /// Connect plus handshake timeout for certificate inspection.
    #[serde(default = "default_tls_timeout")]
    pub tls_connect_timeout_seconds: u64,
    /// Honour `X-Forwarded-For` / `X-Real-IP` in `/myip`.
    #[serde(default)]
    pub trust_forwarded_headers: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            geoip_city_db: default_city_db(),
            geoip_asn_db: default_asn_db(),
            tls_port: default_tls_port(),
            tls_connect_timeout_seconds: default_tls_timeout(),
            trust_forwarded_headers: false,
        }
    }
}

fn default_city_db() -> String {
    "/app/GeoLite2-City.mmdb".to_string()
}

fn default_asn_db() -> String {
    "/app/GeoLite2-ASN.mmdb".to_string()
}

fn default_tls_port() -> u16 {
    443
}

fn default_tls_timeout() -> u64 {
    10
}

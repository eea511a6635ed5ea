//! Network diagnostics: subnet arithmetic, address classification,
//! geolocation and TLS certificate inspection.

pub mod address;
pub mod geo;
pub mod ipcalc;
pub mod tls;

pub use address::{ClientAddress, first_forwarded, is_public};
pub use geo::{GeoLocator, GeoRecord, MaxMindLocator, locate_public};
pub use ipcalc::{SubnetInfo, calculate, parse_ip, parse_prefix};
pub use tls::{CertificateInspector, CertificateReport};

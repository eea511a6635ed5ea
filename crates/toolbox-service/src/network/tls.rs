//! TLS certificate inspection.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use serde::Serialize;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use x509_parser::objects::{oid_registry, oid2abbrev};
use x509_parser::x509::X509Name;

use toolbox_core::config::network::NetworkConfig;
use toolbox_core::error::{AppError, ErrorKind};
use toolbox_core::result::AppResult;

/// Summary of the certificate a server presents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateReport {
    /// Domain as requested.
    pub domain: String,
    /// Issuer distinguished name, `/C=../O=../CN=..`.
    pub issuer: String,
    /// Start of validity, ISO-8601 UTC without offset.
    pub valid_from: String,
    /// End of validity, ISO-8601 UTC without offset.
    pub expires_on: String,
    /// Whether the current time is inside the validity window.
    pub is_valid: bool,
}

/// Connects to a domain, completes a verified TLS handshake and reports
/// on the leaf certificate.
#[derive(Clone)]
pub struct CertificateInspector {
    connector: TlsConnector,
    port: u16,
    timeout: Duration,
}

impl fmt::Debug for CertificateInspector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateInspector")
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CertificateInspector {
    /// Build an inspector trusting the Mozilla root set.
    pub fn new(port: u16, timeout: Duration) -> AppResult<Self> {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = ClientConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Failed to set up TLS client", e)
        })?
        .with_root_certificates(roots)
        .with_no_client_auth();

        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            port,
            timeout,
        })
    }

    /// Build an inspector from the `[network]` section.
    pub fn from_config(config: &NetworkConfig) -> AppResult<Self> {
        Self::new(
            config.tls_port,
            Duration::from_secs(config.tls_connect_timeout_seconds),
        )
    }

    /// Inspect the certificate served for `domain`.
    ///
    /// Unresolvable domains are `NotFound`; handshake and verification
    /// failures are `ExternalService` errors prefixed with `SSL error:`.
    pub async fn inspect(&self, domain: &str) -> AppResult<CertificateReport> {
        let server_name = ServerName::try_from(domain.to_string())
            .map_err(|_| AppError::validation("Invalid domain name."))?;

        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((domain, self.port))
            .await
            .map_err(|e| {
                tracing::debug!(domain, error = %e, "Domain resolution failed");
                AppError::not_found("Domain not found.")
            })?
            .collect();
        if addrs.is_empty() {
            return Err(AppError::not_found("Domain not found."));
        }

        let handshake = async {
            let tcp = TcpStream::connect(&addrs[..]).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Connection to {domain}:{} failed: {e}", self.port),
                    e,
                )
            })?;

            let stream = self.connector.connect(server_name, tcp).await.map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, format!("SSL error: {e}"), e)
            })?;

            let (_, session) = stream.get_ref();
            session
                .peer_certificates()
                .and_then(|chain| chain.first())
                .map(|leaf| leaf.as_ref().to_vec())
                .ok_or_else(|| AppError::external("SSL error: no peer certificate presented"))
        };

        let der = tokio::time::timeout(self.timeout, handshake)
            .await
            .map_err(|_| {
                AppError::external(format!(
                    "Timed out after {}s connecting to {domain}",
                    self.timeout.as_secs()
                ))
            })??;

        let report = describe_certificate(domain, &der, Utc::now())?;
        tracing::info!(
            domain,
            expires_on = %report.expires_on,
            is_valid = report.is_valid,
            "Inspected TLS certificate"
        );
        Ok(report)
    }
}

/// Parse a DER certificate and summarize it relative to `now`.
pub fn describe_certificate(
    domain: &str,
    der: &[u8],
    now: DateTime<Utc>,
) -> AppResult<CertificateReport> {
    let (_, cert) = x509_parser::parse_x509_certificate(der).map_err(|e| {
        AppError::external(format!("SSL error: could not parse certificate: {e}"))
    })?;

    let validity = cert.validity();
    let valid_from = to_utc(validity.not_before.timestamp())?;
    let expires_on = to_utc(validity.not_after.timestamp())?;

    Ok(CertificateReport {
        domain: domain.to_string(),
        issuer: format_name(cert.issuer()),
        valid_from: iso(valid_from),
        expires_on: iso(expires_on),
        is_valid: valid_from <= now && now < expires_on,
    })
}

/// Render a distinguished name in the `/KEY=value` form used by OpenSSL.
fn format_name(name: &X509Name<'_>) -> String {
    let mut out = String::new();
    for rdn in name.iter_rdn() {
        for attr in rdn.iter() {
            let oid = attr.attr_type();
            let key = oid2abbrev(oid, oid_registry())
                .map(str::to_string)
                .unwrap_or_else(|_| oid.to_id_string());
            let value = attr
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|_| String::from_utf8_lossy(attr.attr_value().data).into_owned());
            out.push('/');
            out.push_str(&key);
            out.push('=');
            out.push_str(&value);
        }
    }
    out
}

fn to_utc(timestamp: i64) -> AppResult<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| AppError::external("SSL error: certificate date out of range"))
}

fn iso(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S").to_string()
}

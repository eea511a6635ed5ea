//! Network diagnostic handlers.

use std::net::{IpAddr, SocketAddr};

use axum::Json;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::HeaderMap;

use toolbox_core::error::AppError;
use toolbox_service::network::{
    CertificateReport, ClientAddress, GeoRecord, SubnetInfo, calculate, first_forwarded,
    locate_public, parse_ip, parse_prefix,
};

use crate::error::ApiResult;
use crate::state::AppState;

/// GET /myip
pub async fn my_ip(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Json<ClientAddress> {
    let ip = if state.config.network.trust_forwarded_headers {
        forwarded_client(&headers).unwrap_or(peer.ip())
    } else {
        peer.ip()
    };
    Json(ClientAddress::from(ip))
}

/// Client address announced by a reverse proxy, `X-Forwarded-For` first.
fn forwarded_client(headers: &HeaderMap) -> Option<IpAddr> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    header("x-forwarded-for")
        .and_then(first_forwarded)
        .or_else(|| header("x-real-ip").and_then(|v| v.trim().parse().ok()))
}

/// GET /ipcalc/{ip}/{prefix}
pub async fn ip_calc(Path((ip, prefix)): Path<(String, String)>) -> ApiResult<Json<SubnetInfo>> {
    let ip = parse_ip(&ip)?;
    let prefix = parse_prefix(&prefix)?;
    Ok(Json(calculate(ip, prefix)?))
}

/// GET /ip_locator/{ip}
pub async fn ip_locator(
    State(state): State<AppState>,
    Path(ip): Path<String>,
) -> ApiResult<Json<GeoRecord>> {
    let locator = state
        .geo
        .as_deref()
        .ok_or_else(|| AppError::service_unavailable("IP geolocation database is not available."))?;
    Ok(Json(locate_public(locator, &ip)?))
}

/// GET /ssl_cert/{domain}
pub async fn ssl_cert(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> ApiResult<Json<CertificateReport>> {
    Ok(Json(state.tls.inspect(&domain).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwarded_client_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(
            forwarded_client(&headers),
            Some("198.51.100.2".parse().unwrap())
        );

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(
            forwarded_client(&headers),
            Some("203.0.113.7".parse().unwrap())
        );
    }

    #[test]
    fn test_forwarded_client_ignores_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("unknown"));
        assert_eq!(forwarded_client(&headers), None);
    }
}

//! Source address resolution for audit records.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";

/// Resolve the client address: first `X-Forwarded-For` entry, then
/// `X-Real-IP`, then the peer address. IPv6 loopback reads as `127.0.0.1`.
pub fn resolve_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let ip = if let Some(forwarded) = header(FORWARDED_FOR)
        && let Some(first) = forwarded.split(',').map(str::trim).find(|s| !s.is_empty())
    {
        first.to_string()
    } else if let Some(real) = header(REAL_IP) {
        real.to_string()
    } else if let Some(peer) = peer {
        peer.ip().to_string()
    } else {
        return "unknown".to_string();
    };

    if ip == "::1" { "127.0.0.1".to_string() } else { ip }
}

/// Extractor yielding the resolved client address.
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(ClientIp(resolve_client_ip(&parts.headers, peer)))
    }
}

//! Client IP extraction
//!
//! Forwarding headers are honoured only when the connection itself comes
//! from a private or loopback address (i.e. a reverse proxy on the same
//! network). Public peers are recorded as-is so the header cannot be forged.

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::debug;

pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00 // fc00::/7
                || (v6.segments()[0] & 0xffc0) == 0xfe80 // fe80::/10
        }
    }
}

/// Resolve the client IP for a request.
pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    let peer = req.peer_addr().map(|addr| addr.ip());
    client_ip_from_parts(peer, req.headers())
}

/// Core of [`extract_client_ip`], split out so it can be tested without a
/// live connection.
pub fn client_ip_from_parts(peer: Option<IpAddr>, headers: &HeaderMap) -> Option<String> {
    match peer {
        Some(peer_ip) if is_private_or_local(&peer_ip) => {
            if let Some(forwarded) = forwarded_ip_from_headers(headers) {
                debug!("Proxy peer {} forwarded client {}", peer_ip, forwarded);
                return Some(forwarded);
            }
            Some(peer_ip.to_string())
        }
        Some(peer_ip) => Some(peer_ip.to_string()),
        // No socket peer (e.g. in-process test requests)
        None => forwarded_ip_from_headers(headers),
    }
}

/// First entry of `X-Forwarded-For`, falling back to `X-Real-IP`.
///
/// Values that do not parse as an IP (optionally with a port) are ignored.
pub fn forwarded_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(normalize_ip)
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .and_then(normalize_ip)
        })
}

fn normalize_ip(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(ip) = raw.parse::<IpAddr>() {
        return Some(ip.to_string());
    }
    raw.parse::<SocketAddr>().ok().map(|addr| addr.ip().to_string())
}

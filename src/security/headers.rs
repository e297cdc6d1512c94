//! Header handling at the trust boundary.
//!
//! # Responsibilities
//! - Resolve the client identity used as the rate-limit key
//! - Strip hop-by-hop and transport headers before forwarding upstream
//!
//! # Design Decisions
//! - The peer socket address is the identity by default
//! - `X-Forwarded-For` is honored only when explicitly trusted

use std::net::{IpAddr, SocketAddr};

use axum::http::header::{
    HeaderMap, HeaderName, ACCEPT_ENCODING, CONNECTION, CONTENT_ENCODING, CONTENT_LENGTH, HOST,
    TRANSFER_ENCODING,
};

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Headers never copied onto the upstream request.
pub const HOP_BY_HOP: [HeaderName; 6] = [
    CONTENT_LENGTH,
    CONTENT_ENCODING,
    TRANSFER_ENCODING,
    CONNECTION,
    HOST,
    ACCEPT_ENCODING,
];

/// Copy `headers` without the hop-by-hop set.
pub fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let mut clean = headers.clone();
    for name in HOP_BY_HOP.iter() {
        clean.remove(name);
    }
    clean
}

/// Resolve the rate-limit key for a request.
pub fn client_identity(headers: &HeaderMap, peer: SocketAddr, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }
    peer.ip().to_string()
}

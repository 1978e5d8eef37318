//! Per-client rate limiting for login and registration.
//!
//! Uses governor through `tower_governor`, keyed on the client IP. Proxy
//! headers are only read when `STOREFRONT_TRUST_PROXY_HEADERS` is set, since
//! any client can send them.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Proxy headers carrying the original client IP, most trusted first.
const CLIENT_IP_HEADERS: [&str; 3] = ["cf-connecting-ip", "x-real-ip", "x-forwarded-for"];

/// Key extractor on the client IP.
///
/// With `trust_proxy_headers` the proxy headers win and the socket peer is
/// the fallback. Without it only the peer address counts.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor {
    pub trust_proxy_headers: bool,
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        for name in CLIENT_IP_HEADERS.iter().filter(|_| self.trust_proxy_headers) {
            // X-Forwarded-For is a chain; the first entry is the client.
            if let Some(ip) = headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split(',').next())
                .and_then(|s| s.trim().parse::<IpAddr>().ok())
            {
                return Ok(ip);
            }
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Rate limiter for auth endpoints: a burst of 5, then one request every 6
/// seconds per IP. Only a deployment behind a proxy that overwrites the
/// client IP headers should pass `trust_proxy_headers`.
///
/// # Panics
///
/// Never in practice: `per_second(6)` and `burst_size(5)` are valid
/// non-zero values.
#[must_use]
pub fn auth_rate_limiter(trust_proxy_headers: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor { trust_proxy_headers })
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    const BEHIND_PROXY: ClientIpKeyExtractor = ClientIpKeyExtractor {
        trust_proxy_headers: true,
    };
    const DIRECT: ClientIpKeyExtractor = ClientIpKeyExtractor {
        trust_proxy_headers: false,
    };

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/api/auth/login");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_forwarded_chain_uses_first_hop() {
        let req = request(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1")]);
        let ip = BEHIND_PROXY.extract(&req).unwrap();
        assert_eq!(ip.to_string(), "203.0.113.7");
    }

    #[test]
    fn test_cloudflare_header_wins() {
        let req = request(&[
            ("x-forwarded-for", "10.0.0.1"),
            ("cf-connecting-ip", "198.51.100.4"),
        ]);
        let ip = BEHIND_PROXY.extract(&req).unwrap();
        assert_eq!(ip.to_string(), "198.51.100.4");
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let mut req = request(&[("x-forwarded-for", "not-an-ip")]);
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 9], 4242))));
        let ip = BEHIND_PROXY.extract(&req).unwrap();
        assert_eq!(ip.to_string(), "192.0.2.9");
    }

    #[test]
    fn test_no_source_is_an_error() {
        assert!(BEHIND_PROXY.extract(&request(&[])).is_err());
    }

    #[test]
    fn test_spoofed_headers_ignored_without_proxy() {
        let mut req = request(&[
            ("x-forwarded-for", "203.0.113.7"),
            ("cf-connecting-ip", "198.51.100.4"),
        ]);
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 9], 4242))));
        let ip = DIRECT.extract(&req).unwrap();
        assert_eq!(ip.to_string(), "192.0.2.9");
    }

    #[test]
    fn test_headers_alone_are_not_enough_without_proxy() {
        let req = request(&[("x-real-ip", "203.0.113.7")]);
        assert!(DIRECT.extract(&req).is_err());
    }
}

//! Login rate limiting, keyed on the client IP.
//!
//! Forwarded headers count only with `ADMIN_TRUST_PROXY_HEADERS` set.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Headers a fronting proxy may set, checked in order.
const CLIENT_IP_HEADERS: [&str; 3] = ["cf-connecting-ip", "x-real-ip", "x-forwarded-for"];

/// Client IP from proxy headers when they are trusted, else the peer address.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor {
    pub trust_proxy_headers: bool,
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        CLIENT_IP_HEADERS
            .iter()
            .filter(|_| self.trust_proxy_headers)
            .find_map(|name| {
                req.headers()
                    .get(*name)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.split(',').next())
                    .and_then(|s| s.trim().parse::<IpAddr>().ok())
            })
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Burst of 5 login attempts, then one every 6 seconds per IP.
///
/// # Panics
///
/// Never in practice: both values are valid and non-zero.
#[must_use]
pub fn login_rate_limiter(trust_proxy_headers: bool) -> RateLimiterLayer {
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

    #[test]
    fn test_real_ip_header_only_when_trusted() {
        let mut req = Request::builder()
            .header("x-real-ip", "203.0.113.20")
            .body(())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 2], 5000))));
        let trusted = ClientIpKeyExtractor {
            trust_proxy_headers: true,
        };
        assert_eq!(trusted.extract(&req).unwrap().to_string(), "203.0.113.20");

        let direct = ClientIpKeyExtractor {
            trust_proxy_headers: false,
        };
        assert_eq!(direct.extract(&req).unwrap().to_string(), "10.0.0.2");
    }

    #[test]
    fn test_peer_address_without_headers() {
        let mut req = Request::builder().body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([100, 64, 0, 5], 5000))));
        let ip = ClientIpKeyExtractor {
            trust_proxy_headers: true,
        }
        .extract(&req)
        .unwrap();
        assert_eq!(ip.to_string(), "100.64.0.5");
    }
}

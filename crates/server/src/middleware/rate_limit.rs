//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Login is limited per client IP to slow down password guessing.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Key extractor for the client IP.
///
/// Uses the peer address unless `trust_proxy` is set, in which case proxy
/// headers win. Clients can forge those headers, so only trust them when a
/// reverse proxy overwrites them.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor {
    pub trust_proxy: bool,
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        client_ip(req, self.trust_proxy).ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Client IP for a request.
fn client_ip<T>(req: &Request<T>, trust_proxy: bool) -> Option<IpAddr> {
    let peer = || {
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    };
    if !trust_proxy {
        return peer();
    }

    let headers = req.headers();
    // X-Forwarded-For (first IP in the chain)
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<IpAddr>().ok())
        })
        .or_else(peer)
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(6)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter(trust_proxy: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor { trust_proxy })
        .per_second(6) // Replenish 1 token every 6 seconds (~10/minute)
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

    fn with_peer(mut req: Request<()>) -> Request<()> {
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 5000))));
        req
    }

    #[test]
    fn test_forwarded_for_wins_behind_proxy() {
        let req = with_peer(
            Request::builder()
                .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
                .header("x-real-ip", "198.51.100.4")
                .body(())
                .unwrap(),
        );
        assert_eq!(client_ip(&req, true), Some("203.0.113.9".parse().unwrap()));
    }

    #[test]
    fn test_real_ip_then_peer_address_behind_proxy() {
        let req = Request::builder()
            .header("x-real-ip", "198.51.100.4")
            .body(())
            .unwrap();
        assert_eq!(client_ip(&req, true), Some("198.51.100.4".parse().unwrap()));

        let req = with_peer(Request::builder().body(()).unwrap());
        assert_eq!(client_ip(&req, true), Some("192.0.2.1".parse().unwrap()));
    }

    #[test]
    fn test_forged_headers_ignored_without_proxy() {
        let extractor = ClientIpKeyExtractor { trust_proxy: false };
        for forged in ["203.0.113.9", "203.0.113.10", "203.0.113.11"] {
            let req = with_peer(
                Request::builder()
                    .header("x-forwarded-for", forged)
                    .header("x-real-ip", forged)
                    .body(())
                    .unwrap(),
            );
            assert_eq!(extractor.extract(&req).unwrap(), "192.0.2.1".parse::<IpAddr>().unwrap());
        }
    }

    #[test]
    fn test_no_source_is_an_error() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.9")
            .body(())
            .unwrap();
        assert!(ClientIpKeyExtractor { trust_proxy: false }.extract(&req).is_err());
        let req = Request::builder().body(()).unwrap();
        assert!(ClientIpKeyExtractor { trust_proxy: true }.extract(&req).is_err());
    }
}

//! Per-IP rate limiting for the sign-in endpoints.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Proxy headers carrying the client address, most trusted first.
const CLIENT_IP_HEADERS: [&str; 3] = ["cf-connecting-ip", "x-real-ip", "x-forwarded-for"];

/// Keys requests by client IP.
///
/// Proxy headers are only read when `trust_proxy_headers` is set; otherwise
/// the socket peer is the key. Requires the router to be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
#[derive(Debug, Clone, Copy)]
pub struct ClientIpKeyExtractor {
    pub trust_proxy_headers: bool,
}

/// The client address reported by a fronting proxy.
#[must_use]
pub fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    CLIENT_IP_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    })
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let forwarded = if self.trust_proxy_headers {
            forwarded_ip(req.headers())
        } else {
            None
        };
        forwarded
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Login and registration: a burst of 5, then one request every 6 seconds.
///
/// # Panics
///
/// Never in practice: the period and burst are non-zero constants.
#[must_use]
pub fn auth_rate_limiter(trust_proxy_headers: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor {
            trust_proxy_headers,
        })
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("non-zero rate limiter quota");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    #[test]
    fn test_proxy_header_order() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9, 10.0.0.1"));
        assert_eq!(forwarded_ip(&headers), Some("203.0.113.9".parse().unwrap()));

        headers.insert("cf-connecting-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(forwarded_ip(&headers), Some("198.51.100.4".parse().unwrap()));
    }

    fn request(forwarded: Option<&'static str>) -> Request<()> {
        let mut request = Request::new(());
        if let Some(forwarded) = forwarded {
            request
                .headers_mut()
                .insert("x-forwarded-for", HeaderValue::from_static(forwarded));
        }
        let peer: SocketAddr = "192.0.2.7:50000".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        request
    }

    const DIRECT: ClientIpKeyExtractor = ClientIpKeyExtractor {
        trust_proxy_headers: false,
    };
    const PROXIED: ClientIpKeyExtractor = ClientIpKeyExtractor {
        trust_proxy_headers: true,
    };

    #[test]
    fn test_untrusted_headers_are_ignored() {
        let peer = "192.0.2.7".parse::<IpAddr>().unwrap();
        assert_eq!(DIRECT.extract(&request(None)).unwrap(), peer);
        assert_eq!(DIRECT.extract(&request(Some("203.0.113.9"))).unwrap(), peer);
        assert_eq!(DIRECT.extract(&request(Some("203.0.113.10"))).unwrap(), peer);
    }

    #[test]
    fn test_trusted_proxy_header_wins() {
        assert_eq!(
            PROXIED.extract(&request(Some("203.0.113.9"))).unwrap(),
            "203.0.113.9".parse::<IpAddr>().unwrap()
        );
        assert_eq!(
            PROXIED.extract(&request(None)).unwrap(),
            "192.0.2.7".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_no_address_is_an_error() {
        let request = Request::new(());
        assert!(DIRECT.extract(&request).is_err());
        assert!(PROXIED.extract(&request).is_err());
    }
}

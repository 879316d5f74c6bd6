//! Client identification utilities
//!
//! Common functions for identifying the network origin of a request.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Network origin of a login request
///
/// Recorded on the account row as last-login metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOrigin {
    /// Client IP address (from X-Forwarded-For or direct connection)
    pub ip: Option<IpAddr>,
}

impl LoginOrigin {
    pub fn new(ip: Option<IpAddr>) -> Self {
        Self { ip }
    }

    /// Get IP as string (for database storage)
    pub fn ip_string(&self) -> Option<String> {
        self.ip.map(|ip| ip.to_string())
    }
}

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For header first (for reverse proxy setups),
/// then falls back to direct connection IP.
///
/// ## Arguments
/// * `headers` - HTTP request headers
/// * `direct_ip` - Direct connection IP address
///
/// ## Returns
/// The client IP address, or None if not determinable
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    // Check X-Forwarded-For header (first IP in the list)
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first_ip) = xff.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }
    direct_ip
}

/// Extract the full login origin from request headers
pub fn extract_origin(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> LoginOrigin {
    LoginOrigin::new(extract_client_ip(headers, direct_ip))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_client_ip_xff() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("192.168.1.1, 10.0.0.1"),
        );

        let ip = extract_client_ip(&headers, None);
        assert_eq!(ip, Some("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_xff_garbage_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));

        let direct: IpAddr = "10.1.2.3".parse().unwrap();
        let ip = extract_client_ip(&headers, Some(direct));
        assert_eq!(ip, Some(direct));
    }

    #[test]
    fn test_extract_client_ip_direct() {
        let headers = HeaderMap::new();
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        let ip = extract_client_ip(&headers, Some(direct));
        assert_eq!(ip, Some(direct));
    }

    #[test]
    fn test_origin_ip_string() {
        let origin = LoginOrigin::new(Some("192.168.1.1".parse().unwrap()));
        assert_eq!(origin.ip_string(), Some("192.168.1.1".to_string()));

        let origin = LoginOrigin::new(None);
        assert_eq!(origin.ip_string(), None);
    }
}

//! Trusted proxy settings.
//!
//! Forwarding headers are honoured only when the socket peer is a trusted
//! proxy. Anything else is keyed by the peer address, so a client cannot pick
//! its own rate-limit identity.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use shared_types::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustedProxyConfig {
    /// Explicitly trusted proxy addresses.
    pub trusted_proxies: Vec<IpAddr>,
    /// Trust loopback peers (127.0.0.1, ::1).
    pub trust_localhost: bool,
    /// Trust private-range peers (10/8, 172.16/12, 192.168/16, fc00::/7).
    pub trust_private: bool,
    /// Header carrying the client address. Empty disables header lookup.
    pub real_ip_header: String,
    /// Trusted hops in front of the node, the socket peer included. The client
    /// is this many entries from the right of `X-Forwarded-For`.
    pub proxy_count: usize,
}

impl Default for TrustedProxyConfig {
    fn default() -> Self {
        Self {
            trusted_proxies: Vec::new(),
            trust_localhost: true,
            trust_private: false,
            real_ip_header: "x-forwarded-for".to_string(),
            proxy_count: 1,
        }
    }
}

impl TrustedProxyConfig {
    /// Ignore every forwarding header.
    pub fn direct_only() -> Self {
        Self {
            trusted_proxies: Vec::new(),
            trust_localhost: false,
            trust_private: false,
            real_ip_header: String::new(),
            proxy_count: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.real_ip_header.is_empty() && self.proxy_count == 0 {
            return Err(ConfigError::InvalidLimit(
                "proxy_count must be at least 1 when a real IP header is set".into(),
            ));
        }
        Ok(())
    }

    pub fn is_trusted(&self, ip: IpAddr) -> bool {
        self.trusted_proxies.contains(&ip)
            || (self.trust_localhost && ip.is_loopback())
            || (self.trust_private && is_private_ip(ip))
    }

    /// Client address named by the configured header value, if it parses.
    pub fn client_from_header(&self, value: &str) -> Option<IpAddr> {
        if self.real_ip_header.eq_ignore_ascii_case("x-forwarded-for") {
            let hops: Vec<&str> = value.split(',').map(str::trim).collect();
            let index = hops.len().checked_sub(self.proxy_count)?;
            hops.get(index)?.parse().ok()
        } else {
            value.trim().parse().ok()
        }
    }
}

fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_link_local(),
        IpAddr::V6(v6) => (v6.octets()[0] & 0xfe) == 0xfc,
    }
}

//! HTTP listener settings.

use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};
use shared_types::ConfigError;

use super::proxy::TrustedProxyConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Include store error detail in 5xx bodies. Off in production.
    pub expose_error_detail: bool,
    /// Peers whose forwarding headers name the client.
    pub trusted_proxy: TrustedProxyConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            expose_error_detail: false,
            trusted_proxy: TrustedProxyConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.trusted_proxy.validate()?;
        self.bind_addr().map(|_| ())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidEndpoint(format!("invalid host: {}", self.host)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

//! # Node Configuration
//!
//! Defaults for every subsystem, overridden by `TC_*` environment variables.
//!
//! ## Production Requirements
//!
//! - `expose_error_detail` MUST be off when `TC_ENV=production`

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared_store::StoreConfig;
use shared_types::ConfigError;
use tc_01_geo_classifier::GeoClassifierConfig;
use tc_02_rate_limiter::RateLimiterConfig;
use tc_03_batch_validation::ValidationConfig;
use tc_04_claim_ledger::LedgerConfig;
use tc_05_timeline_index::TimelineConfig;
use tc_06_aggregation::AggregationConfig;
use tc_07_api_gateway::GatewayConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            _ => Err(ConfigError::InvalidEnv {
                var: "TC_ENV".into(),
                value: s.to_string(),
            }),
        }
    }
}

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub environment: Environment,
    /// Count rate windows in the shared store instead of per process.
    pub shared_rate_limit: bool,
    pub gateway: GatewayConfig,
    pub store: StoreConfig,
    pub geo: GeoClassifierConfig,
    pub rate_limit: RateLimiterConfig,
    pub validation: ValidationConfig,
    pub ledger: LedgerConfig,
    pub timeline: TimelineConfig,
    pub aggregation: AggregationConfig,
}

impl NodeConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden by `lookup`, which maps a variable name to its value.
    ///
    /// # Environment Variables
    ///
    /// - `TC_ENV`: production | development (default: development)
    /// - `TC_HOST`, `TC_PORT`: listen address (default: 0.0.0.0:8080)
    /// - `TC_GEOCODER_MIRRORS`: comma-separated reverse-geocoder base URLs
    /// - `TC_RATE_LIMIT_MAX`, `TC_RATE_LIMIT_WINDOW_SECS`: fixed-window limit
    /// - `TC_RATE_LIMIT_SHARED`: count windows in the shared store
    /// - `TC_RETENTION_SECS`: timeline retention
    /// - `TC_EXPOSE_ERRORS`: include error detail in 5xx bodies
    ///   (default: on in development, off in production)
    /// - `TC_ACCEPT_UNKNOWN_TERRITORY`: claim cells the geocoder could not classify
    /// - `TC_TRUSTED_PROXIES`: comma-separated proxy IPs whose `X-Forwarded-For`
    ///   is honoured (loopback is always trusted)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(env) = lookup("TC_ENV") {
            config.environment = env.parse()?;
        }
        config.gateway.expose_error_detail = config.environment == Environment::Development;

        if let Some(host) = lookup("TC_HOST") {
            config.gateway.host = host.trim().to_string();
        }
        if let Some(port) = parse_var(&lookup, "TC_PORT")? {
            config.gateway.port = port;
        }
        if let Some(raw) = lookup("TC_GEOCODER_MIRRORS") {
            config.geo.mirrors = raw
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(max) = parse_var(&lookup, "TC_RATE_LIMIT_MAX")? {
            config.rate_limit.max_per_window = max;
        }
        if let Some(secs) = parse_var(&lookup, "TC_RATE_LIMIT_WINDOW_SECS")? {
            config.rate_limit.window = Duration::from_secs(secs);
        }
        if let Some(shared) = parse_flag(&lookup, "TC_RATE_LIMIT_SHARED")? {
            config.shared_rate_limit = shared;
        }
        if let Some(secs) = parse_var(&lookup, "TC_RETENTION_SECS")? {
            config.timeline.retention = Duration::from_secs(secs);
        }
        if let Some(expose) = parse_flag(&lookup, "TC_EXPOSE_ERRORS")? {
            config.gateway.expose_error_detail = expose;
        }
        if let Some(accept) = parse_flag(&lookup, "TC_ACCEPT_UNKNOWN_TERRITORY")? {
            config.ledger.accept_unknown_territory = accept;
        }
        if let Some(raw) = lookup("TC_TRUSTED_PROXIES") {
            config.gateway.trusted_proxy.trusted_proxies = raw
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(|p| {
                    p.parse().map_err(|_| ConfigError::InvalidEnv {
                        var: "TC_TRUSTED_PROXIES".into(),
                        value: p.to_string(),
                    })
                })
                .collect::<Result<Vec<std::net::IpAddr>, _>>()?;
        }

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Validate every subsystem's settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gateway.validate()?;
        self.store.validate()?;
        self.geo.validate()?;
        self.rate_limit.validate()?;
        self.validation.validate()?;
        self.ledger.validate()?;
        self.timeline.validate()?;
        self.aggregation.validate()?;
        Ok(())
    }

    /// Extra checks applied when running in production.
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.is_production() && self.gateway.expose_error_detail {
            return Err(ConfigError::InvalidEnv {
                var: "TC_EXPOSE_ERRORS".into(),
                value: "true is not allowed in production".into(),
            });
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|raw| {
            raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: var.to_string(),
                value: raw.clone(),
            })
        })
        .transpose()
}

fn parse_flag<F>(lookup: &F, var: &str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidEnv {
                var: var.to_string(),
                value: raw.clone(),
            }),
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Result<NodeConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        NodeConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults_validate() {
        let config = from_vars(&[]).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.environment, Environment::Development);
        assert!(config.gateway.expose_error_detail);
        assert_eq!(config.rate_limit.max_per_window, 30);
    }

    #[test]
    fn test_overrides() {
        let config = from_vars(&[
            ("TC_PORT", "9090"),
            ("TC_GEOCODER_MIRRORS", "https://a.example, ,https://b.example"),
            ("TC_RATE_LIMIT_MAX", "5"),
            ("TC_RATE_LIMIT_WINDOW_SECS", "10"),
            ("TC_RETENTION_SECS", "3600"),
            ("TC_ACCEPT_UNKNOWN_TERRITORY", "yes"),
        ])
        .unwrap();
        assert_eq!(config.gateway.port, 9090);
        assert_eq!(config.geo.mirrors, vec!["https://a.example", "https://b.example"]);
        assert_eq!(config.rate_limit.max_per_window, 5);
        assert_eq!(config.rate_limit.window, Duration::from_secs(10));
        assert_eq!(config.timeline.retention, Duration::from_secs(3600));
        assert!(config.ledger.accept_unknown_territory);
    }

    #[test]
    fn test_production_hides_error_detail() {
        let config = from_vars(&[("TC_ENV", "production")]).unwrap();
        assert!(config.is_production());
        assert!(!config.gateway.expose_error_detail);
        assert!(config.validate_for_production().is_ok());

        let config = from_vars(&[("TC_ENV", "production"), ("TC_EXPOSE_ERRORS", "1")]).unwrap();
        assert!(config.validate_for_production().is_err());
    }

    #[test]
    fn test_bad_values_rejected() {
        assert_eq!(
            from_vars(&[("TC_PORT", "eighty")]).unwrap_err(),
            ConfigError::InvalidEnv {
                var: "TC_PORT".into(),
                value: "eighty".into()
            }
        );
        assert!(from_vars(&[("TC_ENV", "staging")]).is_err());
        assert!(from_vars(&[("TC_EXPOSE_ERRORS", "maybe")]).is_err());
        assert!(from_vars(&[("TC_TRUSTED_PROXIES", "10.0.0.1,proxy.local")]).is_err());
    }

    #[test]
    fn test_trusted_proxies_override() {
        let config = from_vars(&[("TC_TRUSTED_PROXIES", "10.0.0.1, ,2001:db8::1")]).unwrap();
        let proxies = &config.gateway.trusted_proxy.trusted_proxies;
        assert_eq!(proxies.len(), 2);
        assert!(config.gateway.trusted_proxy.is_trusted("10.0.0.1".parse().unwrap()));
        assert!(!config.gateway.trusted_proxy.is_trusted("10.0.0.2".parse().unwrap()));
    }

    #[test]
    fn test_retention_shorter_than_online_window_fails_validation() {
        let config = from_vars(&[("TC_RETENTION_SECS", "60")]).unwrap();
        assert!(config.validate().is_err());
    }
}

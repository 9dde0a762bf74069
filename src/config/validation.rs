//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. Validation is a pure
//! function of the config and reports every problem, not just the first.

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("driver.address '{address}' is invalid: {reason}")]
    DriverAddress { address: String, reason: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("timeouts.request_secs ({request_ms}ms) must exceed polling.timeout_ms + polling.interval_ms ({poll_ms}ms)")]
    RequestTimeoutTooShort { request_ms: u64, poll_ms: u64 },

    #[error("polling.screenshots_dir must be set when screenshot_on_fail is enabled")]
    ScreenshotsDir,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Validate a loaded configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if let Err(reason) = check_driver_address(&config.driver.address) {
        errors.push(ValidationError::DriverAddress {
            address: config.driver.address.clone(),
            reason,
        });
    }

    let positive = [
        ("driver.connect_timeout_ms", config.driver.connect_timeout_ms),
        ("polling.timeout_ms", config.polling.timeout_ms),
        ("polling.interval_ms", config.polling.interval_ms),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("limits.max_request_body_bytes", config.limits.max_request_body_bytes as u64),
        ("limits.max_response_body_bytes", config.limits.max_response_body_bytes as u64),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    let request_ms = config.timeouts.request_secs.saturating_mul(1000);
    let poll_ms = config
        .polling
        .timeout_ms
        .saturating_add(config.polling.interval_ms);
    if request_ms <= poll_ms {
        errors.push(ValidationError::RequestTimeoutTooShort { request_ms, poll_ms });
    }

    if config.polling.screenshot_on_fail && config.polling.screenshots_dir.as_os_str().is_empty() {
        errors.push(ValidationError::ScreenshotsDir);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// The forwarding client speaks plain HTTP only.
fn check_driver_address(address: &str) -> Result<(), String> {
    let url = Url::parse(address).map_err(|e| e.to_string())?;
    if url.scheme() != "http" {
        return Err(format!("scheme '{}' is not supported, use http", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("query and fragment are not allowed".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ProxyConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.driver.address = "https://localhost:4444".into();
        config.polling.interval_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3, "{:?}", errors);
        assert!(matches!(errors[0], ValidationError::BindAddress(_)));
        assert!(matches!(errors[1], ValidationError::DriverAddress { .. }));
        assert_eq!(errors[2], ValidationError::Zero("polling.interval_ms"));
    }

    #[test]
    fn test_request_timeout_must_outlast_poll() {
        let mut config = ProxyConfig::default();
        config.timeouts.request_secs = 20;
        config.polling.timeout_ms = 20_000;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::RequestTimeoutTooShort {
                request_ms: 20_000,
                poll_ms: 20_200,
            }]
        );
    }

    #[test]
    fn test_driver_address_with_path_prefix() {
        let mut config = ProxyConfig::default();
        config.driver.address = "http://grid.local:4444/wd/hub".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = ProxyConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}

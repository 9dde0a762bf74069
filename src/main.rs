//! Retrying WebDriver proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                   WAIT PROXY                     │
//!                         │                                                  │
//!   Test client request   │  ┌──────────┐   ┌──────────┐   ┌─────────────┐   │
//!   ──────────────────────┼─▶│  http    │──▶│ routing  │──▶│  rewrite    │   │
//!                         │  │  server  │   │  table   │   │ (is/script) │   │
//!                         │  └──────────┘   └──────────┘   └──────┬──────┘   │
//!                         │                                       │          │
//!                         │                        ┌──────────────┴───────┐  │
//!                         │                        ▼                      ▼  │
//!                         │                 ┌────────────┐        ┌─────────┐│
//!                         │                 │  poller +  │        │forwarder││
//!                         │                 │  verifier  │───────▶│ (pool)  │┼──▶ WebDriver
//!                         │                 └────────────┘        └─────────┘│     server
//!                         │                                                  │
//!                         │  Cross-cutting: request id, logger, recoverer,   │
//!                         │  timeout, metrics, screenshot on poll timeout    │
//!                         └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use wait_proxy::config::{read_config, validate_config, ConfigError, ProxyConfig};
use wait_proxy::lifecycle::{shutdown_signal, Shutdown};
use wait_proxy::observability::{logging, metrics};
use wait_proxy::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "wait-proxy")]
#[command(about = "WebDriver proxy that waits for elements instead of failing fast", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "WAIT_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long, env = "WAIT_PROXY_BIND")]
    bind: Option<String>,

    /// WebDriver server base URL.
    #[arg(long, env = "DRIVER_ADDR")]
    driver: Option<String>,

    /// Poll timeout in milliseconds.
    #[arg(long, env = "WAIT_TIMEOUT_MS")]
    poll_timeout_ms: Option<u64>,

    /// Delay between poll attempts in milliseconds.
    #[arg(long, env = "WAIT_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,

    /// Save a screenshot when a poll times out.
    #[arg(long, env = "SCREENSHOT_ON_FAIL")]
    screenshot_on_fail: Option<bool>,

    /// Directory for timeout screenshots.
    #[arg(long, env = "SCREENSHOTS_PATH")]
    screenshots_dir: Option<PathBuf>,
}

impl Cli {
    fn load(&self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ProxyConfig::default(),
        };
        self.apply_overrides(&mut config);

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Flags and environment win over the file.
    fn apply_overrides(&self, config: &mut ProxyConfig) {
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(driver) = &self.driver {
            config.driver.address = driver.clone();
        }
        if let Some(timeout) = self.poll_timeout_ms {
            config.polling.timeout_ms = timeout;
        }
        if let Some(interval) = self.poll_interval_ms {
            config.polling.interval_ms = interval;
        }
        if let Some(on_fail) = self.screenshot_on_fail {
            config.polling.screenshot_on_fail = on_fail;
        }
        if let Some(dir) = &self.screenshots_dir {
            config.polling.screenshots_dir = dir.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    logging::init_logging(&config.observability);
    tracing::info!("wait-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        driver = %config.driver.address,
        poll_timeout_ms = config.polling.timeout_ms,
        poll_interval_ms = config.polling.interval_ms,
        screenshot_on_fail = config.polling.screenshot_on_fail,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validated above.
        if let Ok(addr) = config.observability.metrics_address.parse::<SocketAddr>() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    HttpServer::new(config).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wait_proxy::config::ValidationError;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "wait-proxy",
            "--driver",
            "http://127.0.0.1:9515",
            "--poll-timeout-ms",
            "3000",
            "--poll-interval-ms",
            "100",
            "--screenshot-on-fail",
            "true",
        ])
        .unwrap();

        // Only explicit flags are asserted; unset ones may come from the environment.
        let mut config = ProxyConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.driver.address, "http://127.0.0.1:9515");
        assert_eq!(config.polling.timeout_ms, 3000);
        assert_eq!(config.polling.interval_ms, 100);
        assert!(config.polling.screenshot_on_fail);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let cli = Cli::try_parse_from(["wait-proxy", "--poll-interval-ms", "0"]).unwrap();
        let mut config = ProxyConfig::default();
        cli.apply_overrides(&mut config);

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::Zero("polling.interval_ms")));
    }
}

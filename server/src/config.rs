//! Service configuration.

use std::net::SocketAddr;
use std::time::Duration;

use idr_rates_fx::{InitializerConfig, ProviderConfig};

/// Main service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// Rate provider client configuration.
    pub provider: ProviderConfig,
    /// Startup initialization configuration.
    pub initializer: InitializerConfig,
    /// Username the USD buy spread is derived from.
    pub github_username: String,
    /// Log level.
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 8080,
            provider: ProviderConfig::default(),
            initializer: InitializerConfig::default(),
            github_username: String::new(),
            log_level: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("IDR_RATES_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Ok(port) = std::env::var("IDR_RATES_LISTEN_PORT") {
            if let Ok(port) = port.parse() {
                config.listen_port = port;
            }
        }

        if let Ok(url) = std::env::var("FRANKFURTER_BASE_URL") {
            config.provider.base_url = url;
        }

        if let Ok(ms) = std::env::var("FRANKFURTER_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                config.provider.timeout = Duration::from_millis(ms);
            }
        }

        if let Ok(secs) = std::env::var("INIT_DEADLINE_SECS") {
            if let Ok(secs) = secs.parse() {
                config.initializer.deadline = Duration::from_secs(secs);
            }
        }

        if let Ok(username) = std::env::var("GITHUB_USERNAME") {
            config.github_username = username;
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.listen_addr, self.listen_port)
            .parse()
            .map_err(|e| format!("Invalid listen address: {}", e))
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_port == 0 {
            return Err("Listen port cannot be 0".to_string());
        }

        self.socket_addr()?;

        if self.provider.base_url.is_empty() {
            return Err("Provider base URL cannot be empty".to_string());
        }

        if !self.provider.base_url.starts_with("http://")
            && !self.provider.base_url.starts_with("https://")
        {
            return Err("Provider base URL must be http or https".to_string());
        }

        if self.provider.timeout.is_zero() {
            return Err("Provider timeout cannot be zero".to_string());
        }

        if self.initializer.deadline.is_zero() {
            return Err("Initialization deadline cannot be zero".to_string());
        }

        Ok(())
    }
}

//! Serve configuration

use serde::{Deserialize, Serialize};

/// Default host the HTTP ingress binds to
pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";

/// Default port the HTTP ingress binds to
pub const DEFAULT_HTTP_PORT: u16 = 8000;

/// Configuration for a serve instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeConfig {
    /// Host the HTTP ingress binds to
    pub http_host: String,
    /// Port the HTTP ingress binds to; 0 asks the OS for an ephemeral port
    pub http_port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
        }
    }
}

impl ServeConfig {
    /// Create a configuration builder
    #[must_use]
    pub fn builder() -> ServeConfigBuilder {
        ServeConfigBuilder::new()
    }
}

/// Builder for [`ServeConfig`]
#[derive(Debug)]
pub struct ServeConfigBuilder {
    config: ServeConfig,
}

impl ServeConfigBuilder {
    /// Create a new builder with defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ServeConfig::default(),
        }
    }

    /// Set the ingress host
    pub fn http_host(mut self, host: impl Into<String>) -> Result<Self, String> {
        let host = host.into();
        if host.is_empty() {
            return Err("HTTP host cannot be empty".to_string());
        }
        self.config.http_host = host;
        Ok(self)
    }

    /// Set the ingress port. Port 0 requests an ephemeral port.
    #[must_use]
    pub const fn http_port(mut self, port: u16) -> Self {
        self.config.http_port = port;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> ServeConfig {
        self.config
    }
}

impl Default for ServeConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServeConfig::default();
        assert_eq!(config.http_host, DEFAULT_HTTP_HOST);
        assert_eq!(config.http_port, DEFAULT_HTTP_PORT);
    }

    #[test]
    fn test_builder_validation() {
        assert!(ServeConfigBuilder::new().http_host("").is_err());

        let config = ServeConfigBuilder::new()
            .http_host("0.0.0.0")
            .unwrap()
            .http_port(0)
            .build();
        assert_eq!(config.http_host, "0.0.0.0");
        assert_eq!(config.http_port, 0);
    }
}

//! Runtime configuration with builder support and environment overlay.
//!
//! # Examples
//!
//! ## Creating a default configuration
//!
//! ```
//! use ray_core::config::RuntimeConfig;
//!
//! let config = RuntimeConfig::default();
//! assert!(config.num_cpus >= 1.0);
//! assert!(!config.minimal);
//! ```
//!
//! ## Using the configuration builder
//!
//! ```
//! use ray_core::config::RuntimeConfigBuilder;
//!
//! let config = RuntimeConfigBuilder::new()
//!     .num_cpus(4.0).unwrap()
//!     .num_gpus(1.0).unwrap()
//!     .resource("memory_gb", 16.0).unwrap()
//!     .build();
//!
//! assert_eq!(config.num_cpus, 4.0);
//! assert_eq!(config.resources.get("memory_gb"), Some(&16.0));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{DEFAULT_MAX_SHAPES_PER_REPORT, MINIMAL_INSTALL_ENV};

/// Configuration for a Ray runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Logical CPU count advertised by this node
    pub num_cpus: f64,
    /// Logical GPU count advertised by this node
    pub num_gpus: f64,
    /// Additional named resources advertised by this node
    pub resources: BTreeMap<String, f64>,
    /// Whether this is a minimal installation (no optional extras expected)
    pub minimal: bool,
    /// Cap on the number of shapes included in one resource-load report
    pub max_shapes_per_report: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let num_cpus = std::thread::available_parallelism()
            .map(|n| n.get() as f64)
            .unwrap_or(1.0);
        Self {
            num_cpus,
            num_gpus: 0.0,
            resources: BTreeMap::new(),
            minimal: false,
            max_shapes_per_report: DEFAULT_MAX_SHAPES_PER_REPORT,
        }
    }
}

impl RuntimeConfig {
    /// Create a configuration builder
    #[must_use]
    pub fn builder() -> RuntimeConfigBuilder {
        RuntimeConfigBuilder::new()
    }

    /// Build the default configuration with the environment overlay applied.
    ///
    /// Recognizes `RAY_MINIMAL=1`, which marks the process as a minimal
    /// installation.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().overlay_env()
    }

    /// Apply the environment overlay to this configuration
    #[must_use]
    pub fn overlay_env(mut self) -> Self {
        if std::env::var(MINIMAL_INSTALL_ENV).as_deref() == Ok("1") {
            self.minimal = true;
        }
        self
    }
}

/// Configuration builder for runtime settings
#[derive(Debug)]
pub struct RuntimeConfigBuilder {
    config: RuntimeConfig,
}

impl RuntimeConfigBuilder {
    /// Create a new configuration builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
        }
    }

    /// Set the advertised CPU count
    ///
    /// # Examples
    ///
    /// ```
    /// use ray_core::config::RuntimeConfigBuilder;
    ///
    /// assert!(RuntimeConfigBuilder::new().num_cpus(2.0).is_ok());
    /// assert!(RuntimeConfigBuilder::new().num_cpus(-1.0).is_err());
    /// ```
    pub fn num_cpus(mut self, num_cpus: f64) -> Result<Self, String> {
        if !num_cpus.is_finite() || num_cpus < 0.0 {
            return Err("CPU count must be finite and non-negative".to_string());
        }
        self.config.num_cpus = num_cpus;
        Ok(self)
    }

    /// Set the advertised GPU count
    pub fn num_gpus(mut self, num_gpus: f64) -> Result<Self, String> {
        if !num_gpus.is_finite() || num_gpus < 0.0 {
            return Err("GPU count must be finite and non-negative".to_string());
        }
        self.config.num_gpus = num_gpus;
        Ok(self)
    }

    /// Add a custom named resource
    pub fn resource(mut self, name: &str, quantity: f64) -> Result<Self, String> {
        if name.is_empty() {
            return Err("Resource name cannot be empty".to_string());
        }
        if !quantity.is_finite() || quantity < 0.0 {
            return Err("Resource quantity must be finite and non-negative".to_string());
        }
        self.config.resources.insert(name.to_string(), quantity);
        Ok(self)
    }

    /// Mark this configuration as a minimal installation
    #[must_use]
    pub const fn minimal(mut self, minimal: bool) -> Self {
        self.config.minimal = minimal;
        self
    }

    /// Set the shape cap for resource-load reports
    pub fn max_shapes_per_report(mut self, max: usize) -> Result<Self, String> {
        if max == 0 {
            return Err("Shape cap cannot be zero".to_string());
        }
        self.config.max_shapes_per_report = max;
        Ok(self)
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> RuntimeConfig {
        self.config
    }
}

impl Default for RuntimeConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();
        assert!(config.num_cpus >= 1.0);
        assert_eq!(config.num_gpus, 0.0);
        assert!(!config.minimal);
        assert_eq!(config.max_shapes_per_report, DEFAULT_MAX_SHAPES_PER_REPORT);
    }

    #[test]
    fn test_builder_validation() {
        assert!(RuntimeConfigBuilder::new().num_cpus(f64::NAN).is_err());
        assert!(RuntimeConfigBuilder::new().num_gpus(-2.0).is_err());
        assert!(RuntimeConfigBuilder::new().resource("", 1.0).is_err());
        assert!(RuntimeConfigBuilder::new().max_shapes_per_report(0).is_err());
    }

    #[test]
    fn test_builder_round_trip() {
        let config = RuntimeConfigBuilder::new()
            .num_cpus(8.0)
            .unwrap()
            .num_gpus(2.0)
            .unwrap()
            .resource("object_store_gb", 4.0)
            .unwrap()
            .minimal(true)
            .max_shapes_per_report(10)
            .unwrap()
            .build();

        assert_eq!(config.num_cpus, 8.0);
        assert_eq!(config.num_gpus, 2.0);
        assert_eq!(config.resources.get("object_store_gb"), Some(&4.0));
        assert!(config.minimal);
        assert_eq!(config.max_shapes_per_report, 10);
    }
}

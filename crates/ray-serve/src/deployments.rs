//! Deployment registry and replica bookkeeping.
//!
//! A deployment names a replicated unit of serving work: how many replicas it
//! wants, what resources each replica occupies on the node, and the route
//! prefix the ingress exposes for it.

use std::collections::HashMap;

use parking_lot::RwLock;
use ray_core::ResourceSet;
use serde::{Deserialize, Serialize};

use crate::error::{ServeError, ServeResult};

/// Configuration for one deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Deployment name
    pub name: String,
    /// Route prefix served by the ingress; defaults to `/<name>`
    pub route_prefix: Option<String>,
    /// Number of replicas to place
    pub num_replicas: u32,
    /// Resources each replica occupies
    pub replica_resources: ResourceSet,
}

impl DeploymentConfig {
    /// Create a deployment configuration with defaults: one replica, one CPU
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            route_prefix: None,
            num_replicas: 1,
            replica_resources: ResourceSet::new().with(ray_core::resources::CPU, 1.0),
        }
    }

    /// Set the route prefix
    #[must_use]
    pub fn with_route_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.route_prefix = Some(prefix.into());
        self
    }

    /// Set the replica count
    #[must_use]
    pub const fn with_num_replicas(mut self, num_replicas: u32) -> Self {
        self.num_replicas = num_replicas;
        self
    }

    /// Set the per-replica resource shape
    #[must_use]
    pub fn with_replica_resources(mut self, resources: ResourceSet) -> Self {
        self.replica_resources = resources;
        self
    }

    /// Route prefix after defaulting
    #[must_use]
    pub fn route(&self) -> String {
        self.route_prefix
            .clone()
            .unwrap_or_else(|| format!("/{}", self.name))
    }

    /// Validate this configuration
    pub fn validate(&self) -> ServeResult<()> {
        if self.name.is_empty() {
            return Err(ServeError::deployment("deployment name cannot be empty"));
        }
        if self.num_replicas == 0 {
            return Err(ServeError::deployment_named(
                "replica count must be positive",
                self.name.clone(),
            ));
        }
        if let Some(prefix) = &self.route_prefix {
            if !prefix.starts_with('/') {
                return Err(ServeError::deployment_named(
                    format!("route prefix {prefix:?} must start with '/'"),
                    self.name.clone(),
                ));
            }
        }
        Ok(())
    }
}

/// A deployment together with its replica placement state
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentRecord {
    /// Deployment configuration
    pub config: DeploymentConfig,
    /// Replicas whose resources are reserved
    pub replicas_running: u32,
    /// Replicas waiting for node resources
    pub replicas_pending: u32,
}

/// One ingress routing table entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Route prefix
    pub route: String,
    /// Deployment the route dispatches to
    pub deployment: String,
}

/// Registry of deployments for one serve instance
#[derive(Debug, Default)]
pub struct DeploymentRegistry {
    records: RwLock<HashMap<String, DeploymentRecord>>,
}

impl DeploymentRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a deployment record. Duplicate names are rejected.
    pub fn insert(&self, record: DeploymentRecord) -> ServeResult<()> {
        let mut records = self.records.write();
        let name = record.config.name.clone();
        if records.contains_key(&name) {
            return Err(ServeError::deployment_named(
                "deployment already exists",
                name,
            ));
        }
        records.insert(name, record);
        Ok(())
    }

    /// Get a deployment record by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<DeploymentRecord> {
        self.records.read().get(name).cloned()
    }

    /// Remove a deployment record by name
    pub fn remove(&self, name: &str) -> Option<DeploymentRecord> {
        self.records.write().remove(name)
    }

    /// Remove and return every record
    pub fn drain(&self) -> Vec<DeploymentRecord> {
        self.records.write().drain().map(|(_, r)| r).collect()
    }

    /// Deployment names in sorted order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.records.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// The ingress routing table, sorted by route
    #[must_use]
    pub fn routes(&self) -> Vec<RouteEntry> {
        let records = self.records.read();
        let mut routes: Vec<RouteEntry> = records
            .values()
            .map(|record| RouteEntry {
                route: record.config.route(),
                deployment: record.config.name.clone(),
            })
            .collect();
        routes.sort_by(|a, b| a.route.cmp(&b.route));
        routes
    }

    /// Number of deployments
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

//! Resource sets, node accounting, and load reporting.
//!
//! A node advertises named resource totals (CPU, GPU, custom quantities).
//! Demand arrives as *shapes* - named quantities requested together. A shape
//! that fits the node's current availability is acquired; a shape that fits
//! the totals but not the current availability is queued; a shape that can
//! never fit is infeasible. The per-shape queue depths, together with
//! caller-reported backlog sizes, make up the resource-load report.
//!
//! The report visits shapes in deterministic order and stops after a
//! configurable number of shapes, so one node with pathological demand
//! diversity cannot flood its reports.

use std::collections::BTreeMap;
use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::RuntimeConfig;

/// Resource name for logical CPUs
pub const CPU: &str = "CPU";

/// Resource name for logical GPUs
pub const GPU: &str = "GPU";

/// A set of named resource quantities.
///
/// Also used as a demand *shape*: the quantities one request needs together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSet(BTreeMap<String, f64>);

impl ResourceSet {
    /// Create an empty resource set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named quantity, returning the updated set.
    ///
    /// Zero quantities are dropped so that shapes normalize to the same key.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, quantity: f64) -> Self {
        if quantity > 0.0 {
            self.0.insert(name.into(), quantity);
        }
        self
    }

    /// Get a quantity by name
    #[must_use]
    pub fn get(&self, name: &str) -> f64 {
        self.0.get(name).copied().unwrap_or(0.0)
    }

    /// Whether the set holds no quantities
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct resource names
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over name/quantity pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, quantity)| (name.as_str(), *quantity))
    }

    /// Whether every quantity in `other` is covered by this set
    #[must_use]
    pub fn subsumes(&self, other: &Self) -> bool {
        other.iter().all(|(name, quantity)| self.get(name) >= quantity)
    }

    /// Canonical key identifying this shape.
    ///
    /// Shapes with the same names and quantities map to the same key; the
    /// BTreeMap ordering makes the key deterministic.
    #[must_use]
    pub fn key(&self) -> String {
        let parts: Vec<String> = self
            .iter()
            .map(|(name, quantity)| format!("{name}:{quantity}"))
            .collect();
        parts.join(",")
    }

    fn subtract(&mut self, other: &Self) {
        for (name, quantity) in other.iter() {
            let remaining = self.get(name) - quantity;
            if remaining > 0.0 {
                self.0.insert(name.to_string(), remaining);
            } else {
                self.0.remove(name);
            }
        }
    }

    fn add_clamped(&mut self, other: &Self, ceiling: &Self) {
        for (name, quantity) in other.iter() {
            let current = self.get(name);
            let restored = (current + quantity).min(ceiling.get(name));
            if restored > 0.0 {
                self.0.insert(name.to_string(), restored);
            }
        }
    }
}

impl fmt::Display for ResourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.key())
    }
}

impl FromIterator<(String, f64)> for ResourceSet {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |set, (name, quantity)| set.with(name, quantity))
    }
}

/// Outcome of trying to acquire a shape against a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The shape fit and its quantities were reserved
    Acquired,
    /// The shape fits the node's totals but not its current availability;
    /// demand was queued
    Queued,
    /// The shape exceeds the node's totals and can never be satisfied here
    Infeasible,
}

/// Queued demand load for one shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeLoad {
    /// The demand shape
    pub shape: ResourceSet,
    /// Requests that fit the node but are waiting for availability
    pub ready_requests_queued: u64,
    /// Requests that can never fit this node
    pub infeasible_requests_queued: u64,
    /// Caller-reported backlog behind this shape
    pub backlog_size: u64,
}

/// Resource-load report for one node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLoad {
    /// Per-shape queue depths, capped at the configured shape limit
    pub shapes: Vec<ShapeLoad>,
    /// Number of shapes with demand before the cap was applied
    pub total_shapes: usize,
    /// Node resource totals
    pub total: ResourceSet,
    /// Node resources currently available
    pub available: ResourceSet,
}

#[derive(Debug)]
struct DemandEntry {
    shape: ResourceSet,
    ready: u64,
    infeasible: u64,
    backlog: u64,
}

impl DemandEntry {
    const fn is_idle(&self) -> bool {
        self.ready == 0 && self.infeasible == 0 && self.backlog == 0
    }
}

#[derive(Debug)]
struct NodeState {
    available: ResourceSet,
    demand: BTreeMap<String, DemandEntry>,
}

/// Resource accounting for one node
#[derive(Debug)]
pub struct NodeResources {
    total: ResourceSet,
    max_shapes_per_report: usize,
    state: RwLock<NodeState>,
}

impl NodeResources {
    /// Create node accounting with the given totals and report shape cap
    #[must_use]
    pub fn new(total: ResourceSet, max_shapes_per_report: usize) -> Self {
        Self {
            state: RwLock::new(NodeState {
                available: total.clone(),
                demand: BTreeMap::new(),
            }),
            total,
            max_shapes_per_report,
        }
    }

    /// Build node accounting from a runtime configuration
    #[must_use]
    pub fn from_config(config: &RuntimeConfig) -> Self {
        let mut total = ResourceSet::new()
            .with(CPU, config.num_cpus)
            .with(GPU, config.num_gpus);
        for (name, quantity) in &config.resources {
            total = total.with(name.clone(), *quantity);
        }
        Self::new(total, config.max_shapes_per_report)
    }

    /// Node resource totals
    #[must_use]
    pub fn total(&self) -> &ResourceSet {
        &self.total
    }

    /// Snapshot of currently available resources
    #[must_use]
    pub fn available(&self) -> ResourceSet {
        self.state.read().available.clone()
    }

    /// Try to reserve a shape's quantities.
    ///
    /// Failure is classified and recorded as queued or infeasible demand for
    /// the next load report.
    pub fn try_acquire(&self, shape: &ResourceSet) -> AcquireOutcome {
        let mut state = self.state.write();
        if state.available.subsumes(shape) {
            state.available.subtract(shape);
            return AcquireOutcome::Acquired;
        }

        let outcome = if self.total.subsumes(shape) {
            AcquireOutcome::Queued
        } else {
            AcquireOutcome::Infeasible
        };
        let entry = state
            .demand
            .entry(shape.key())
            .or_insert_with(|| DemandEntry {
                shape: shape.clone(),
                ready: 0,
                infeasible: 0,
                backlog: 0,
            });
        match outcome {
            AcquireOutcome::Queued => entry.ready += 1,
            AcquireOutcome::Infeasible => entry.infeasible += 1,
            AcquireOutcome::Acquired => unreachable!(),
        }
        outcome
    }

    /// Return a previously acquired shape's quantities.
    ///
    /// Availability never exceeds the node totals, so double release is
    /// clamped rather than corrupting the books.
    pub fn release(&self, shape: &ResourceSet) {
        let mut state = self.state.write();
        state.available.add_clamped(shape, &self.total);
    }

    /// Withdraw one queued request for a shape, e.g. when its caller gave up
    pub fn cancel_queued(&self, shape: &ResourceSet) {
        let mut state = self.state.write();
        let key = shape.key();
        let idle = match state.demand.get_mut(&key) {
            Some(entry) => {
                entry.ready = entry.ready.saturating_sub(1);
                entry.is_idle()
            }
            None => false,
        };
        if idle {
            state.demand.remove(&key);
        }
    }

    /// Record the backlog size waiting behind a shape
    pub fn report_backlog(&self, shape: &ResourceSet, backlog: u64) {
        let mut state = self.state.write();
        let key = shape.key();
        if backlog == 0 && !state.demand.contains_key(&key) {
            return;
        }
        let entry = state
            .demand
            .entry(key.clone())
            .or_insert_with(|| DemandEntry {
                shape: shape.clone(),
                ready: 0,
                infeasible: 0,
                backlog: 0,
            });
        entry.backlog = backlog;
        let idle = entry.is_idle();
        if idle {
            state.demand.remove(&key);
        }
    }

    /// Produce the resource-load report.
    ///
    /// Shapes are visited in key order and the report stops at the configured
    /// cap; `total_shapes` preserves the uncapped count.
    #[must_use]
    pub fn fill_resource_load(&self) -> ResourceLoad {
        let state = self.state.read();
        let shapes = state
            .demand
            .values()
            .take(self.max_shapes_per_report)
            .map(|entry| ShapeLoad {
                shape: entry.shape.clone(),
                ready_requests_queued: entry.ready,
                infeasible_requests_queued: entry.infeasible,
                backlog_size: entry.backlog,
            })
            .collect();
        ResourceLoad {
            shapes,
            total_shapes: state.demand.len(),
            total: self.total.clone(),
            available: state.available.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu(n: f64) -> ResourceSet {
        ResourceSet::new().with(CPU, n)
    }

    #[test]
    fn test_resource_set_basics() {
        let set = ResourceSet::new().with(CPU, 2.0).with(GPU, 1.0).with("zero", 0.0);
        assert_eq!(set.get(CPU), 2.0);
        assert_eq!(set.get("zero"), 0.0);
        assert_eq!(set.len(), 2);
        assert_eq!(set.key(), "CPU:2,GPU:1");
    }

    #[test]
    fn test_subsumes() {
        let node = ResourceSet::new().with(CPU, 4.0).with(GPU, 1.0);
        assert!(node.subsumes(&cpu(4.0)));
        assert!(node.subsumes(&ResourceSet::new()));
        assert!(!node.subsumes(&cpu(5.0)));
        assert!(!node.subsumes(&ResourceSet::new().with("TPU", 1.0)));
    }

    #[test]
    fn test_acquire_release_cycle() {
        let node = NodeResources::new(cpu(2.0), 100);

        assert_eq!(node.try_acquire(&cpu(1.0)), AcquireOutcome::Acquired);
        assert_eq!(node.try_acquire(&cpu(1.0)), AcquireOutcome::Acquired);
        assert_eq!(node.try_acquire(&cpu(1.0)), AcquireOutcome::Queued);
        assert_eq!(node.try_acquire(&cpu(3.0)), AcquireOutcome::Infeasible);

        node.release(&cpu(1.0));
        assert_eq!(node.available().get(CPU), 1.0);
        assert_eq!(node.try_acquire(&cpu(1.0)), AcquireOutcome::Acquired);
    }

    #[test]
    fn test_double_release_is_clamped() {
        let node = NodeResources::new(cpu(2.0), 100);
        assert_eq!(node.try_acquire(&cpu(2.0)), AcquireOutcome::Acquired);
        node.release(&cpu(2.0));
        node.release(&cpu(2.0));
        assert_eq!(node.available().get(CPU), 2.0);
    }

    #[test]
    fn test_load_report_classification() {
        let node = NodeResources::new(cpu(1.0), 100);
        assert_eq!(node.try_acquire(&cpu(1.0)), AcquireOutcome::Acquired);
        assert_eq!(node.try_acquire(&cpu(1.0)), AcquireOutcome::Queued);
        assert_eq!(node.try_acquire(&cpu(1.0)), AcquireOutcome::Queued);
        assert_eq!(node.try_acquire(&cpu(8.0)), AcquireOutcome::Infeasible);

        let load = node.fill_resource_load();
        assert_eq!(load.total_shapes, 2);
        let ready = load
            .shapes
            .iter()
            .find(|s| s.shape == cpu(1.0))
            .expect("queued shape");
        assert_eq!(ready.ready_requests_queued, 2);
        assert_eq!(ready.infeasible_requests_queued, 0);
        let infeasible = load
            .shapes
            .iter()
            .find(|s| s.shape == cpu(8.0))
            .expect("infeasible shape");
        assert_eq!(infeasible.infeasible_requests_queued, 1);
    }

    #[test]
    fn test_report_shape_cap() {
        let node = NodeResources::new(cpu(1.0), 3);
        for i in 0..5 {
            let shape = ResourceSet::new().with(format!("custom{i}"), 1.0);
            assert_eq!(node.try_acquire(&shape), AcquireOutcome::Infeasible);
        }

        let load = node.fill_resource_load();
        assert_eq!(load.shapes.len(), 3);
        assert_eq!(load.total_shapes, 5);

        // Deterministic order: report twice, get the same shapes.
        let again = node.fill_resource_load();
        let keys: Vec<String> = load.shapes.iter().map(|s| s.shape.key()).collect();
        let keys_again: Vec<String> = again.shapes.iter().map(|s| s.shape.key()).collect();
        assert_eq!(keys, keys_again);
    }

    #[test]
    fn test_cancel_and_backlog() {
        let node = NodeResources::new(cpu(1.0), 100);
        assert_eq!(node.try_acquire(&cpu(1.0)), AcquireOutcome::Acquired);
        assert_eq!(node.try_acquire(&cpu(1.0)), AcquireOutcome::Queued);

        node.report_backlog(&cpu(1.0), 7);
        let load = node.fill_resource_load();
        assert_eq!(load.shapes[0].backlog_size, 7);

        node.report_backlog(&cpu(1.0), 0);
        node.cancel_queued(&cpu(1.0));
        let load = node.fill_resource_load();
        assert!(load.shapes.is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = crate::RuntimeConfig::builder()
            .num_cpus(4.0)
            .unwrap()
            .num_gpus(0.0)
            .unwrap()
            .resource("memory_gb", 8.0)
            .unwrap()
            .build();
        let node = NodeResources::from_config(&config);
        assert_eq!(node.total().get(CPU), 4.0);
        assert_eq!(node.total().get(GPU), 0.0);
        assert_eq!(node.total().get("memory_gb"), 8.0);
    }
}

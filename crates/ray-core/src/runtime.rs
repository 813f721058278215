//! Runtime lifecycle and shutdown handling.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::config::RuntimeConfig;
use crate::error::{Error, Result};
use crate::modules::ModuleRegistry;
use crate::resources::{NodeResources, ResourceLoad};

/// Runtime states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeState {
    /// Runtime is starting up
    Starting,
    /// Runtime is running normally
    Running,
    /// Runtime is shutting down
    ShuttingDown,
    /// Runtime has stopped
    Stopped,
}

/// Receiver half of the shutdown broadcast
pub type ShutdownSignal = broadcast::Receiver<()>;

#[derive(Debug)]
struct RuntimeInner {
    config: RuntimeConfig,
    modules: ModuleRegistry,
    node: NodeResources,
    state: RwLock<RuntimeState>,
    shutdown_tx: broadcast::Sender<()>,
}

/// A running Ray runtime.
///
/// Cheap to clone; all clones share the same lifecycle, module registry, and
/// resource accounting.
#[derive(Debug, Clone)]
pub struct Runtime {
    inner: Arc<RuntimeInner>,
}

impl Runtime {
    /// Initialize a runtime from the given configuration.
    ///
    /// Transitions Starting -> Running before returning.
    pub fn init(config: RuntimeConfig) -> Result<Self> {
        let (shutdown_tx, _) = broadcast::channel(16);
        let node = NodeResources::from_config(&config);
        let runtime = Self {
            inner: Arc::new(RuntimeInner {
                modules: ModuleRegistry::new(),
                node,
                state: RwLock::new(RuntimeState::Starting),
                shutdown_tx,
                config,
            }),
        };
        *runtime.inner.state.write() = RuntimeState::Running;
        tracing::info!(
            num_cpus = runtime.inner.config.num_cpus,
            minimal = runtime.inner.config.minimal,
            "Ray runtime started"
        );
        Ok(runtime)
    }

    /// Initialize a runtime with the environment overlay applied
    pub fn init_from_env() -> Result<Self> {
        Self::init(RuntimeConfig::from_env())
    }

    /// Runtime configuration
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// Optional-module registry
    #[must_use]
    pub fn modules(&self) -> &ModuleRegistry {
        &self.inner.modules
    }

    /// Node resource accounting
    #[must_use]
    pub fn node_resources(&self) -> &NodeResources {
        &self.inner.node
    }

    /// Current runtime state
    #[must_use]
    pub fn state(&self) -> RuntimeState {
        *self.inner.state.read()
    }

    /// Whether the runtime is running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == RuntimeState::Running
    }

    /// Whether this runtime belongs to a minimal installation
    #[must_use]
    pub fn is_minimal(&self) -> bool {
        self.inner.config.minimal
    }

    /// Produce the node's resource-load report
    #[must_use]
    pub fn resource_load(&self) -> ResourceLoad {
        self.inner.node.fill_resource_load()
    }

    /// Register an optional module as running.
    ///
    /// Fails with a lifecycle error unless the runtime is running.
    pub fn register_module(&self, name: &str) -> Result<()> {
        self.ensure_running()?;
        self.inner.modules.register(name)
    }

    /// Deregister a running optional module
    pub fn deregister_module(&self, name: &str) -> bool {
        self.inner.modules.deregister(name)
    }

    /// Initiate shutdown. Idempotent.
    pub fn shutdown(&self) {
        {
            let mut state = self.inner.state.write();
            if matches!(*state, RuntimeState::ShuttingDown | RuntimeState::Stopped) {
                return;
            }
            *state = RuntimeState::ShuttingDown;
        }
        tracing::info!("Ray runtime shutdown initiated");
        let _ = self.inner.shutdown_tx.send(());
        *self.inner.state.write() = RuntimeState::Stopped;
        tracing::info!("Ray runtime stopped");
    }

    /// Subscribe to the shutdown broadcast
    #[must_use]
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.inner.shutdown_tx.subscribe()
    }

    /// Get a handle for triggering shutdown from elsewhere
    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            runtime: self.clone(),
        }
    }

    fn ensure_running(&self) -> Result<()> {
        let state = self.state();
        if state == RuntimeState::Running {
            Ok(())
        } else {
            Err(Error::lifecycle(format!(
                "Runtime is not running (state: {state:?})"
            ))
            .with_component("runtime"))
        }
    }
}

/// Handle for triggering runtime shutdown.
///
/// Cloneable and thread-safe, so signal handlers and subsystems can
/// coordinate shutdown without owning the runtime.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    runtime: Runtime,
}

impl ShutdownHandle {
    /// Trigger runtime shutdown
    pub fn shutdown(&self) {
        self.runtime.shutdown();
    }

    /// Check if shutdown has been initiated
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        matches!(
            self.runtime.state(),
            RuntimeState::ShuttingDown | RuntimeState::Stopped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::modules::SERVE_MODULE;

    fn test_runtime() -> Runtime {
        let config = RuntimeConfig::builder().num_cpus(2.0).unwrap().build();
        Runtime::init(config).unwrap()
    }

    #[test]
    fn test_init_reaches_running() {
        let runtime = test_runtime();
        assert_eq!(runtime.state(), RuntimeState::Running);
        assert!(runtime.is_running());
        assert!(!runtime.is_minimal());
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let runtime = test_runtime();
        runtime.shutdown();
        assert_eq!(runtime.state(), RuntimeState::Stopped);
        runtime.shutdown();
        assert_eq!(runtime.state(), RuntimeState::Stopped);
    }

    #[test]
    fn test_register_after_shutdown_fails() {
        let runtime = test_runtime();
        runtime.shutdown();
        let error = runtime.register_module(SERVE_MODULE).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Lifecycle);
    }

    #[test]
    fn test_clones_share_state() {
        let runtime = test_runtime();
        let clone = runtime.clone();
        runtime.register_module(SERVE_MODULE).unwrap();
        assert!(clone.modules().is_running(SERVE_MODULE));
        clone.shutdown();
        assert_eq!(runtime.state(), RuntimeState::Stopped);
    }

    #[tokio::test]
    async fn test_shutdown_signal_delivery() {
        let runtime = test_runtime();
        let mut signal = runtime.shutdown_signal();
        let handle = runtime.shutdown_handle();
        assert!(!handle.is_shutting_down());

        handle.shutdown();
        assert!(handle.is_shutting_down());
        signal.recv().await.expect("shutdown broadcast");
    }
}

//! # Ray Serve
//!
//! Serving subsystem for the Ray runtime: deployments with replica resource
//! management, an HTTP ingress, and graceful shutdown.
//!
//! This crate is an optional extra. The `ray` facade only links it when built
//! with the `serve` feature; a minimal installation answers every entry point
//! with a module-not-found error instead.
//!
//! ## Example
//!
//! ```no_run
//! use ray_core::{Runtime, RuntimeConfig};
//! use ray_serve::{DeploymentConfig, ServeConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = Runtime::init(RuntimeConfig::default())?;
//! let serve = ray_serve::start_with(ServeConfig::default(), runtime).await?;
//!
//! serve.deploy(DeploymentConfig::new("echo"))?;
//! serve.shutdown().await?;
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all
)]
#![deny(unsafe_code)]

pub mod config;
pub mod deployments;
pub mod error;

mod ingress;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use ray_core::modules::SERVE_MODULE;
use ray_core::{AcquireOutcome, ErrorKind, Runtime};

pub use config::{DEFAULT_HTTP_HOST, DEFAULT_HTTP_PORT, ServeConfig, ServeConfigBuilder};
pub use deployments::{DeploymentConfig, DeploymentRecord, DeploymentRegistry, RouteEntry};
pub use error::{ServeError, ServeResult};

use ingress::{AppState, build_router};

/// Start serving with default configuration on a fresh runtime.
///
/// The runtime configuration is taken from the environment, matching what a
/// plain `serve.start()` does for users who did not init Ray themselves.
pub async fn start() -> ServeResult<Serve> {
    let runtime = Runtime::init_from_env().map_err(ServeError::Runtime)?;
    start_with(ServeConfig::default(), runtime).await
}

/// Start serving on an existing runtime.
///
/// Registers the serve module with the runtime, binds the HTTP ingress, and
/// spawns it with graceful shutdown wired to both the serve handle and the
/// runtime's shutdown broadcast.
pub async fn start_with(config: ServeConfig, runtime: Runtime) -> ServeResult<Serve> {
    if let Err(e) = runtime.register_module(SERVE_MODULE) {
        if e.kind == ErrorKind::AlreadyExists {
            return Err(ServeError::AlreadyRunning);
        }
        return Err(ServeError::Runtime(e));
    }

    let listener =
        match tokio::net::TcpListener::bind((config.http_host.as_str(), config.http_port)).await {
            Ok(listener) => listener,
            Err(e) => {
                runtime.deregister_module(SERVE_MODULE);
                return Err(ServeError::Ingress(e));
            }
        };
    let local_addr = listener.local_addr()?;

    let deployments = Arc::new(DeploymentRegistry::new());
    let app = build_router(AppState {
        runtime: runtime.clone(),
        deployments: Arc::clone(&deployments),
    });

    let (shutdown_tx, mut shutdown_rx) = broadcast::channel(4);

    // Runtime shutdown also drains the ingress.
    let forward_tx = shutdown_tx.clone();
    let mut runtime_shutdown = runtime.shutdown_signal();
    tokio::spawn(async move {
        let _ = runtime_shutdown.recv().await;
        let _ = forward_tx.send(());
    });

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = shutdown_rx.recv().await;
    });
    let ingress = tokio::spawn(async move {
        if let Err(e) = server.await {
            tracing::error!(error = %e, "Serve ingress terminated with an error");
        }
    });

    tracing::info!(%local_addr, "Serve started");

    Ok(Serve {
        config,
        runtime,
        deployments,
        local_addr,
        shutdown_tx,
        ingress,
    })
}

/// A running serve instance
#[derive(Debug)]
pub struct Serve {
    config: ServeConfig,
    runtime: Runtime,
    deployments: Arc<DeploymentRegistry>,
    local_addr: SocketAddr,
    shutdown_tx: broadcast::Sender<()>,
    ingress: JoinHandle<()>,
}

impl Serve {
    /// Serve configuration
    #[must_use]
    pub const fn config(&self) -> &ServeConfig {
        &self.config
    }

    /// The runtime this instance is attached to
    #[must_use]
    pub const fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Address the HTTP ingress is bound to
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Whether this instance is still registered as running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.runtime.modules().is_running(SERVE_MODULE)
    }

    /// The ingress routing table
    #[must_use]
    pub fn routes(&self) -> Vec<RouteEntry> {
        self.deployments.routes()
    }

    /// Get a deployment's record
    #[must_use]
    pub fn deployment(&self, name: &str) -> Option<DeploymentRecord> {
        self.deployments.get(name)
    }

    /// Create a deployment, placing its replicas on the node.
    ///
    /// Replicas that fit current availability start immediately; replicas
    /// that fit the node's totals but not its availability are left pending
    /// as queued demand. A replica shape that can never fit the node fails
    /// the whole deployment and rolls back what was placed.
    pub fn deploy(&self, config: DeploymentConfig) -> ServeResult<()> {
        config.validate()?;
        if self.deployments.get(&config.name).is_some() {
            return Err(ServeError::deployment_named(
                "deployment already exists",
                config.name,
            ));
        }

        let node = self.runtime.node_resources();
        let shape = &config.replica_resources;
        let mut running = 0u32;
        let mut pending = 0u32;
        for _ in 0..config.num_replicas {
            match node.try_acquire(shape) {
                AcquireOutcome::Acquired => running += 1,
                AcquireOutcome::Queued => pending += 1,
                AcquireOutcome::Infeasible => {
                    for _ in 0..running {
                        node.release(shape);
                    }
                    for _ in 0..pending {
                        node.cancel_queued(shape);
                    }
                    return Err(ServeError::deployment_named(
                        format!("replica shape {shape} can never fit this node"),
                        config.name.clone(),
                    ));
                }
            }
        }

        tracing::info!(
            deployment = %config.name,
            route = %config.route(),
            running,
            pending,
            "Deployment created"
        );
        self.deployments.insert(DeploymentRecord {
            config,
            replicas_running: running,
            replicas_pending: pending,
        })
    }

    /// Delete a deployment, returning its replica resources to the node
    pub fn delete_deployment(&self, name: &str) -> ServeResult<()> {
        let record = self
            .deployments
            .remove(name)
            .ok_or_else(|| ServeError::deployment_named("no such deployment", name.to_string()))?;
        self.release_record(&record);
        tracing::info!(deployment = %name, "Deployment deleted");
        Ok(())
    }

    /// Shut down this serve instance.
    ///
    /// Releases replica resources, drains the HTTP ingress, and deregisters
    /// the serve module from the runtime.
    pub async fn shutdown(self) -> ServeResult<()> {
        for record in self.deployments.drain() {
            self.release_record(&record);
        }
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.ingress.await {
            tracing::warn!(error = %e, "Serve ingress task did not shut down cleanly");
        }
        self.runtime.deregister_module(SERVE_MODULE);
        tracing::info!("Serve stopped");
        Ok(())
    }

    fn release_record(&self, record: &DeploymentRecord) {
        let node = self.runtime.node_resources();
        let shape = &record.config.replica_resources;
        for _ in 0..record.replicas_running {
            node.release(shape);
        }
        for _ in 0..record.replicas_pending {
            node.cancel_queued(shape);
        }
    }
}

//! # Ray
//!
//! Facade crate for the Ray runtime. The base installation is deliberately
//! small; heavyweight subsystems ship as optional extras selected through
//! cargo features:
//!
//! | Feature | Extra | Brings in |
//! |---------|-------|-----------|
//! | `serve` | `ray[serve]` | the serving subsystem (`ray-serve`) |
//! | `full`  | everything   | all of the above |
//!
//! A build without an extra still exposes the corresponding module path, but
//! every entry point answers with a module-not-found error that tells the
//! user which extra to install:
//!
//! ```
//! # tokio_test::block_on(async {
//! let outcome = ray::serve::start().await;
//! if !ray::serve::is_available() {
//!     let error = outcome.unwrap_err();
//!     assert!(error.message.contains("install \"ray[serve]\""));
//! }
//! # });
//! ```
//!
//! ## Quick start
//!
//! ```
//! let runtime = ray::init()?;
//! assert!(runtime.is_running());
//! runtime.shutdown();
//! # Ok::<(), Box<ray::Error>>(())
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all
)]
#![deny(unsafe_code)]

pub use ray_core::modules;
pub use ray_core::resources;
pub use ray_core::{
    AcquireOutcome, Error, ErrorKind, MINIMAL_INSTALL_ENV, ModuleDescriptor, ModuleStatus,
    NodeResources, RUNTIME_NAME, RUNTIME_VERSION, ResourceLoad, ResourceSet, Result, Runtime,
    RuntimeConfig, RuntimeConfigBuilder, RuntimeState, ShapeLoad, ShutdownHandle,
    missing_module_error,
};

/// Initialize a Ray runtime with configuration taken from the environment
pub fn init() -> Result<Runtime> {
    init_with(RuntimeConfig::from_env())
}

/// Initialize a Ray runtime with an explicit configuration.
///
/// Marks every compiled-in optional module as bundled so that module lookups
/// reflect the shape of this build.
pub fn init_with(config: RuntimeConfig) -> Result<Runtime> {
    let runtime = Runtime::init(config)?;
    #[cfg(feature = "serve")]
    runtime
        .modules()
        .mark_bundled(ray_core::modules::SERVE_MODULE);
    Ok(runtime)
}

#[cfg(feature = "serve")]
pub mod serve {
    //! Serving subsystem.
    //!
    //! This build carries the `serve` extra; the real implementation lives in
    //! the `ray-serve` crate and is re-exported here.

    pub use ray_serve::{
        DeploymentConfig, DeploymentRecord, RouteEntry, Serve, ServeConfig, ServeConfigBuilder,
        ServeError, ServeResult,
    };

    use crate::{Result, Runtime};

    /// Whether the serving subsystem is compiled into this build
    #[must_use]
    pub const fn is_available() -> bool {
        true
    }

    /// Start serving with default configuration on a fresh runtime
    pub async fn start() -> Result<Serve> {
        ray_serve::start().await.map_err(Into::into)
    }

    /// Start serving on an existing runtime
    pub async fn start_with(config: ServeConfig, runtime: Runtime) -> Result<Serve> {
        ray_serve::start_with(config, runtime)
            .await
            .map_err(Into::into)
    }
}

#[cfg(not(feature = "serve"))]
pub mod serve {
    //! Serving subsystem stub.
    //!
    //! This is a minimal installation: the `serve` extra is not compiled in.
    //! The module path stays importable so callers fail at the call site with
    //! a friendly remediation hint instead of a build error in unrelated
    //! code.

    use ray_core::missing_module_error;
    use ray_core::modules::SERVE_MODULE;

    use crate::Result;

    /// Placeholder for the serve handle. Never constructed in minimal builds.
    #[derive(Debug)]
    pub struct Serve {
        _private: (),
    }

    /// Whether the serving subsystem is compiled into this build
    #[must_use]
    pub const fn is_available() -> bool {
        false
    }

    /// Start serving.
    ///
    /// Always fails in a minimal installation with a module-not-found error
    /// naming the `ray[serve]` extra.
    pub async fn start() -> Result<Serve> {
        Err(missing_module_error(SERVE_MODULE).with_operation("serve.start"))
    }
}

/// Prelude for common Ray functionality
pub mod prelude {
    pub use crate::{
        Error, ErrorKind, Result, Runtime, RuntimeConfig, RuntimeState, ShutdownHandle, init,
        init_with,
    };
}

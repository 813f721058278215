//! # Ray Core
//!
//! Foundation crate for the Ray runtime providing core types, error handling,
//! the optional-module registry, and node resource accounting.
//!
//! ## Features
//!
//! - **Rich Error Handling** - Error types with context information, including
//!   the module-not-found kind used for minimal-installation diagnostics
//! - **Optional Module Registry** - Catalog of optional subsystems with
//!   friendly install hints for modules absent from a minimal installation
//! - **Resource Accounting** - Node resource totals, availability, and
//!   per-shape load reporting
//! - **Runtime Lifecycle** - Init/shutdown with broadcast shutdown signals
//!
//! ## Architecture
//!
//! ```text
//! ray-core/
//! ├── error/          # Error types and handling
//! ├── config/         # Runtime configuration with environment overlay
//! ├── modules/        # Optional subsystem catalog and registry
//! ├── resources/      # Resource sets, node accounting, load reports
//! └── runtime/        # Runtime lifecycle and shutdown handling
//! ```
//!
//! ## Usage
//!
//! This crate provides the foundation types used by the other Ray crates.
//! It is typically not used directly but imported through the main `ray`
//! facade crate.

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all
)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod modules;
pub mod resources;
pub mod runtime;

// Re-export commonly used types
pub use config::{RuntimeConfig, RuntimeConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use modules::{ModuleDescriptor, ModuleRegistry, ModuleStatus, missing_module_error};
pub use resources::{AcquireOutcome, NodeResources, ResourceLoad, ResourceSet, ShapeLoad};
pub use runtime::{Runtime, RuntimeState, ShutdownHandle};

/// Environment variable that marks a minimal-installation CI run.
///
/// The minimal-install smoke test body executes only when this variable is
/// set to the literal string `"1"`.
pub const MINIMAL_INSTALL_ENV: &str = "RAY_MINIMAL";

/// Default cap on the number of resource shapes included in a load report.
pub const DEFAULT_MAX_SHAPES_PER_REPORT: usize = 100;

/// Runtime version information
pub const RUNTIME_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runtime name identifier
pub const RUNTIME_NAME: &str = "ray";

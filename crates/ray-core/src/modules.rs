//! Optional subsystem catalog and registry.
//!
//! Ray ships a small base installation; heavyweight subsystems are optional
//! extras. The catalog below names every optional module the distribution
//! knows about, together with the extra a user must install to get it. The
//! registry tracks which of those modules are actually bundled into the
//! current build and which are running.
//!
//! Looking up a cataloged module that is missing from the build produces a
//! [`ErrorKind::ModuleNotFound`](crate::ErrorKind::ModuleNotFound) error whose
//! message carries the install hint, e.g. `install "ray[serve]"`. That message
//! is an external contract: CI for minimal installations asserts on it.

use std::collections::HashSet;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the serving subsystem module.
pub const SERVE_MODULE: &str = "serve";

/// A cataloged optional module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModuleDescriptor {
    /// Module name as users refer to it (`ray::serve`)
    pub name: &'static str,
    /// One-line summary of what the module provides
    pub summary: &'static str,
    /// Install extra that brings the module in (`ray[serve]`)
    pub install_extra: &'static str,
}

/// Catalog of optional modules this distribution knows about.
///
/// Only modules listed here get an install hint; unknown names are reported
/// as plain not-found errors.
pub const CATALOG: &[ModuleDescriptor] = &[ModuleDescriptor {
    name: SERVE_MODULE,
    summary: "Scalable model serving with an HTTP ingress",
    install_extra: "ray[serve]",
}];

/// Look up a catalog entry by module name.
#[must_use]
pub fn catalog_entry(name: &str) -> Option<&'static ModuleDescriptor> {
    CATALOG.iter().find(|d| d.name == name)
}

/// Build the friendly error for a cataloged module that is absent from this
/// installation.
///
/// The message contains the literal `install "<extra>"` substring that the
/// minimal-install smoke test matches against. Unknown names fall back to a
/// plain not-found error without an install hint.
#[must_use]
pub fn missing_module_error(name: &str) -> Box<Error> {
    match catalog_entry(name) {
        Some(descriptor) => Error::module_not_found(format!(
            "Module '{name}' could not be found. To use this feature, install \"{extra}\" by \
             rebuilding ray with the \"{name}\" feature enabled.",
            extra = descriptor.install_extra,
        ))
        .with_component("modules"),
        None => {
            Error::not_found(format!("No module named '{name}'")).with_component("modules")
        }
    }
}

/// Reported status of a cataloged module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleStatus {
    /// Module name
    pub name: String,
    /// One-line summary
    pub summary: String,
    /// Install extra for missing modules
    pub install_extra: String,
    /// Whether the module is compiled into this build
    pub bundled: bool,
    /// Whether the module has been started
    pub running: bool,
}

#[derive(Debug, Default)]
struct RegistryState {
    /// Modules compiled into this build
    bundled: HashSet<String>,
    /// Modules that have been started and not yet shut down
    running: HashSet<String>,
}

/// Registry of optional modules for one runtime.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    state: RwLock<RegistryState>,
}

impl ModuleRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a module as bundled into this build.
    ///
    /// Called by the facade at init time for every compiled-in subsystem.
    /// Marking twice is harmless.
    pub fn mark_bundled(&self, name: impl Into<String>) {
        self.state.write().bundled.insert(name.into());
    }

    /// Check whether a module is bundled into this build
    pub fn is_bundled(&self, name: &str) -> bool {
        self.state.read().bundled.contains(name)
    }

    /// Check whether a module is currently running
    pub fn is_running(&self, name: &str) -> bool {
        self.state.read().running.contains(name)
    }

    /// Look up a module, producing the friendly error when it is absent.
    ///
    /// Returns `Ok(())` for bundled modules. A cataloged module that is not
    /// bundled yields the module-not-found error with its install hint; an
    /// unknown name yields a plain not-found error.
    pub fn lookup(&self, name: &str) -> Result<()> {
        if self.is_bundled(name) {
            return Ok(());
        }
        Err(missing_module_error(name))
    }

    /// Register a module as running.
    ///
    /// Implies the module is bundled. Registering a module that is already
    /// running is an error.
    pub fn register(&self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        let mut state = self.state.write();
        if state.running.contains(&name) {
            return Err(Error::already_exists(format!(
                "Module '{name}' is already running"
            ))
            .with_component("modules"));
        }
        state.bundled.insert(name.clone());
        state.running.insert(name);
        Ok(())
    }

    /// Deregister a running module. Returns whether it was running.
    pub fn deregister(&self, name: &str) -> bool {
        self.state.write().running.remove(name)
    }

    /// Report the status of every cataloged module.
    pub fn statuses(&self) -> Vec<ModuleStatus> {
        let state = self.state.read();
        CATALOG
            .iter()
            .map(|d| ModuleStatus {
                name: d.name.to_string(),
                summary: d.summary.to_string(),
                install_extra: d.install_extra.to_string(),
                bundled: state.bundled.contains(d.name),
                running: state.running.contains(d.name),
            })
            .collect()
    }

    /// Names of all bundled modules
    pub fn bundled_modules(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.read().bundled.iter().cloned().collect();
        names.sort();
        names
    }
}

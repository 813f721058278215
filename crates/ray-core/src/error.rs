//! Error handling with context preservation.
//!
//! This module provides the error type shared across the Ray crates. Errors
//! carry a classification kind, a human-readable message, and contextual
//! metadata for diagnostics. The `ModuleNotFound` kind is the one surfaced to
//! users of a minimal installation who touch an optional subsystem that was
//! not installed; its message always carries a remediation hint.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Result type alias for Ray operations
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Error type with contextual information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Error {
    /// Unique identifier for this error instance
    pub id: Uuid,

    /// Error classification
    pub kind: ErrorKind,

    /// Human-readable error message
    pub message: String,

    /// Additional contextual information
    pub context: ErrorContext,

    /// Optional source error that caused this error
    #[serde(skip)]
    pub source: Option<Box<Error>>,
}

/// Error classification for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input validation failed
    Validation,

    /// Resource was not found
    NotFound,

    /// Optional module is not part of this installation
    ModuleNotFound,

    /// Component is already registered or running
    AlreadyExists,

    /// Configuration error
    Configuration,

    /// Runtime lifecycle violation
    Lifecycle,

    /// Resource demand cannot be satisfied
    ResourceExhausted,

    /// Serialization/deserialization error
    Serialization,

    /// IO failure
    Io,

    /// Internal runtime error
    Internal,
}

/// Contextual information attached to errors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Operation that was being performed
    pub operation: Option<String>,

    /// Component where the error occurred
    pub component: Option<String>,

    /// Additional metadata
    pub metadata: HashMap<String, serde_json::Value>,

    /// Timestamp when the error occurred
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Error {
    /// Create a new error with the specified kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Box<Self> {
        Box::new(Self {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            context: ErrorContext {
                timestamp: chrono::Utc::now(),
                ..Default::default()
            },
            source: None,
        })
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Box<Self> {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Box<Self> {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a module not found error
    pub fn module_not_found(message: impl Into<String>) -> Box<Self> {
        Self::new(ErrorKind::ModuleNotFound, message)
    }

    /// Create an already exists error
    pub fn already_exists(message: impl Into<String>) -> Box<Self> {
        Self::new(ErrorKind::AlreadyExists, message)
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Box<Self> {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a lifecycle error
    pub fn lifecycle(message: impl Into<String>) -> Box<Self> {
        Self::new(ErrorKind::Lifecycle, message)
    }

    /// Create a resource exhausted error
    pub fn resource_exhausted(message: impl Into<String>) -> Box<Self> {
        Self::new(ErrorKind::ResourceExhausted, message)
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Box<Self> {
        Self::new(ErrorKind::Serialization, message)
    }

    /// Create an IO error
    pub fn io(message: impl Into<String>) -> Box<Self> {
        Self::new(ErrorKind::Io, message)
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Box<Self> {
        Self::new(ErrorKind::Internal, message)
    }

    /// Add context metadata to this error
    #[must_use]
    pub fn with_context(
        mut self: Box<Self>,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Box<Self> {
        self.context.metadata.insert(key.into(), value.into());
        self
    }

    /// Set the operation being performed
    #[must_use]
    pub fn with_operation(mut self: Box<Self>, operation: impl Into<String>) -> Box<Self> {
        self.context.operation = Some(operation.into());
        self
    }

    /// Set the component where the error occurred
    #[must_use]
    pub fn with_component(mut self: Box<Self>, component: impl Into<String>) -> Box<Self> {
        self.context.component = Some(component.into());
        self
    }

    /// Chain this error with a source error
    #[must_use]
    pub fn with_source(mut self: Box<Self>, source: Box<Self>) -> Box<Self> {
        self.source = Some(source);
        self
    }

    /// Check if this error indicates a missing optional module
    pub const fn is_module_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::ModuleNotFound)
    }

    /// Check if this error is permanent for the current build
    ///
    /// Module-not-found errors cannot be recovered from at runtime; they
    /// require a different installation.
    pub const fn is_permanent(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ModuleNotFound | ErrorKind::Configuration | ErrorKind::Validation
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(operation) = &self.context.operation {
            write!(f, " (operation: {operation})")?;
        }

        if let Some(component) = &self.context.component {
            write!(f, " (component: {component})")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl ErrorKind {
    /// Get a human-readable description of this error kind
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Validation => "Input validation failed",
            Self::NotFound => "Resource not found",
            Self::ModuleNotFound => "Module not found",
            Self::AlreadyExists => "Already exists",
            Self::Configuration => "Configuration error",
            Self::Lifecycle => "Lifecycle error",
            Self::ResourceExhausted => "Resource exhausted",
            Self::Serialization => "Serialization error",
            Self::Io => "IO error",
            Self::Internal => "Internal error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

// Implement From for common error types
impl From<serde_json::Error> for Box<Error> {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON serialization error: {err}"))
    }
}

impl From<std::io::Error> for Box<Error> {
    fn from(err: std::io::Error) -> Self {
        Error::io(format!("IO error: {err}"))
    }
}

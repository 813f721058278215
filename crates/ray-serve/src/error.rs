//! Serve error types and handling

use ray_core::ErrorKind;

/// Result type for serve operations
pub type ServeResult<T> = Result<T, ServeError>;

/// Serve subsystem error types
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// Serve was started twice against the same runtime
    #[error("Serve is already running on this runtime")]
    AlreadyRunning,

    /// An operation required a running serve instance
    #[error("Serve is not running")]
    NotRunning,

    /// Deployment validation or placement errors
    #[error("Deployment error: {message}")]
    Deployment {
        /// Error message
        message: String,
        /// Deployment the error refers to
        deployment: Option<String>,
    },

    /// HTTP ingress errors
    #[error("Ingress error: {0}")]
    Ingress(#[from] std::io::Error),

    /// Errors bubbled up from the core runtime
    #[error("Runtime error: {0}")]
    Runtime(#[from] Box<ray_core::Error>),
}

impl ServeError {
    /// Create a deployment error
    pub fn deployment(message: impl Into<String>) -> Self {
        Self::Deployment {
            message: message.into(),
            deployment: None,
        }
    }

    /// Create a deployment error naming the deployment
    pub fn deployment_named(message: impl Into<String>, deployment: impl Into<String>) -> Self {
        Self::Deployment {
            message: message.into(),
            deployment: Some(deployment.into()),
        }
    }

    /// Check if this error is fatal for the serve instance
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Ingress(_))
    }
}

impl From<ServeError> for Box<ray_core::Error> {
    fn from(err: ServeError) -> Self {
        match err {
            ServeError::Runtime(inner) => inner,
            ServeError::AlreadyRunning => {
                ray_core::Error::new(ErrorKind::AlreadyExists, err.to_string())
                    .with_component("serve")
            }
            ServeError::NotRunning => {
                ray_core::Error::new(ErrorKind::Lifecycle, err.to_string())
                    .with_component("serve")
            }
            ServeError::Deployment { .. } => {
                ray_core::Error::new(ErrorKind::Validation, err.to_string())
                    .with_component("serve")
            }
            ServeError::Ingress(_) => {
                ray_core::Error::new(ErrorKind::Io, err.to_string()).with_component("serve")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_error_display() {
        let error = ServeError::deployment_named("replica count must be positive", "echo");
        assert!(error.to_string().contains("replica count"));
    }

    #[test]
    fn test_conversion_into_core_error() {
        let core: Box<ray_core::Error> = ServeError::AlreadyRunning.into();
        assert_eq!(core.kind, ErrorKind::AlreadyExists);

        let core: Box<ray_core::Error> = ServeError::deployment("bad route").into();
        assert_eq!(core.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_runtime_errors_pass_through() {
        let original = ray_core::Error::lifecycle("runtime stopped");
        let serve: ServeError = original.into();
        let back: Box<ray_core::Error> = serve.into();
        assert_eq!(back.kind, ErrorKind::Lifecycle);
    }
}

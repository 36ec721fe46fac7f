//! Error types for the dispatch core

use relay_core::Name;
use thiserror::Error;

/// Result type for dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Errors that can occur in the callback system
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Event name declared twice
    #[error("Event '{0}' is already declared")]
    EventAlreadyDeclared(Name),

    /// Payload type of a declared event does not exist
    #[error("Type '{type_name}' for event '{event}' cannot be resolved")]
    UnresolvedType {
        event: Name,
        type_name: Name,
    },

    /// The scripting bridge reported a failed call
    #[error("Callback '{function}' on {target} failed: {message}")]
    InvocationFailed {
        target: String,
        function: Name,
        message: String,
    },

    /// Engine hook could not be armed
    #[error("Failed to install hook '{hook}': {message}")]
    HookInstallFailed {
        hook: String,
        message: String,
    },

    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DispatchError {
    /// Create an invocation failure
    pub fn invocation_failed(
        target: impl Into<String>,
        function: &Name,
        message: impl Into<String>,
    ) -> Self {
        DispatchError::InvocationFailed {
            target: target.into(),
            function: function.clone(),
            message: message.into(),
        }
    }

    /// Create a hook installation failure
    pub fn hook_install_failed(hook: impl Into<String>, message: impl Into<String>) -> Self {
        DispatchError::HookInstallFailed {
            hook: hook.into(),
            message: message.into(),
        }
    }
}

//! Error types for the native entry layer

use relay_dispatch::DispatchError;
use thiserror::Error;

/// Result type for native operations
pub type Result<T> = std::result::Result<T, NativeError>;

/// Errors raised at the C ABI boundary
#[derive(Debug, Error)]
pub enum NativeError {
    /// Entry point called before `relay_init` or after `relay_shutdown`
    #[error("Relay is not initialized")]
    NotInitialized,

    /// `relay_init` called twice
    #[error("Relay is already initialized")]
    AlreadyInitialized,

    /// Host table built against another ABI version
    #[error("Host API version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    /// String argument was null or not UTF-8
    #[error("Invalid string argument '{0}'")]
    InvalidString(&'static str),

    /// Hook id outside the known hook points
    #[error("Unknown hook point {0}")]
    UnknownHookPoint(u32),

    /// Object id the host never announced
    #[error("Unknown object {0}")]
    UnknownObject(u64),

    /// Dispatch core error
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Payload marshalling error
    #[error("Payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

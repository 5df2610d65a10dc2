//! Error types for the occlusion culling engine
//!
//! This module defines the error type shared by the camera, the query pool,
//! the graphics device seam and the per-frame render techniques.

use std::fmt;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (device failure, query misuse, poisoned lock)
    BackendError(String),

    /// The device cannot allocate more query objects
    OutOfMemory,

    /// Invalid resource (mesh without vertices, unknown handle, ...)
    InvalidResource(String),

    /// Initialization failed (scene, query pool)
    InitializationFailed(String),

    /// Parameter outside its valid range (camera, spawn volume)
    InvalidArgument(String),

    /// More queries requested in one frame than the pool holds
    QueryPoolExhausted {
        /// Number of handles owned by the pool
        capacity: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::QueryPoolExhausted { capacity } => write!(
                f,
                "Query pool exhausted: all {} queries already issued this frame",
                capacity
            ),
        }
    }
}

impl std::error::Error for Error {}

/// Log an ERROR message and build an `Error::BackendError` from it
///
/// # Example
///
/// ```ignore
/// let err = engine_err!("occlusion::QueryPool", "Device lock poisoned");
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::occlusion::Error::BackendError(message)
    }};
}

/// Log an ERROR message and return early with an `Error::BackendError`
///
/// # Example
///
/// ```ignore
/// engine_bail!("occlusion::mock", "Query {} is not active", handle);
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

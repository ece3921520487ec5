//! Custom error types with exit codes

use thiserror::Error;

/// Main error type for fetch-sparse operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FetchError {
    /// Network Error - remote unreachable or timed out during clone
    #[error("Network error: {message}")]
    Network { message: String },

    /// Auth Error - credentials rejected or access denied by the remote
    #[error("Auth error: {message}")]
    Auth { message: String },

    /// Path Exists Error - destination is a non-empty non-repository directory
    #[error("Path exists error: {message}")]
    PathExists { message: String },

    /// Configuration Error - invalid patterns, unsupported mode combination,
    /// or a sparse-checkout configuration step failed
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Materialization Error - checking out the tree failed
    #[error("Materialization error: {message}")]
    Materialization { message: String },
}

impl FetchError {
    /// Get the appropriate exit code for this error type
    ///
    /// Clone-phase failures share exit code 1; configuration failures
    /// (including failed sparse-checkout setup steps) map to 2 and
    /// materialization failures to 3.
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::Network { .. } | Self::Auth { .. } | Self::PathExists { .. } => 1,
            Self::Config { .. } => 2,
            Self::Materialization { .. } => 3,
        }
    }

    /// Create a network error
    #[inline]
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an auth error
    #[inline]
    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a path-exists error
    #[inline]
    pub fn path_exists<S: Into<String>>(message: S) -> Self {
        Self::PathExists {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[inline]
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a materialization error
    #[inline]
    pub fn materialization<S: Into<String>>(message: S) -> Self {
        Self::Materialization {
            message: message.into(),
        }
    }
}

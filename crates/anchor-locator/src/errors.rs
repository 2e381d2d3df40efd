//! Error types for anchor resolution
//!
//! None of these reach callers of the public engine operations: they are
//! logged and folded into a not-found result.

use anchor_host::HostError;
use thiserror::Error;

/// Locator error enumeration
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LocatorError {
    /// Query string the host lookup could not parse
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Parent for a fallback container is missing
    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    /// Marker class is not a usable class name
    #[error("Invalid marker class: '{0}'")]
    InvalidMarker(String),

    /// Host capability failure (element creation, append)
    #[error("Host error: {0}")]
    Host(String),
}

impl LocatorError {
    /// Malformed queries are recovered by skipping to the next query.
    pub fn is_malformed_query(&self) -> bool {
        matches!(self, LocatorError::InvalidQuery(_))
    }
}

impl From<HostError> for LocatorError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::InvalidSelector { .. } => LocatorError::InvalidQuery(err.to_string()),
            other => LocatorError::Host(other.to_string()),
        }
    }
}

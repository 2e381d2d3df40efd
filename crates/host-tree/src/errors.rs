use thiserror::Error;

/// Failures raised by host document capabilities.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HostError {
    /// The structural lookup could not parse the query
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// Element creation rejected the tag name
    #[error("invalid tag name '{0}'")]
    InvalidTagName(String),

    /// Append would produce a cycle in the tree
    #[error("hierarchy request error: {0}")]
    HierarchyRequest(String),

    /// Fixture could not be read or decoded
    #[error("invalid fixture: {0}")]
    InvalidFixture(String),
}

impl HostError {
    pub fn invalid_selector(selector: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }

    /// True for malformed-query failures, which callers recover from locally.
    pub fn is_malformed_query(&self) -> bool {
        matches!(self, HostError::InvalidSelector { .. })
    }
}

//! Error types for model parsing.

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing addresses or versions from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Address text is not of the form `/type=name/type=name`.
    #[error("invalid address '{input}': {reason}")]
    InvalidAddress {
        /// The text that failed to parse.
        input: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Version text is not of the form `major.minor[.micro]`.
    #[error("invalid management version '{0}'")]
    InvalidVersion(String),

    /// Namespace does not carry a management version.
    #[error("namespace '{0}' does not identify a management model version")]
    InvalidNamespace(String),
}

impl Error {
    pub(crate) fn address(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

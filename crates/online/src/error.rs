//! Error types for live management operations.
//!
//! Errors are split into two families: the server could not be reached or
//! answered with something that is not a management response (transport),
//! or the server answered and reported a failed outcome.

use std::fmt;

/// Result type alias for online operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of online errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection, HTTP or protocol-level problem.
    Transport,
    /// The server executed the request and reported failure.
    Outcome,
    /// The server did not reach the expected state in time.
    Timeout,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Transport => "Management connection problem",
            Self::Outcome => "Management operation failed",
            Self::Timeout => "Server did not respond in time",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Transport => "Check the management URL, credentials and that the server is up",
            Self::Outcome => "Inspect the failure description reported by the server",
            Self::Timeout => "Check the server log; it may still be starting or reloading",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to a live server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed before a management response was received.
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        /// Endpoint that was called.
        url: String,
        /// HTTP status code if available.
        status: Option<u16>,
        /// Underlying transport error.
        #[source]
        source: ureq::Error,
    },

    /// The server answered with something that is not a management response.
    #[error("invalid management response: {0}")]
    InvalidResponse(String),

    /// The response body is not a management document.
    #[error("invalid management response: {0}")]
    Json(#[from] serde_json::Error),

    /// A mutating operation reported a failed outcome.
    #[error("operation '{operation}' on {address} failed: {description}")]
    Failed {
        /// Operation name.
        operation: String,
        /// Target address, CLI syntax.
        address: String,
        /// Failure description reported by the server.
        description: String,
    },

    /// A result checked with `assert_success` was not successful.
    #[error("management operation was not successful: {0}")]
    Outcome(String),

    /// Waiting for a server state timed out.
    #[error("timed out: {0}")]
    Timeout(String),
}

impl Error {
    /// Create an HTTP error.
    pub fn http(url: impl Into<String>, source: ureq::Error, status: Option<u16>) -> Self {
        Self::Http {
            url: url.into(),
            status,
            source,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Http { .. } | Error::InvalidResponse(_) | Error::Json(_) => {
                ErrorCategory::Transport
            }
            Error::Failed { .. } | Error::Outcome(_) => ErrorCategory::Outcome,
            Error::Timeout(_) => ErrorCategory::Timeout,
        }
    }

    /// The failure description reported by the server, if any.
    pub fn failure_description(&self) -> Option<&str> {
        match self {
            Error::Failed { description, .. } | Error::Outcome(description) => Some(description),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    fn refused() -> ureq::Error {
        ureq::Error::Io(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            Error::http("http://localhost:9990/management", refused(), None).category(),
            ErrorCategory::Transport
        );
        assert_eq!(
            Error::InvalidResponse("not json".into()).category(),
            ErrorCategory::Transport
        );
        assert_eq!(
            Error::Outcome("boom".into()).category(),
            ErrorCategory::Outcome
        );
        assert_eq!(
            Error::Timeout("reload".into()).category(),
            ErrorCategory::Timeout
        );
    }

    #[test]
    fn test_transport_errors_keep_their_cause() {
        let err = Error::http("http://localhost:9990/management", refused(), None);
        assert!(err.to_string().contains("refused"));
        assert!(err.source().is_some());

        let err: Error = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.category(), ErrorCategory::Transport);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_failed_display() {
        let err = Error::Failed {
            operation: "add".into(),
            address: "/subsystem=datasources/data-source=DS1".into(),
            description: "WFLYCTL0212: Duplicate resource".into(),
        };
        let display = err.to_string();
        assert!(display.contains("add"));
        assert!(display.contains("data-source=DS1"));
        assert_eq!(err.failure_description(), Some("WFLYCTL0212: Duplicate resource"));
    }

    #[test]
    fn test_category_advice() {
        assert!(!ErrorCategory::Transport.advice().is_empty());
        assert!(ErrorCategory::Outcome.to_string().contains("failed"));
    }
}

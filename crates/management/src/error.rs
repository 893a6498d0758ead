//! Error types for management commands.
//!
//! Every failure falls into one of three categories:
//!
//! - construction: the command arguments are unusable; raised while building
//!   the command, before any backend is touched
//! - precondition: a business rule refused the change (duplicate resource,
//!   missing prerequisite); the target is left as it was
//! - transport: the server or the configuration file could not be used
//!
//! Both backends produce the same message text for the same precondition.

use std::fmt;

/// Result type alias for management commands.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of command errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Invalid command arguments.
    Construction,
    /// Business rule refused the change.
    Precondition,
    /// Server or file access problem.
    Transport,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Construction => "Invalid command arguments",
            Self::Precondition => "Command refused",
            Self::Transport => "Could not reach the target",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Construction => "Check the command options",
            Self::Precondition => "Inspect the current configuration, or use --replace where supported",
            Self::Transport => "Check the target URL, credentials or file path",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors raised by management commands.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed command arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Business-rule failure.
    #[error("{message}")]
    CommandFailed {
        /// What went wrong, identical for both backends.
        message: String,
        /// Underlying failure, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Live server failure.
    #[error(transparent)]
    Operation(#[from] online::Error),

    /// Configuration file failure.
    #[error(transparent)]
    Document(offline::Error),
}

impl Error {
    /// Create a construction error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a business-rule failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::CommandFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidArgument(_) => ErrorCategory::Construction,
            Error::CommandFailed { .. } => ErrorCategory::Precondition,
            Error::Operation(_) | Error::Document(_) => ErrorCategory::Transport,
        }
    }

    /// Wrap a failed batch as a command failure; transport errors stay as is.
    pub(crate) fn from_batch(command: &str, err: online::Error) -> Self {
        match err {
            online::Error::Failed { .. } => Self::CommandFailed {
                message: format!(
                    "{command} failed: {}",
                    err.failure_description().unwrap_or("no failure description")
                ),
                source: Some(Box::new(err)),
            },
            other => Self::Operation(other),
        }
    }
}

impl From<offline::Error> for Error {
    fn from(err: offline::Error) -> Self {
        match err {
            offline::Error::Precondition { message, .. } => Self::failed(message),
            other => Self::Document(other),
        }
    }
}

/// `<what> already exists`
pub(crate) fn already_exists(what: &str) -> String {
    format!("{what} already exists")
}

/// `<what> does not exist`
pub(crate) fn does_not_exist(what: &str) -> String {
    format!("{what} does not exist")
}

/// Fail a construction check unless `value` has non-blank content.
pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid(format!("{field} must be specified")));
    }
    Ok(())
}

/// Like [`require`] for optional fields: `Some("")` is rejected, `None` is fine.
pub(crate) fn require_if_present(field: &str, value: Option<&str>) -> Result<()> {
    value.map_or(Ok(()), |value| require(field, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_precondition_becomes_command_failed() {
        let err: Error = offline::Error::Precondition {
            script: "add-jdbc-driver".into(),
            message: already_exists("JDBC driver 'h2'"),
        }
        .into();

        assert_eq!(err.category(), ErrorCategory::Precondition);
        assert_eq!(err.to_string(), "JDBC driver 'h2' already exists");
    }

    #[test]
    fn test_offline_io_is_transport() {
        let err: Error = offline::Error::Parse("bad".into()).into();
        assert_eq!(err.category(), ErrorCategory::Transport);
    }

    #[test]
    fn test_failed_batch_keeps_source() {
        let err = Error::from_batch(
            "add data source 'DS1'",
            online::Error::Failed {
                operation: "composite".into(),
                address: "/".into(),
                description: "WFLYCTL0212: Duplicate resource".into(),
            },
        );

        assert_eq!(err.category(), ErrorCategory::Precondition);
        assert!(err.to_string().contains("WFLYCTL0212"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_transport_batch_error_is_not_wrapped() {
        let err = Error::from_batch(
            "add data source 'DS1'",
            online::Error::InvalidResponse("not json".into()),
        );
        assert_eq!(err.category(), ErrorCategory::Transport);
    }

    #[test]
    fn test_require() {
        assert!(require("name", "DS1").is_ok());
        assert!(matches!(require("name", "  "), Err(Error::InvalidArgument(_))));
        assert!(require_if_present("slot", None).is_ok());
        assert!(require_if_present("slot", Some("")).is_err());
    }
}

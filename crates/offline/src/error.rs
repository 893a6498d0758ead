//! Error types for offline configuration edits.

use std::io;
use std::path::PathBuf;

/// Result type alias for offline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading, transforming or writing a
/// configuration document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing the configuration file failed.
    #[error("IO error at {path}: {source}")]
    Io {
        /// File involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The document is not well-formed XML.
    #[error("XML parse error: {0}")]
    Parse(String),

    /// Serializing the document failed.
    #[error("XML write error: {0}")]
    Write(String),

    /// A script asked for a subtree the transform does not declare.
    #[error("script '{script}' uses undeclared subtree '{name}'")]
    UnknownSubtree {
        /// Script name.
        script: String,
        /// Subtree name.
        name: String,
    },

    /// A required parameter was not supplied.
    #[error("script '{script}' requires parameter '{name}'")]
    MissingParameter {
        /// Script name.
        script: String,
        /// Parameter name.
        name: String,
    },

    /// A parameter has an unusable value.
    #[error("script '{script}': invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Script name.
        script: String,
        /// Parameter name.
        name: String,
        /// What is wrong with it.
        message: String,
    },

    /// A script refused to mutate the document.
    #[error("{message}")]
    Precondition {
        /// Script name.
        script: String,
        /// Business-rule message.
        message: String,
    },

    /// The document does not have the expected shape.
    #[error("unexpected document structure: {0}")]
    Structure(String),

    /// The root namespace does not carry a management version.
    #[error(transparent)]
    Version(#[from] model::Error),
}

impl Error {
    /// Create an IO error.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is a business-rule refusal rather than a technical fault.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition { .. })
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_message_is_bare() {
        let err = Error::Precondition {
            script: "add-jdbc-driver".into(),
            message: "JDBC driver 'h2' already exists".into(),
        };
        assert_eq!(err.to_string(), "JDBC driver 'h2' already exists");
        assert!(err.is_precondition());
    }

    #[test]
    fn test_io_display() {
        let err = Error::io(
            "/tmp/standalone.xml",
            io::Error::new(io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("standalone.xml"));
        assert!(!err.is_precondition());
    }
}

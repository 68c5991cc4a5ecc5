//! Error types for report parsing.

use std::path::PathBuf;

use thiserror::Error;

pub(crate) const MEMORY_SOURCE: &str = "<memory>";

/// Result type for parse operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors that can occur while probing or parsing a report.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The report does not carry the structural signature of the format.
    #[error("report is not a {format} document")]
    FormatMismatch { format: &'static str },

    /// The underlying stream is not well-formed markup.
    #[error("malformed report document: {reason}")]
    MalformedDocument { reason: String },

    /// A numeric attribute could not be read as a non-negative number.
    /// Fatal for the whole file: no partial report set is returned.
    #[error("invalid value '{value}' for attribute '{attribute}' on <{element}>")]
    MalformedField {
        element: String,
        attribute: String,
        value: String,
    },

    /// The report could not be opened or read.
    #[error("failed to read report {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            reason: reason.into(),
        }
    }

    pub(crate) fn field(element: &str, attribute: &str, value: &str) -> Self {
        Self::MalformedField {
            element: element.to_string(),
            attribute: attribute.to_string(),
            value: value.to_string(),
        }
    }

    /// Attach the report location to I/O errors raised deep inside the reader.
    pub(crate) fn at(self, location: &std::path::Path) -> Self {
        match self {
            Self::Io { source, .. } => Self::Io {
                path: location.to_path_buf(),
                source,
            },
            other => other,
        }
    }

    /// Returns true if the selector may move on to the next strategy.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FormatMismatch { .. } | Self::MalformedDocument { .. }
        )
    }
}

impl From<quick_xml::Error> for ParseError {
    fn from(err: quick_xml::Error) -> Self {
        match err {
            quick_xml::Error::Io(io) => ParseError::Io {
                path: PathBuf::from(MEMORY_SOURCE),
                source: std::io::Error::new(io.kind(), io.to_string()),
            },
            other => ParseError::malformed(other.to_string()),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for ParseError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        ParseError::malformed(err.to_string())
    }
}

/// Errors raised while loading a [`crate::config::ParserConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config lists no report formats")]
    NoFormats,
}

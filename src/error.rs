//! Error types for paperdoc library.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for paperdoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while creating, converting, or formatting manuscripts.
#[derive(Error, Debug)]
pub enum Error {
    /// The source file does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The input cannot be read as a supported document or markup source.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The external conversion tool is not installed or not on the path.
    #[error("Conversion tool unavailable: {0}")]
    ToolUnavailable(String),

    /// The external conversion tool ran but did not produce a document.
    #[error("Conversion failed: {0}")]
    ConversionFailed(String),

    /// The external conversion tool did not finish in time.
    #[error("Conversion timed out after {}s", .0.as_secs())]
    ConversionTimeout(Duration),

    /// A template configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The destination could not be written.
    #[error("Cannot write {}: {source}", path.display())]
    WriteFailure {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed WordprocessingML.
    #[error("XML error: {0}")]
    Xml(String),

    /// Template file could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse error category, used for exit codes and by library callers that
/// only need to branch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Source file missing
    InputNotFound,
    /// Input not parseable by the document or markup reader
    UnsupportedFormat,
    /// External converter missing
    ToolUnavailable,
    /// External converter failed or timed out
    ConversionFailed,
    /// Out-of-range formatting parameter
    InvalidConfig,
    /// Destination not writable
    WriteFailure,
    /// Anything else
    Other,
}

impl ErrorKind {
    /// Process exit code for this category.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Other => 1,
            ErrorKind::InputNotFound => 2,
            ErrorKind::UnsupportedFormat => 3,
            ErrorKind::ToolUnavailable => 4,
            ErrorKind::InvalidConfig => 5,
            ErrorKind::WriteFailure => 6,
            ErrorKind::ConversionFailed => 7,
        }
    }
}

impl Error {
    /// Get the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InputNotFound(_) => ErrorKind::InputNotFound,
            Error::UnsupportedFormat(_) | Error::Xml(_) => ErrorKind::UnsupportedFormat,
            Error::ToolUnavailable(_) => ErrorKind::ToolUnavailable,
            Error::ConversionFailed(_) | Error::ConversionTimeout(_) => {
                ErrorKind::ConversionFailed
            }
            Error::InvalidConfig(_) | Error::Json(_) => ErrorKind::InvalidConfig,
            Error::WriteFailure { .. } => ErrorKind::WriteFailure,
            Error::Io(_) => ErrorKind::Other,
        }
    }

    pub(crate) fn write_failure(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::WriteFailure {
            path: path.into(),
            source,
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::UnsupportedFormat(format!("not a valid .docx package ({})", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InputNotFound(PathBuf::from("paper.tex"));
        assert_eq!(err.to_string(), "Input file not found: paper.tex");

        let err = Error::ConversionTimeout(Duration::from_secs(300));
        assert_eq!(err.to_string(), "Conversion timed out after 300s");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_kinds_are_distinct() {
        let missing_tool = Error::ToolUnavailable("pandoc".into());
        let bad_format = Error::UnsupportedFormat("xyz".into());
        assert_eq!(missing_tool.kind(), ErrorKind::ToolUnavailable);
        assert_eq!(bad_format.kind(), ErrorKind::UnsupportedFormat);
        assert_ne!(
            missing_tool.kind().exit_code(),
            bad_format.kind().exit_code()
        );
    }

    #[test]
    fn test_write_failure_kind() {
        let err = Error::write_failure(
            "/nope/out.docx",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.kind(), ErrorKind::WriteFailure);
        assert!(err.to_string().contains("/nope/out.docx"));
    }

    #[test]
    fn test_zip_error_is_unsupported_format() {
        let err: Error = zip::result::ZipError::InvalidArchive("bad".into()).into();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }
}

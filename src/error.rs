//! Error types for indentor library.

use serde::Serialize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for indentor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading, normalizing or saving documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The container could not be read (unreadable or corrupt package).
    #[error("Cannot load document: {reason}")]
    ContainerLoad {
        /// What went wrong
        reason: String,
    },

    /// The container is valid but its internal schema is not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The document could not be written back.
    #[error("Cannot save {}: {reason}", path.display())]
    ContainerSave {
        /// Destination that failed
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// A paragraph's run sequence violates the model contract.
    #[error("Paragraph structure error: {0}")]
    ParagraphStructure(#[from] ParagraphStructureError),

    /// Malformed XML inside a container part.
    #[error("XML error: {0}")]
    Xml(String),

    /// Malformed or unreadable zip package.
    #[error("Zip error: {0}")]
    Zip(String),

    /// Text could not be decoded or encoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a load error from anything displayable.
    pub fn load(reason: impl std::fmt::Display) -> Self {
        Error::ContainerLoad {
            reason: reason.to_string(),
        }
    }

    /// Check whether this error concerns a whole document rather than a
    /// single paragraph.
    pub fn is_document_level(&self) -> bool {
        !matches!(self, Error::ParagraphStructure(_))
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::Zip(other.to_string()),
        }
    }
}

/// A per-paragraph contract violation. Recorded in the report; the
/// paragraph is left unmodified and the pass continues.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParagraphStructureError {
    /// A zero-width marker run carries text.
    #[error("marker run {run} carries text")]
    MarkerHasText {
        /// Index of the offending run
        run: usize,
    },

    /// An inline object run does not hold exactly one placeholder.
    #[error("object run {run} must hold a single placeholder character")]
    MalformedObject {
        /// Index of the offending run
        run: usize,
    },

    /// An edit was requested but no run holds content.
    #[error("paragraph has no content run to anchor the indent")]
    NoContent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnsupportedFormat("legacy .doc".into());
        assert_eq!(err.to_string(), "Unsupported format: legacy .doc");

        let err = Error::ContainerSave {
            path: PathBuf::from("out.docx"),
            reason: "locked".into(),
        };
        assert_eq!(err.to_string(), "Cannot save out.docx: locked");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_structure_error_conversion() {
        let err: Error = ParagraphStructureError::NoContent.into();
        assert!(matches!(err, Error::ParagraphStructure(_)));
        assert!(!err.is_document_level());
        assert!(Error::load("bad zip").is_document_level());
    }
}

//! Error types for the textract-hocr library.

use std::io;
use thiserror::Error;

/// Result type alias for textract-hocr operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during conversion.
///
/// Structural problems ([`Error::Schema`], the page-range variants) abort a
/// conversion. [`Error::UnsupportedPage`] is recoverable: the conversion
/// pipeline absorbs it into diagnostics and substitutes default dimensions.
/// [`Error::LayoutConflict`] is absorbed the same way under the default
/// [`crate::ConflictPolicy::Recover`], keeping the first-placed cell; it is
/// only raised under [`crate::ConflictPolicy::Fail`].
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading input or source files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not valid Textract JSON.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed document structure: missing required fields or a
    /// relationship pointing at an id absent from the input.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A requested page is outside the document's page range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// The requested page range is inconsistent.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// The dimension source does not contain the requested page.
    #[error("Source file has no page {page} (only {available} available)")]
    UnsupportedPage {
        /// Requested 1-based page number
        page: u32,
        /// Number of pages the source actually has
        available: u32,
    },

    /// Two table cells claim the same grid slot.
    #[error("Table {table}: conflicting cells at row {row}, column {column}")]
    LayoutConflict {
        /// Id of the TABLE block
        table: String,
        /// 1-based row of the contested slot
        row: u32,
        /// 1-based column of the contested slot
        column: u32,
    },

    /// Reading page dimensions from a source file failed.
    #[error("Dimension probe failed: {0}")]
    DimensionProbe(String),
}

impl Error {
    /// Whether the conversion pipeline may absorb this error and continue
    /// with a substitute (default dimensions, first-placed cell).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedPage { .. } | Error::LayoutConflict { .. } | Error::DimensionProbe(_)
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::DimensionProbe(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::DimensionProbe(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PageOutOfRange(6, 5);
        assert_eq!(err.to_string(), "Page 6 is out of range (document has 5 pages)");

        let err = Error::UnsupportedPage {
            page: 3,
            available: 2,
        };
        assert_eq!(err.to_string(), "Source file has no page 3 (only 2 available)");
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(Error::UnsupportedPage {
            page: 2,
            available: 1
        }
        .is_recoverable());
        assert!(Error::LayoutConflict {
            table: "t1".into(),
            row: 1,
            column: 1
        }
        .is_recoverable());
        assert!(!Error::Schema("missing id".into()).is_recoverable());
        assert!(!Error::PageOutOfRange(9, 1).is_recoverable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}

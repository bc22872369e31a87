//! # textract-hocr
//!
//! Converts AWS Textract JSON output into hOCR, the standard HTML dialect
//! for OCR results.
//!
//! ## Quick Start
//!
//! ```no_run
//! use textract_hocr::convert_file;
//!
//! fn main() -> textract_hocr::Result<()> {
//!     let result = convert_file("analysis.json")?;
//!     std::fs::write("output.hocr", result.hocr)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Full hOCR structure**: pages, reading blocks, tables, lines, words
//! - **Table layout**: grid assembly with row/column spans, rendered as a
//!   flat flow or as real `<table>` markup
//! - **Dimension resolution**: pixel coordinates from an explicit override,
//!   a source image or PDF, or Textract's 1000x1000 default
//! - **Diagnostics**: recoverable input anomalies reported alongside the
//!   output instead of failing the conversion
//! - **Parallel processing**: uses Rayon for multi-page documents
//!
//! ## Builder
//!
//! ```no_run
//! use textract_hocr::{TableMode, TextractHocr};
//!
//! let result = TextractHocr::new()
//!     .lenient()
//!     .with_pages(2, 5)
//!     .with_source_file("scan.pdf")
//!     .with_table_mode(TableMode::Structural)
//!     .convert_file("analysis.json")?;
//! eprintln!("{} diagnostics", result.diagnostics.len());
//! # Ok::<(), textract_hocr::Error>(())
//! ```

pub mod convert;
pub mod detect;
pub mod diagnostics;
pub mod dimensions;
pub mod error;
pub mod layout;
pub mod model;
pub mod pages;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use convert::{convert, Conversion, ConvertOptions};
pub use detect::{is_pdf_bytes, source_kind_from_bytes, source_kind_from_path, SourceKind};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use dimensions::{
    DimensionResolver, PageDimensions, TEXTRACT_DEFAULT_HEIGHT, TEXTRACT_DEFAULT_WIDTH,
};
pub use error::{Error, Result};
pub use layout::ConflictPolicy;
pub use model::{
    Block, BlockKind, CellBlock, Document, DocumentMetadata, LineBlock, NormBox, PageBlock,
    PixelBox, RelationKind, Relationship, TableBlock, WordBlock,
};
pub use pages::select_pages;
pub use parser::{BlockIndex, ErrorMode};
pub use render::{HocrEmitter, RenderOptions, TableMode};

use std::io::Read;
use std::path::Path;

/// Convert a Textract JSON file to hOCR with default options.
///
/// # Example
///
/// ```no_run
/// use textract_hocr::convert_file;
///
/// let result = convert_file("analysis.json").unwrap();
/// println!("{}", result.hocr);
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<Conversion> {
    let document = Document::from_path(path)?;
    convert(&document, &ConvertOptions::new())
}

/// Convert a Textract JSON file with custom options.
pub fn convert_file_with_options<P: AsRef<Path>>(
    path: P,
    options: &ConvertOptions,
) -> Result<Conversion> {
    let document = Document::from_path(path)?;
    convert(&document, options)
}

/// Convert a Textract JSON string to hOCR with default options.
pub fn convert_str(json: &str) -> Result<Conversion> {
    let document = Document::from_json(json)?;
    convert(&document, &ConvertOptions::new())
}

/// Convert a Textract JSON string with custom options.
pub fn convert_str_with_options(json: &str, options: &ConvertOptions) -> Result<Conversion> {
    let document = Document::from_json(json)?;
    convert(&document, options)
}

/// Convert Textract JSON bytes to hOCR with default options.
pub fn convert_bytes(data: &[u8]) -> Result<Conversion> {
    let document = Document::from_bytes(data)?;
    convert(&document, &ConvertOptions::new())
}

/// Convert Textract JSON from a reader with default options.
pub fn convert_reader<R: Read>(reader: R) -> Result<Conversion> {
    let document = Document::from_reader(reader)?;
    convert(&document, &ConvertOptions::new())
}

/// Convert an already-parsed JSON value with default options.
pub fn convert_value(value: serde_json::Value) -> Result<Conversion> {
    let document = Document::from_value(value)?;
    convert(&document, &ConvertOptions::new())
}

/// Builder for configuring and running conversions.
///
/// # Example
///
/// ```no_run
/// use textract_hocr::TextractHocr;
///
/// let result = TextractHocr::new()
///     .lenient()
///     .with_dimensions(2550, 3300)
///     .convert_file("analysis.json")?;
/// # Ok::<(), textract_hocr::Error>(())
/// ```
pub struct TextractHocr {
    options: ConvertOptions,
}

impl TextractHocr {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::new(),
        }
    }

    /// Absorb structural anomalies into diagnostics instead of failing.
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Render pages on the calling thread only.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Abort on table cell conflicts instead of keeping the first-placed
    /// cell.
    pub fn fail_on_conflict(mut self) -> Self {
        self.options = self.options.fail_on_conflict();
        self
    }

    /// Restrict conversion to an inclusive 1-based page range.
    pub fn with_pages(mut self, first: u32, last: u32) -> Self {
        self.options = self.options.with_page_range(first, last);
        self
    }

    /// Set the first page to render.
    pub fn with_first_page(mut self, page: u32) -> Self {
        self.options = self.options.with_first_page(page);
        self
    }

    /// Set the last page to render.
    pub fn with_last_page(mut self, page: u32) -> Self {
        self.options = self.options.with_last_page(page);
        self
    }

    /// Force explicit page dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.options = self.options.with_dimensions(width, height);
        self
    }

    /// Derive page dimensions from a source image or PDF.
    pub fn with_source_file(mut self, path: impl AsRef<Path>) -> Self {
        self.options = self.options.with_source_file(path);
        self
    }

    /// Set the table rendering mode.
    pub fn with_table_mode(mut self, mode: TableMode) -> Self {
        self.options = self.options.with_table_mode(mode);
        self
    }

    /// Replace the render options wholesale.
    pub fn with_render(mut self, render: RenderOptions) -> Self {
        self.options = self.options.with_render(render);
        self
    }

    /// Convert a parsed document.
    pub fn convert(&self, document: &Document) -> Result<Conversion> {
        convert(document, &self.options)
    }

    /// Read, parse and convert a JSON file.
    pub fn convert_file<P: AsRef<Path>>(&self, path: P) -> Result<Conversion> {
        convert_file_with_options(path, &self.options)
    }

    /// Parse and convert a JSON string.
    pub fn convert_str(&self, json: &str) -> Result<Conversion> {
        convert_str_with_options(json, &self.options)
    }

    /// The configured options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }
}

impl Default for TextractHocr {
    fn default() -> Self {
        Self::new()
    }
}

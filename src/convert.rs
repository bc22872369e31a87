//! The conversion pipeline: document in, hOCR out.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::dimensions::{resolver_for, PageDimensions};
use crate::error::Result;
use crate::layout::{layout_page, ConflictPolicy};
use crate::model::Document;
use crate::pages::select_pages;
use crate::parser::{BlockIndex, ErrorMode};
use crate::render::{HocrEmitter, RenderOptions, TableMode};

/// Options controlling one conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// First page to render (1-based); defaults to 1
    pub first_page: Option<u32>,

    /// Last page to render (1-based); defaults to the document's last page
    pub last_page: Option<u32>,

    /// Explicit page dimensions, overriding any source file
    pub dimensions: Option<PageDimensions>,

    /// Source image or PDF to derive page dimensions from
    pub source_file: Option<PathBuf>,

    /// How to treat structural anomalies in the input
    pub error_mode: ErrorMode,

    /// How to treat table cell placement conflicts
    pub conflicts: ConflictPolicy,

    /// Render pages on the rayon pool; output is identical either way
    pub parallel: bool,

    /// hOCR rendering options
    pub render: RenderOptions,
}

impl ConvertOptions {
    /// Create options with defaults: all pages, strict mode, recovering
    /// table conflicts, parallel rendering, flow tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the first page to render (1-based).
    pub fn with_first_page(mut self, page: u32) -> Self {
        self.first_page = Some(page);
        self
    }

    /// Set the last page to render (1-based).
    pub fn with_last_page(mut self, page: u32) -> Self {
        self.last_page = Some(page);
        self
    }

    /// Set an inclusive page range.
    pub fn with_page_range(mut self, first: u32, last: u32) -> Self {
        self.first_page = Some(first);
        self.last_page = Some(last);
        self
    }

    /// Force explicit page dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some(PageDimensions::new(width, height));
        self
    }

    /// Derive page dimensions from a source image or PDF.
    pub fn with_source_file(mut self, path: impl AsRef<Path>) -> Self {
        self.source_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Absorb structural anomalies into diagnostics instead of failing.
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Fail on structural anomalies (the default).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Abort on table cell conflicts instead of keeping the first-placed
    /// cell.
    pub fn fail_on_conflict(mut self) -> Self {
        self.conflicts = ConflictPolicy::Fail;
        self
    }

    /// Render pages on the calling thread only.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the table rendering mode.
    pub fn with_table_mode(mut self, mode: TableMode) -> Self {
        self.render = self.render.with_table_mode(mode);
        self
    }

    /// Replace the render options wholesale.
    pub fn with_render(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            first_page: None,
            last_page: None,
            dimensions: None,
            source_file: None,
            error_mode: ErrorMode::default(),
            conflicts: ConflictPolicy::default(),
            parallel: true,
            render: RenderOptions::default(),
        }
    }
}

/// The outcome of a successful conversion.
#[derive(Debug)]
pub struct Conversion {
    /// The complete hOCR document
    pub hocr: String,

    /// Recoverable anomalies observed along the way
    pub diagnostics: Diagnostics,
}

/// Convert a parsed Textract document to hOCR.
///
/// Pages render independently and concatenate in ascending page order, so
/// the parallel and sequential paths produce byte-identical output.
pub fn convert(document: &Document, options: &ConvertOptions) -> Result<Conversion> {
    let mut diagnostics = Diagnostics::new();
    let index = BlockIndex::build(document, options.error_mode, &mut diagnostics)?;
    let pages = select_pages(&index, options.first_page, options.last_page)?;
    let resolver = resolver_for(options.dimensions, options.source_file.as_deref());
    let emitter = HocrEmitter::new(&options.render);

    let render_one = |page: u32| -> Result<(String, Diagnostics)> {
        let mut page_diags = Diagnostics::new();
        let dims = match resolver.resolve(page) {
            Ok(dims) => dims,
            Err(err) if err.is_recoverable() => {
                page_diags.push(
                    Diagnostic::new(DiagnosticKind::UnsupportedPage, err.to_string())
                        .on_page(page),
                );
                PageDimensions::textract_default()
            }
            Err(err) => return Err(err),
        };
        let layout = layout_page(&index, page, options.conflicts, &mut page_diags)?;
        let fragment = emitter.render_page(&layout, dims, &mut page_diags);
        Ok((fragment, page_diags))
    };

    let rendered: Vec<(String, Diagnostics)> = if options.parallel {
        pages
            .par_iter()
            .map(|&page| render_one(page))
            .collect::<Result<Vec<_>>>()?
    } else {
        pages
            .iter()
            .map(|&page| render_one(page))
            .collect::<Result<Vec<_>>>()?
    };

    let mut hocr = emitter.prelude();
    for (fragment, page_diags) in rendered {
        hocr.push_str(&fragment);
        diagnostics.extend(page_diags);
    }
    hocr.push_str(&emitter.epilogue());

    Ok(Conversion { hocr, diagnostics })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = ConvertOptions::new()
            .with_page_range(2, 5)
            .with_dimensions(2550, 3300)
            .lenient()
            .sequential()
            .fail_on_conflict()
            .with_table_mode(TableMode::Structural);

        assert_eq!(options.first_page, Some(2));
        assert_eq!(options.last_page, Some(5));
        assert_eq!(options.dimensions, Some(PageDimensions::new(2550, 3300)));
        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert_eq!(options.conflicts, ConflictPolicy::Fail);
        assert!(!options.parallel);
        assert_eq!(options.render.table_mode, TableMode::Structural);
    }

    #[test]
    fn test_defaults_are_parallel_strict() {
        let options = ConvertOptions::new();
        assert!(options.parallel);
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.conflicts, ConflictPolicy::Recover);
        assert_eq!(options.render.table_mode, TableMode::Flow);
    }

    #[test]
    fn test_empty_document_converts() {
        let document = Document::default();
        let result = convert(&document, &ConvertOptions::new()).unwrap();
        assert!(result.hocr.contains("<body>"));
        assert!(!result.hocr.contains("ocr_page"));
        assert!(result.diagnostics.is_empty());
    }
}

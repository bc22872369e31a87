//! Page dimension resolution.
//!
//! Normalized boxes need real page dimensions to become pixel boxes.
//! Resolution priority is fixed: an explicit override beats dimensions
//! derived from a source file (raster image header or PDF page metadata),
//! which beat the Textract default of 1000x1000.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detect::{self, SourceKind};
use crate::error::{Error, Result};

/// Width Textract reports for pages when no source file is available.
pub const TEXTRACT_DEFAULT_WIDTH: u32 = 1000;

/// Height Textract reports for pages when no source file is available.
pub const TEXTRACT_DEFAULT_HEIGHT: u32 = 1000;

/// Pixel dimensions of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDimensions {
    /// Page width in pixels
    pub width: u32,

    /// Page height in pixels
    pub height: u32,
}

impl PageDimensions {
    /// Create page dimensions. Zero extents are clamped to 1 pixel so a
    /// malformed source can never produce an empty page rectangle.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// The Textract default of 1000x1000.
    pub fn textract_default() -> Self {
        Self {
            width: TEXTRACT_DEFAULT_WIDTH,
            height: TEXTRACT_DEFAULT_HEIGHT,
        }
    }
}

impl Default for PageDimensions {
    fn default() -> Self {
        Self::textract_default()
    }
}

/// Resolves pixel dimensions for 1-based page numbers.
///
/// Implementations are side-effect-free after construction and safe for
/// concurrent use, so per-page rendering may query them in parallel.
pub trait DimensionResolver: Send + Sync {
    /// Resolve dimensions for a page.
    ///
    /// Fails with [`Error::UnsupportedPage`] when the source does not
    /// contain the page; the conversion pipeline treats that as
    /// recoverable and substitutes the Textract default for that page
    /// only.
    fn resolve(&self, page: u32) -> Result<PageDimensions>;
}

/// Resolver returning one explicit override for every page.
#[derive(Debug, Clone, Copy)]
pub struct FixedDimensions(PageDimensions);

impl FixedDimensions {
    /// Wrap explicit dimensions.
    pub fn new(dimensions: PageDimensions) -> Self {
        Self(dimensions)
    }
}

impl DimensionResolver for FixedDimensions {
    fn resolve(&self, _page: u32) -> Result<PageDimensions> {
        Ok(self.0)
    }
}

/// Resolver returning the Textract default for every page.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDimensions;

impl DimensionResolver for DefaultDimensions {
    fn resolve(&self, _page: u32) -> Result<PageDimensions> {
        Ok(PageDimensions::textract_default())
    }
}

/// Resolver backed by a source file on disk.
///
/// The file is probed once at construction; `resolve` never touches the
/// filesystem. A raster image yields the same dimensions for every page; a
/// PDF yields per-page MediaBox dimensions in points at 72 DPI.
#[derive(Debug)]
pub enum SourceDimensions {
    /// Raster image: one set of dimensions shared by all pages
    Raster(PageDimensions),
    /// PDF: dimensions per page, `None` where the page lacks a MediaBox
    Pdf(Vec<Option<PageDimensions>>),
}

impl SourceDimensions {
    /// Probe a source file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match detect::source_kind_from_path(path)? {
            SourceKind::Pdf => Self::open_pdf(path),
            SourceKind::Raster => Self::open_raster(path),
        }
    }

    fn open_raster(path: &Path) -> Result<Self> {
        let reader = image::ImageReader::open(path)?.with_guessed_format()?;
        let (width, height) = reader.into_dimensions()?;
        Ok(SourceDimensions::Raster(PageDimensions::new(width, height)))
    }

    fn open_pdf(path: &Path) -> Result<Self> {
        let doc = lopdf::Document::load(path)?;
        let pages = doc
            .get_pages()
            .values()
            .map(|&page_id| media_box_dimensions(&doc, page_id))
            .collect();
        Ok(SourceDimensions::Pdf(pages))
    }
}

impl DimensionResolver for SourceDimensions {
    fn resolve(&self, page: u32) -> Result<PageDimensions> {
        match self {
            SourceDimensions::Raster(dimensions) => Ok(*dimensions),
            SourceDimensions::Pdf(pages) => {
                let available = pages.len() as u32;
                if page < 1 || page > available {
                    return Err(Error::UnsupportedPage { page, available });
                }
                pages[(page - 1) as usize].ok_or_else(|| {
                    Error::DimensionProbe(format!("PDF page {} has no MediaBox", page))
                })
            }
        }
    }
}

/// Build the resolver for one conversion run, honoring the fixed priority:
/// explicit override, then source file, then the Textract default.
///
/// A source file that cannot be probed at all (unreadable, unknown format)
/// degrades to the default resolver with a logged warning, matching the
/// per-page fallback behavior.
pub fn resolver_for(
    override_dimensions: Option<PageDimensions>,
    source_file: Option<&Path>,
) -> Box<dyn DimensionResolver> {
    if let Some(dimensions) = override_dimensions {
        return Box::new(FixedDimensions::new(dimensions));
    }
    if let Some(path) = source_file {
        match SourceDimensions::open(path) {
            Ok(resolver) => return Box::new(resolver),
            Err(err) => log::warn!(
                "could not probe {} for dimensions, using defaults: {}",
                path.display(),
                err
            ),
        }
    }
    Box::new(DefaultDimensions)
}

/// Extract a page's MediaBox dimensions, following Parent inheritance.
fn media_box_dimensions(
    doc: &lopdf::Document,
    page_id: lopdf::ObjectId,
) -> Option<PageDimensions> {
    let mut dict = doc.get_dictionary(page_id).ok()?;
    // Parent chains are short in practice; the cap guards against cycles
    for _ in 0..32 {
        if let Ok(object) = dict.get(b"MediaBox") {
            let object = match object {
                lopdf::Object::Reference(id) => doc.get_object(*id).ok()?,
                other => other,
            };
            let array = object.as_array().ok()?;
            if array.len() != 4 {
                return None;
            }
            let x0 = number(&array[0])?;
            let y0 = number(&array[1])?;
            let x1 = number(&array[2])?;
            let y1 = number(&array[3])?;
            return Some(PageDimensions::new(
                (x1 - x0).abs().round() as u32,
                (y1 - y0).abs().round() as u32,
            ));
        }
        let parent_id = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_dictionary(parent_id).ok()?;
    }
    None
}

fn number(object: &lopdf::Object) -> Option<f64> {
    match object {
        lopdf::Object::Integer(value) => Some(*value as f64),
        lopdf::Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

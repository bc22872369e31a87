//! Source-file kind detection for dimension probing.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::Result;

/// Kind of a dimension source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A PDF document; page dimensions come from per-page metadata
    Pdf,
    /// A raster image; every page shares the image's pixel dimensions
    Raster,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Pdf => write!(f, "PDF"),
            SourceKind::Raster => write!(f, "raster image"),
        }
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Detect the source kind from a file's leading bytes.
///
/// Anything that does not carry the PDF magic is treated as a raster
/// image; whether the image format is actually readable is decided later
/// by the dimension probe.
pub fn source_kind_from_path<P: AsRef<Path>>(path: P) -> Result<SourceKind> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = [0u8; 8];
    // A single read may legally return fewer bytes than available
    let mut filled = 0;
    while filled < header.len() {
        let read = reader.read(&mut header[filled..])?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    Ok(source_kind_from_bytes(&header[..filled]))
}

/// Detect the source kind from leading bytes.
pub fn source_kind_from_bytes(data: &[u8]) -> SourceKind {
    if data.starts_with(PDF_MAGIC) {
        SourceKind::Pdf
    } else {
        SourceKind::Raster
    }
}

/// Check if bytes carry a PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    source_kind_from_bytes(data) == SourceKind::Pdf
}

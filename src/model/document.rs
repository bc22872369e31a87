//! Raw document types matching the Textract JSON schema.
//!
//! These are deliberately loose: every field is optional and nothing is
//! validated at deserialization time. Validation and conversion into typed
//! [`Block`](super::Block) variants happens when a
//! [`BlockIndex`](crate::BlockIndex) is built.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use super::geometry::NormBox;
use crate::error::Result;

/// A structured OCR result document, as produced by Textract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Document {
    /// Document-level metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_metadata: Option<DocumentMetadata>,

    /// Flat list of blocks, in source order
    #[serde(default)]
    pub blocks: Vec<RawBlock>,
}

impl Document {
    /// Parse a document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a document from JSON bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Parse a document from any reader producing JSON.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Read and parse a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Convert an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// The declared page count, if the document carries one.
    pub fn declared_page_count(&self) -> Option<u32> {
        self.document_metadata.as_ref().and_then(|m| m.pages)
    }

    /// Number of blocks in the document.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

/// Document-level metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DocumentMetadata {
    /// Declared number of pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
}

/// A raw, unvalidated block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawBlock {
    /// Block type string (`PAGE`, `LINE`, `WORD`, `TABLE`, `CELL`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_type: Option<String>,

    /// Opaque unique id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// 1-based page number; Textract omits it for single-page results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Recognized text (WORD and LINE blocks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Recognition confidence, 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Geometry (bounding box)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<RawGeometry>,

    /// Relationships to other blocks, in source order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<RawRelationship>,

    /// 1-based row index (CELL blocks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_index: Option<u32>,

    /// 1-based column index (CELL blocks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_index: Option<u32>,

    /// Rows spanned (CELL blocks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_span: Option<u32>,

    /// Columns spanned (CELL blocks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_span: Option<u32>,
}

impl RawBlock {
    /// The normalized bounding box, if geometry is present.
    pub fn bounding_box(&self) -> Option<NormBox> {
        self.geometry
            .as_ref()
            .and_then(|g| g.bounding_box.as_ref())
            .map(|b| NormBox::new(b.left, b.top, b.width, b.height))
    }
}

/// Raw geometry wrapper.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawGeometry {
    /// Normalized bounding box
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<RawBoundingBox>,
}

/// Raw normalized bounding box, fields as fractions of the page size.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawBoundingBox {
    /// Distance from the left page edge
    #[serde(default)]
    pub left: f64,

    /// Distance from the top page edge
    #[serde(default)]
    pub top: f64,

    /// Box width
    #[serde(default)]
    pub width: f64,

    /// Box height
    #[serde(default)]
    pub height: f64,
}

/// A raw relationship entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRelationship {
    /// Relationship type string (`CHILD`, `MERGED_CELL`, ...)
    #[serde(rename = "Type", default)]
    pub rel_type: String,

    /// Related block ids, in source order
    #[serde(rename = "Ids", default)]
    pub ids: Vec<String>,
}

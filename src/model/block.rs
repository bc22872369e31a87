//! Typed block variants.
//!
//! Textract emits blocks as loosely typed JSON objects; indexing converts
//! each into one closed variant carrying only the fields relevant to its
//! kind. Unrecognized block types are preserved as [`OtherBlock`] but never
//! rendered.

use serde::{Deserialize, Serialize};

use super::document::RawBlock;
use super::geometry::NormBox;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};

/// Discriminant of a block variant, used for index queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockKind {
    /// A page container
    Page,
    /// A line of text
    Line,
    /// A single word
    Word,
    /// A table region
    Table,
    /// A table cell
    Cell,
    /// Any block type this library does not render
    Other,
}

/// Relationship category between blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
    /// Containment: page to line/table, line to word, table to cell,
    /// cell to line/word
    Child,
    /// Merged-cell grouping emitted by Textract table analysis
    MergedCell,
    /// Any other relationship type
    Other,
}

impl RelationKind {
    fn parse(s: &str) -> Self {
        match s {
            "CHILD" => RelationKind::Child,
            "MERGED_CELL" => RelationKind::MergedCell,
            _ => RelationKind::Other,
        }
    }
}

/// An ordered list of related block ids of one relationship kind.
///
/// Order is significant: for `Child` it is the source's reading order and
/// is never re-sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Relationship category
    pub kind: RelationKind,

    /// Related block ids, in source order
    pub ids: Vec<String>,
}

/// A typed OCR block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// A page container
    Page(PageBlock),
    /// A line of text with word children
    Line(LineBlock),
    /// A single word with text content
    Word(WordBlock),
    /// A table region with cell children
    Table(TableBlock),
    /// A table cell with its grid position and spans
    Cell(CellBlock),
    /// An unrecognized block type, preserved but not rendered
    Other(OtherBlock),
}

/// A page container block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBlock {
    /// Opaque unique id
    pub id: String,
    /// 1-based page number
    pub page: u32,
    /// Relationships to child blocks
    pub relationships: Vec<Relationship>,
}

/// A line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineBlock {
    /// Opaque unique id
    pub id: String,
    /// 1-based page number
    pub page: u32,
    /// Normalized bounding box
    pub bbox: NormBox,
    /// Recognition confidence, 0-100
    pub confidence: Option<f64>,
    /// Relationships to word children
    pub relationships: Vec<Relationship>,
}

/// A single recognized word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordBlock {
    /// Opaque unique id
    pub id: String,
    /// 1-based page number
    pub page: u32,
    /// Normalized bounding box
    pub bbox: NormBox,
    /// Recognition confidence, 0-100
    pub confidence: Option<f64>,
    /// Recognized text
    pub text: String,
}

/// A table region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableBlock {
    /// Opaque unique id
    pub id: String,
    /// 1-based page number
    pub page: u32,
    /// Normalized bounding box
    pub bbox: NormBox,
    /// Recognition confidence, 0-100
    pub confidence: Option<f64>,
    /// Relationships to cell children
    pub relationships: Vec<Relationship>,
}

/// A table cell with its declared grid position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellBlock {
    /// Opaque unique id
    pub id: String,
    /// 1-based page number
    pub page: u32,
    /// Normalized bounding box
    pub bbox: NormBox,
    /// Recognition confidence, 0-100
    pub confidence: Option<f64>,
    /// 1-based row of the cell origin
    pub row_index: u32,
    /// 1-based column of the cell origin
    pub column_index: u32,
    /// Rows this cell spans (>= 1)
    pub row_span: u32,
    /// Columns this cell spans (>= 1)
    pub column_span: u32,
    /// Relationships to line/word children
    pub relationships: Vec<Relationship>,
}

/// A block of a type this library does not render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherBlock {
    /// Opaque unique id
    pub id: String,
    /// 1-based page number
    pub page: u32,
    /// Raw block type string from the source (e.g. `KEY_VALUE_SET`)
    pub block_type: String,
    /// Relationships to other blocks
    pub relationships: Vec<Relationship>,
}

impl Block {
    /// The block's unique id.
    pub fn id(&self) -> &str {
        match self {
            Block::Page(b) => &b.id,
            Block::Line(b) => &b.id,
            Block::Word(b) => &b.id,
            Block::Table(b) => &b.id,
            Block::Cell(b) => &b.id,
            Block::Other(b) => &b.id,
        }
    }

    /// The 1-based page number this block belongs to.
    pub fn page_number(&self) -> u32 {
        match self {
            Block::Page(b) => b.page,
            Block::Line(b) => b.page,
            Block::Word(b) => b.page,
            Block::Table(b) => b.page,
            Block::Cell(b) => b.page,
            Block::Other(b) => b.page,
        }
    }

    /// The variant discriminant.
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Page(_) => BlockKind::Page,
            Block::Line(_) => BlockKind::Line,
            Block::Word(_) => BlockKind::Word,
            Block::Table(_) => BlockKind::Table,
            Block::Cell(_) => BlockKind::Cell,
            Block::Other(_) => BlockKind::Other,
        }
    }

    /// The normalized bounding box, if this variant carries one.
    pub fn bbox(&self) -> Option<&NormBox> {
        match self {
            Block::Line(b) => Some(&b.bbox),
            Block::Word(b) => Some(&b.bbox),
            Block::Table(b) => Some(&b.bbox),
            Block::Cell(b) => Some(&b.bbox),
            Block::Page(_) | Block::Other(_) => None,
        }
    }

    /// Recognition confidence, if present.
    pub fn confidence(&self) -> Option<f64> {
        match self {
            Block::Line(b) => b.confidence,
            Block::Word(b) => b.confidence,
            Block::Table(b) => b.confidence,
            Block::Cell(b) => b.confidence,
            Block::Page(_) | Block::Other(_) => None,
        }
    }

    /// The block's relationships.
    pub fn relationships(&self) -> &[Relationship] {
        match self {
            Block::Page(b) => &b.relationships,
            Block::Line(b) => &b.relationships,
            Block::Word(_) => &[],
            Block::Table(b) => &b.relationships,
            Block::Cell(b) => &b.relationships,
            Block::Other(b) => &b.relationships,
        }
    }

    /// Child ids of the given relationship kind, in source order.
    pub fn related_ids(&self, kind: RelationKind) -> impl Iterator<Item = &str> {
        self.relationships()
            .iter()
            .filter(move |r| r.kind == kind)
            .flat_map(|r| r.ids.iter().map(String::as_str))
    }

    /// Downcast to a word block.
    pub fn as_word(&self) -> Option<&WordBlock> {
        match self {
            Block::Word(b) => Some(b),
            _ => None,
        }
    }

    /// Downcast to a line block.
    pub fn as_line(&self) -> Option<&LineBlock> {
        match self {
            Block::Line(b) => Some(b),
            _ => None,
        }
    }

    /// Downcast to a cell block.
    pub fn as_cell(&self) -> Option<&CellBlock> {
        match self {
            Block::Cell(b) => Some(b),
            _ => None,
        }
    }

    /// Downcast to a table block.
    pub fn as_table(&self) -> Option<&TableBlock> {
        match self {
            Block::Table(b) => Some(b),
            _ => None,
        }
    }

    /// Convert a raw source block into its typed variant.
    ///
    /// Returns `None` when the block is missing required fields or carries
    /// a non-renderable bounding box; a diagnostic is recorded either way.
    pub(crate) fn from_raw(raw: &RawBlock, diagnostics: &mut Diagnostics) -> Option<Block> {
        let id = match raw.id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::MalformedBlock,
                    "block without an id dropped",
                ));
                return None;
            }
        };

        // Textract omits `Page` for single-page results
        let page = raw.page.unwrap_or(1);
        let block_type = raw.block_type.as_deref().unwrap_or("");
        let relationships = convert_relationships(raw);

        match block_type {
            "PAGE" => Some(Block::Page(PageBlock {
                id,
                page,
                relationships,
            })),
            "LINE" => Some(Block::Line(LineBlock {
                bbox: renderable_bbox(raw, &id, page, diagnostics)?,
                id,
                page,
                confidence: raw.confidence,
                relationships,
            })),
            "WORD" => {
                let text = match raw.text.clone() {
                    Some(text) => text,
                    None => {
                        diagnostics.push(
                            Diagnostic::new(
                                DiagnosticKind::MalformedBlock,
                                "WORD block without text dropped",
                            )
                            .on_page(page)
                            .for_block(&id),
                        );
                        return None;
                    }
                };
                Some(Block::Word(WordBlock {
                    bbox: renderable_bbox(raw, &id, page, diagnostics)?,
                    id,
                    page,
                    confidence: raw.confidence,
                    text,
                }))
            }
            "TABLE" => Some(Block::Table(TableBlock {
                bbox: renderable_bbox(raw, &id, page, diagnostics)?,
                id,
                page,
                confidence: raw.confidence,
                relationships,
            })),
            "CELL" => {
                let (row_index, column_index) = match (raw.row_index, raw.column_index) {
                    (Some(r), Some(c)) if r >= 1 && c >= 1 => (r, c),
                    _ => {
                        diagnostics.push(
                            Diagnostic::new(
                                DiagnosticKind::MalformedBlock,
                                "CELL block without a valid grid position dropped",
                            )
                            .on_page(page)
                            .for_block(&id),
                        );
                        return None;
                    }
                };
                Some(Block::Cell(CellBlock {
                    bbox: renderable_bbox(raw, &id, page, diagnostics)?,
                    id,
                    page,
                    confidence: raw.confidence,
                    row_index,
                    column_index,
                    row_span: raw.row_span.unwrap_or(1).max(1),
                    column_span: raw.column_span.unwrap_or(1).max(1),
                    relationships,
                }))
            }
            other => Some(Block::Other(OtherBlock {
                id,
                page,
                block_type: other.to_string(),
                relationships,
            })),
        }
    }
}

fn renderable_bbox(
    raw: &RawBlock,
    id: &str,
    page: u32,
    diagnostics: &mut Diagnostics,
) -> Option<NormBox> {
    let block_type = raw.block_type.as_deref().unwrap_or("");
    match raw.bounding_box() {
        Some(bbox) if bbox.is_renderable() => Some(bbox),
        Some(_) => {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::DegenerateBox,
                    format!("{} block with non-positive bbox dropped", block_type),
                )
                .on_page(page)
                .for_block(id),
            );
            None
        }
        None => {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::MalformedBlock,
                    format!("{} block without geometry dropped", block_type),
                )
                .on_page(page)
                .for_block(id),
            );
            None
        }
    }
}

fn convert_relationships(raw: &RawBlock) -> Vec<Relationship> {
    raw.relationships
        .iter()
        .map(|r| Relationship {
            kind: RelationKind::parse(&r.rel_type),
            ids: r.ids.clone(),
        })
        .collect()
}

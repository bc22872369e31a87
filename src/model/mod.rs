//! Document model: raw Textract JSON types, typed blocks, and geometry.

mod block;
mod document;
mod geometry;

pub use block::{
    Block, BlockKind, CellBlock, LineBlock, OtherBlock, PageBlock, RelationKind, Relationship,
    TableBlock, WordBlock,
};
pub use document::{Document, DocumentMetadata, RawBlock, RawBoundingBox, RawGeometry, RawRelationship};
pub use geometry::{NormBox, PixelBox};

//! Block index: an addressable map over the document's flat block list.

use std::collections::{HashMap, HashSet};

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::{Error, Result};
use crate::model::{Block, BlockKind, Document, RelationKind};
use crate::parser::ErrorMode;

/// An immutable index over a document's blocks.
///
/// Built once per conversion: raw blocks are converted into typed variants
/// (malformed ones dropped with a diagnostic), relationships are validated
/// against the input id set, and blocks become addressable by id, kind, and
/// page. Block order within the index is the source order.
#[derive(Debug)]
pub struct BlockIndex {
    blocks: Vec<Block>,
    by_id: HashMap<String, usize>,
    page_count: u32,
}

impl BlockIndex {
    /// Build an index from a parsed document.
    ///
    /// Dangling relationship ids (ids absent from the input set) are a
    /// schema error in [`ErrorMode::Strict`] and a
    /// [`DiagnosticKind::DanglingReference`] diagnostic in
    /// [`ErrorMode::Lenient`]. References to blocks that were themselves
    /// dropped as malformed are pruned silently; the drop already produced
    /// its own diagnostic.
    pub fn build(
        document: &Document,
        mode: ErrorMode,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        // Ids as they appear in the input, before any block is dropped.
        // Dangling means absent from this set, not merely dropped.
        let raw_ids: HashSet<&str> = document
            .blocks
            .iter()
            .filter_map(|b| b.id.as_deref())
            .collect();

        let mut blocks = Vec::with_capacity(document.blocks.len());
        for raw in &document.blocks {
            if let Some(block) = Block::from_raw(raw, diagnostics) {
                blocks.push(block);
            }
        }

        let mut by_id = HashMap::with_capacity(blocks.len());
        for (position, block) in blocks.iter().enumerate() {
            by_id.insert(block.id().to_string(), position);
        }

        // Validate relationships against the raw id set, then prune ids
        // that no longer resolve to a kept block.
        for block in &mut blocks {
            let owner = block.id().to_string();
            let page = block.page_number();
            for relationship in match block {
                Block::Page(b) => &mut b.relationships,
                Block::Line(b) => &mut b.relationships,
                Block::Table(b) => &mut b.relationships,
                Block::Cell(b) => &mut b.relationships,
                Block::Other(b) => &mut b.relationships,
                Block::Word(_) => continue,
            } {
                let mut kept = Vec::with_capacity(relationship.ids.len());
                for id in relationship.ids.drain(..) {
                    if !raw_ids.contains(id.as_str()) {
                        match mode {
                            ErrorMode::Strict => {
                                return Err(Error::Schema(format!(
                                    "block {} references unknown id {}",
                                    owner, id
                                )));
                            }
                            ErrorMode::Lenient => {
                                diagnostics.push(
                                    Diagnostic::new(
                                        DiagnosticKind::DanglingReference,
                                        format!("reference to unknown id {} dropped", id),
                                    )
                                    .on_page(page)
                                    .for_block(&owner),
                                );
                            }
                        }
                    } else if by_id.contains_key(&id) {
                        kept.push(id);
                    }
                    // else: target block was dropped as malformed, prune
                }
                relationship.ids = kept;
            }
        }

        let declared = document.declared_page_count();
        let observed = blocks.iter().map(Block::page_number).max().unwrap_or(0);
        let page_count = declared.unwrap_or(observed);

        Ok(Self {
            blocks,
            by_id,
            page_count,
        })
    }

    /// Number of pages: the document-declared count when present, else the
    /// maximum page number observed across blocks.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Total number of indexed blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the index holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Look up a block by id.
    pub fn get(&self, id: &str) -> Option<&Block> {
        self.by_id.get(id).map(|&position| &self.blocks[position])
    }

    /// Related blocks of the given relationship kind, in source order.
    ///
    /// Returns an empty vector for an unknown id.
    pub fn related_of(&self, id: &str, kind: RelationKind) -> Vec<&Block> {
        let Some(block) = self.get(id) else {
            return Vec::new();
        };
        block
            .related_ids(kind)
            .filter_map(|child_id| self.get(child_id))
            .collect()
    }

    /// Child blocks (`CHILD` relationship), in source order.
    pub fn children_of(&self, id: &str) -> Vec<&Block> {
        self.related_of(id, RelationKind::Child)
    }

    /// All blocks of one kind, optionally restricted to a page,
    /// in source order.
    pub fn blocks_of_kind(&self, kind: BlockKind, page: Option<u32>) -> Vec<&Block> {
        self.blocks
            .iter()
            .filter(|b| b.kind() == kind)
            .filter(|b| page.map_or(true, |p| b.page_number() == p))
            .collect()
    }

    /// Iterate over all indexed blocks in source order.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawBlock, RawBoundingBox, RawGeometry, RawRelationship};

    fn raw(block_type: &str, id: &str, page: u32) -> RawBlock {
        RawBlock {
            block_type: Some(block_type.into()),
            id: Some(id.into()),
            page: Some(page),
            text: if block_type == "WORD" {
                Some(format!("text-{}", id))
            } else {
                None
            },
            confidence: Some(90.0),
            geometry: Some(RawGeometry {
                bounding_box: Some(RawBoundingBox {
                    left: 0.1,
                    top: 0.1,
                    width: 0.2,
                    height: 0.05,
                }),
            }),
            relationships: Vec::new(),
            row_index: None,
            column_index: None,
            row_span: None,
            column_span: None,
        }
    }

    fn with_children(mut block: RawBlock, ids: &[&str]) -> RawBlock {
        block.relationships = vec![RawRelationship {
            rel_type: "CHILD".into(),
            ids: ids.iter().map(|s| s.to_string()).collect(),
        }];
        block
    }

    #[test]
    fn test_build_and_lookup() {
        let doc = Document {
            document_metadata: None,
            blocks: vec![
                with_children(raw("LINE", "l1", 1), &["w1", "w2"]),
                raw("WORD", "w1", 1),
                raw("WORD", "w2", 1),
            ],
        };
        let mut diags = Diagnostics::new();
        let index = BlockIndex::build(&doc, ErrorMode::Strict, &mut diags).unwrap();

        assert_eq!(index.len(), 3);
        assert!(index.get("l1").is_some());
        let words = index.children_of("l1");
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].id(), "w1");
        assert_eq!(words[1].id(), "w2");
    }

    #[test]
    fn test_children_preserve_relation_order() {
        // Relation order differs from block declaration order
        let doc = Document {
            document_metadata: None,
            blocks: vec![
                with_children(raw("LINE", "l1", 1), &["w2", "w1"]),
                raw("WORD", "w1", 1),
                raw("WORD", "w2", 1),
            ],
        };
        let mut diags = Diagnostics::new();
        let index = BlockIndex::build(&doc, ErrorMode::Strict, &mut diags).unwrap();

        let ids: Vec<_> = index.children_of("l1").iter().map(|b| b.id()).collect();
        assert_eq!(ids, vec!["w2", "w1"]);
    }

    #[test]
    fn test_dangling_reference_strict_fails() {
        let doc = Document {
            document_metadata: None,
            blocks: vec![with_children(raw("LINE", "l1", 1), &["missing"])],
        };
        let mut diags = Diagnostics::new();
        let result = BlockIndex::build(&doc, ErrorMode::Strict, &mut diags);
        assert!(matches!(result, Err(Error::Schema(_))));
    }

    #[test]
    fn test_dangling_reference_lenient_drops() {
        let doc = Document {
            document_metadata: None,
            blocks: vec![
                with_children(raw("LINE", "l1", 1), &["missing", "w1"]),
                raw("WORD", "w1", 1),
            ],
        };
        let mut diags = Diagnostics::new();
        let index = BlockIndex::build(&doc, ErrorMode::Lenient, &mut diags).unwrap();

        assert!(diags.has(DiagnosticKind::DanglingReference));
        let ids: Vec<_> = index.children_of("l1").iter().map(|b| b.id()).collect();
        assert_eq!(ids, vec!["w1"]);
    }

    #[test]
    fn test_reference_to_dropped_block_pruned_silently() {
        // w1 exists in the input but is malformed (no text), so it is
        // dropped; the line's reference to it must not be a schema error
        // even in strict mode.
        let mut bad_word = raw("WORD", "w1", 1);
        bad_word.text = None;
        let doc = Document {
            document_metadata: None,
            blocks: vec![with_children(raw("LINE", "l1", 1), &["w1"]), bad_word],
        };
        let mut diags = Diagnostics::new();
        let index = BlockIndex::build(&doc, ErrorMode::Strict, &mut diags).unwrap();

        assert!(diags.has(DiagnosticKind::MalformedBlock));
        assert!(!diags.has(DiagnosticKind::DanglingReference));
        assert!(index.children_of("l1").is_empty());
    }

    #[test]
    fn test_page_count_prefers_declared() {
        let doc = Document {
            document_metadata: Some(crate::model::DocumentMetadata { pages: Some(5) }),
            blocks: vec![raw("WORD", "w1", 2)],
        };
        let mut diags = Diagnostics::new();
        let index = BlockIndex::build(&doc, ErrorMode::Strict, &mut diags).unwrap();
        assert_eq!(index.page_count(), 5);
    }

    #[test]
    fn test_page_count_falls_back_to_observed() {
        let doc = Document {
            document_metadata: None,
            blocks: vec![raw("WORD", "w1", 3), raw("WORD", "w2", 1)],
        };
        let mut diags = Diagnostics::new();
        let index = BlockIndex::build(&doc, ErrorMode::Strict, &mut diags).unwrap();
        assert_eq!(index.page_count(), 3);
    }

    #[test]
    fn test_blocks_of_kind_with_page_filter() {
        let doc = Document {
            document_metadata: None,
            blocks: vec![
                raw("LINE", "l1", 1),
                raw("LINE", "l2", 2),
                raw("WORD", "w1", 1),
            ],
        };
        let mut diags = Diagnostics::new();
        let index = BlockIndex::build(&doc, ErrorMode::Strict, &mut diags).unwrap();

        assert_eq!(index.blocks_of_kind(BlockKind::Line, None).len(), 2);
        let page1_lines = index.blocks_of_kind(BlockKind::Line, Some(1));
        assert_eq!(page1_lines.len(), 1);
        assert_eq!(page1_lines[0].id(), "l1");
    }

    #[test]
    fn test_empty_document_index() {
        let doc = Document::default();
        let mut diags = Diagnostics::new();
        let index = BlockIndex::build(&doc, ErrorMode::Strict, &mut diags).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.page_count(), 0);
    }
}

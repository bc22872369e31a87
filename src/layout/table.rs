//! Table grid assembly from cell blocks.

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::{Error, Result};
use crate::model::{CellBlock, TableBlock, WordBlock};
use crate::parser::BlockIndex;

use super::LineLayout;

/// Grid extents beyond this are treated as malformed input rather than a
/// genuine layout, so a corrupt index can never drive a huge allocation.
const MAX_GRID_EXTENT: u32 = 4096;

/// How table cell placement conflicts are handled.
///
/// Independent of the indexing [`ErrorMode`](crate::ErrorMode): a cell
/// conflict is a per-element anomaly, so the default recovers and lets the
/// rest of the document render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// The first-placed cell keeps the slot; the conflict is recorded as a
    /// diagnostic
    #[default]
    Recover,
    /// Abort the conversion with [`Error::LayoutConflict`]
    Fail,
}

/// One cell with its resolved text content.
#[derive(Debug)]
pub struct CellContent<'a> {
    /// The source cell block
    pub cell: &'a CellBlock,

    /// Line children with their words, in relation order
    pub lines: Vec<LineLayout<'a>>,

    /// Direct word children, in relation order
    pub words: Vec<&'a WordBlock>,
}

impl CellContent<'_> {
    /// Whether the cell has no text content at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.words.is_empty()
    }
}

/// A table resolved into a dense grid.
///
/// Every slot covered by a cell's span points back at that cell; slots no
/// cell covers stay empty. Cell order is the table's child relation order.
#[derive(Debug)]
pub struct TableLayout<'a> {
    /// The source table block
    pub table: &'a TableBlock,

    /// Number of grid rows
    pub row_count: u32,

    /// Number of grid columns
    pub column_count: u32,

    cells: Vec<CellContent<'a>>,
    grid: Vec<Option<usize>>,
}

impl<'a> TableLayout<'a> {
    /// Assemble a table's cells into a grid.
    ///
    /// Cells are placed at their declared 1-based origin and claim every
    /// slot their spans cover. Two cells claiming the same slot recovers
    /// first-writer-wins with a diagnostic under
    /// [`ConflictPolicy::Recover`]; [`ConflictPolicy::Fail`] turns it into
    /// an [`Error::LayoutConflict`].
    pub fn assemble(
        index: &'a BlockIndex,
        table: &'a TableBlock,
        policy: ConflictPolicy,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let mut cells: Vec<CellContent<'a>> = Vec::new();
        for child in index.children_of(&table.id) {
            let Some(cell) = child.as_cell() else {
                continue;
            };
            if cell.row_index.saturating_add(cell.row_span) - 1 > MAX_GRID_EXTENT
                || cell.column_index.saturating_add(cell.column_span) - 1 > MAX_GRID_EXTENT
            {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::MalformedBlock,
                        format!(
                            "cell at ({}, {}) exceeds the supported grid extent",
                            cell.row_index, cell.column_index
                        ),
                    )
                    .on_page(table.page)
                    .for_block(&cell.id),
                );
                continue;
            }
            cells.push(cell_content(index, cell));
        }

        let row_count = cells
            .iter()
            .map(|c| c.cell.row_index + c.cell.row_span - 1)
            .max()
            .unwrap_or(0);
        let column_count = cells
            .iter()
            .map(|c| c.cell.column_index + c.cell.column_span - 1)
            .max()
            .unwrap_or(0);

        let mut grid: Vec<Option<usize>> =
            vec![None; (row_count as usize) * (column_count as usize)];
        let slot = |row: u32, column: u32| -> usize {
            ((row - 1) as usize) * (column_count as usize) + (column - 1) as usize
        };

        let mut keep = vec![true; cells.len()];
        for (position, content) in cells.iter().enumerate() {
            let cell = content.cell;
            if grid[slot(cell.row_index, cell.column_index)].is_some() {
                // The origin itself is taken: the whole cell loses.
                conflict(
                    policy,
                    diagnostics,
                    table,
                    cell,
                    cell.row_index,
                    cell.column_index,
                )?;
                keep[position] = false;
                continue;
            }
            for row in cell.row_index..cell.row_index + cell.row_span {
                for column in cell.column_index..cell.column_index + cell.column_span {
                    match grid[slot(row, column)] {
                        Some(_) => conflict(policy, diagnostics, table, cell, row, column)?,
                        None => grid[slot(row, column)] = Some(position),
                    }
                }
            }
        }

        // Drop conflicted cells and remap the grid to the compacted vector.
        let mut remap = vec![usize::MAX; cells.len()];
        let mut compacted = Vec::with_capacity(cells.len());
        for (position, content) in cells.into_iter().enumerate() {
            if keep[position] {
                remap[position] = compacted.len();
                compacted.push(content);
            }
        }
        for entry in &mut grid {
            *entry = entry.and_then(|position| {
                if keep[position] {
                    Some(remap[position])
                } else {
                    None
                }
            });
        }

        Ok(Self {
            table,
            row_count,
            column_count,
            cells: compacted,
            grid,
        })
    }

    /// Cells in the table's child relation order.
    pub fn cells(&self) -> &[CellContent<'a>] {
        &self.cells
    }

    /// Cells sorted by grid position, row-major.
    pub fn cells_in_reading_order(&self) -> Vec<&CellContent<'a>> {
        let mut ordered: Vec<&CellContent<'a>> = self.cells.iter().collect();
        ordered.sort_by_key(|c| (c.cell.row_index, c.cell.column_index));
        ordered
    }

    /// The cell covering a 1-based grid slot, if any.
    ///
    /// A spanning cell is returned for every slot it covers, not only its
    /// origin.
    pub fn cell_at(&self, row: u32, column: u32) -> Option<&CellContent<'a>> {
        if row < 1 || row > self.row_count || column < 1 || column > self.column_count {
            return None;
        }
        let slot =
            ((row - 1) as usize) * (self.column_count as usize) + (column - 1) as usize;
        self.grid[slot].map(|position| &self.cells[position])
    }

    /// Whether the slot is the covering cell's declared origin.
    pub fn is_origin(&self, row: u32, column: u32) -> bool {
        self.cell_at(row, column)
            .map(|c| c.cell.row_index == row && c.cell.column_index == column)
            .unwrap_or(false)
    }
}

fn cell_content<'a>(index: &'a BlockIndex, cell: &'a CellBlock) -> CellContent<'a> {
    let mut lines = Vec::new();
    let mut words = Vec::new();
    for child in index.children_of(&cell.id) {
        if let Some(line) = child.as_line() {
            let line_words = index
                .children_of(&line.id)
                .into_iter()
                .filter_map(|b| b.as_word())
                .collect();
            lines.push(LineLayout {
                line,
                words: line_words,
            });
        } else if let Some(word) = child.as_word() {
            words.push(word);
        }
    }
    CellContent { cell, lines, words }
}

fn conflict(
    policy: ConflictPolicy,
    diagnostics: &mut Diagnostics,
    table: &TableBlock,
    cell: &CellBlock,
    row: u32,
    column: u32,
) -> Result<()> {
    match policy {
        ConflictPolicy::Fail => Err(Error::LayoutConflict {
            table: table.id.clone(),
            row,
            column,
        }),
        ConflictPolicy::Recover => {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::LayoutConflict,
                    format!("two cells claim grid slot ({}, {})", row, column),
                )
                .on_page(table.page)
                .for_block(&cell.id),
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Document, RawBlock, RawBoundingBox, RawGeometry, RawRelationship};
    use crate::parser::ErrorMode;

    fn raw(block_type: &str, id: &str) -> RawBlock {
        RawBlock {
            block_type: Some(block_type.into()),
            id: Some(id.into()),
            page: Some(1),
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

    fn cell(id: &str, row: u32, column: u32, row_span: u32, column_span: u32) -> RawBlock {
        let mut block = raw("CELL", id);
        block.row_index = Some(row);
        block.column_index = Some(column);
        block.row_span = Some(row_span);
        block.column_span = Some(column_span);
        block
    }

    fn with_children(mut block: RawBlock, ids: &[&str]) -> RawBlock {
        block.relationships = vec![RawRelationship {
            rel_type: "CHILD".into(),
            ids: ids.iter().map(|s| s.to_string()).collect(),
        }];
        block
    }

    fn build(blocks: Vec<RawBlock>) -> (BlockIndex, Diagnostics) {
        let doc = Document {
            document_metadata: None,
            blocks,
        };
        let mut diags = Diagnostics::new();
        let index = BlockIndex::build(&doc, ErrorMode::Strict, &mut diags).unwrap();
        (index, diags)
    }

    fn assemble_first<'a>(
        index: &'a BlockIndex,
        policy: ConflictPolicy,
        diags: &mut Diagnostics,
    ) -> Result<TableLayout<'a>> {
        let table = index.get("t1").unwrap().as_table().unwrap();
        TableLayout::assemble(index, table, policy, diags)
    }

    #[test]
    fn test_simple_grid() {
        let (index, mut diags) = build(
            vec![
                with_children(raw("TABLE", "t1"), &["c11", "c12", "c21", "c22"]),
                with_children(cell("c11", 1, 1, 1, 1), &["w1"]),
                cell("c12", 1, 2, 1, 1),
                cell("c21", 2, 1, 1, 1),
                cell("c22", 2, 2, 1, 1),
                raw("WORD", "w1"),
            ]);
        let layout = assemble_first(&index, ConflictPolicy::Recover, &mut diags).unwrap();

        assert_eq!(layout.row_count, 2);
        assert_eq!(layout.column_count, 2);
        assert_eq!(layout.cells().len(), 4);
        assert_eq!(layout.cell_at(1, 1).unwrap().cell.id, "c11");
        assert_eq!(layout.cell_at(1, 1).unwrap().words.len(), 1);
        assert!(layout.cell_at(3, 1).is_none());
    }

    #[test]
    fn test_span_covers_slots() {
        // 2x3 grid where the cell at (1, 1) spans two columns
        let (index, mut diags) = build(
            vec![
                with_children(raw("TABLE", "t1"), &["a", "b", "c", "d", "e"]),
                cell("a", 1, 1, 1, 2),
                cell("b", 1, 3, 1, 1),
                cell("c", 2, 1, 1, 1),
                cell("d", 2, 2, 1, 1),
                cell("e", 2, 3, 1, 1),
            ]);
        let layout = assemble_first(&index, ConflictPolicy::Recover, &mut diags).unwrap();

        assert_eq!(layout.row_count, 2);
        assert_eq!(layout.column_count, 3);
        assert_eq!(layout.cell_at(1, 2).unwrap().cell.id, "a");
        assert!(layout.is_origin(1, 1));
        assert!(!layout.is_origin(1, 2));
    }

    #[test]
    fn test_conflict_fail_policy_errors() {
        let (index, mut diags) = build(
            vec![
                with_children(raw("TABLE", "t1"), &["a", "b"]),
                cell("a", 1, 1, 1, 2),
                cell("b", 1, 2, 1, 1),
            ]);
        let result = assemble_first(&index, ConflictPolicy::Fail, &mut diags);
        assert!(matches!(
            result,
            Err(Error::LayoutConflict {
                row: 1,
                column: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_conflict_default_keeps_first() {
        let (index, mut diags) = build(
            vec![
                with_children(raw("TABLE", "t1"), &["a", "b"]),
                cell("a", 1, 1, 1, 2),
                cell("b", 1, 2, 1, 1),
            ]);
        let layout =
            assemble_first(&index, ConflictPolicy::default(), &mut diags).unwrap();

        assert!(diags.has(DiagnosticKind::LayoutConflict));
        // b's origin was taken, so b is dropped entirely
        assert_eq!(layout.cells().len(), 1);
        assert_eq!(layout.cell_at(1, 2).unwrap().cell.id, "a");
    }

    #[test]
    fn test_reading_order_sorts_by_grid() {
        let (index, mut diags) = build(
            vec![
                with_children(raw("TABLE", "t1"), &["late", "early"]),
                cell("late", 2, 1, 1, 1),
                cell("early", 1, 1, 1, 1),
            ]);
        let layout = assemble_first(&index, ConflictPolicy::Recover, &mut diags).unwrap();

        let ordered: Vec<_> = layout
            .cells_in_reading_order()
            .iter()
            .map(|c| c.cell.id.as_str())
            .collect();
        assert_eq!(ordered, vec!["early", "late"]);
        // Relation order is preserved in cells()
        assert_eq!(layout.cells()[0].cell.id, "late");
    }

    #[test]
    fn test_cell_line_children_resolved() {
        let (index, mut diags) = build(
            vec![
                with_children(raw("TABLE", "t1"), &["c"]),
                with_children(cell("c", 1, 1, 1, 1), &["l1"]),
                with_children(raw("LINE", "l1"), &["w1", "w2"]),
                raw("WORD", "w1"),
                raw("WORD", "w2"),
            ]);
        let layout = assemble_first(&index, ConflictPolicy::Recover, &mut diags).unwrap();

        let content = layout.cell_at(1, 1).unwrap();
        assert_eq!(content.lines.len(), 1);
        assert_eq!(content.lines[0].words.len(), 2);
        assert!(content.words.is_empty());
        assert!(!content.is_empty());
    }

    #[test]
    fn test_empty_table() {
        let (index, mut diags) =
            build(vec![raw("TABLE", "t1")]);
        let layout = assemble_first(&index, ConflictPolicy::Recover, &mut diags).unwrap();
        assert_eq!(layout.row_count, 0);
        assert_eq!(layout.column_count, 0);
        assert!(layout.cells().is_empty());
    }

    #[test]
    fn test_oversized_grid_position_dropped() {
        let (index, mut diags) = build(
            vec![
                with_children(raw("TABLE", "t1"), &["big", "ok"]),
                cell("big", 1, 100_000, 1, 1),
                cell("ok", 1, 1, 1, 1),
            ]);
        let layout = assemble_first(&index, ConflictPolicy::Recover, &mut diags).unwrap();

        assert!(diags.has(DiagnosticKind::MalformedBlock));
        assert_eq!(layout.cells().len(), 1);
        assert_eq!(layout.column_count, 1);
    }
}

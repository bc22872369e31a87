//! Page layout: reading-block grouping and table assembly.
//!
//! The flat block index has no usable document order. This module imposes
//! one: lines that are not owned by a table are clustered into reading
//! blocks by vertical overlap, tables are resolved into dense grids, and
//! both are interleaved top-to-bottom for emission.

mod grouper;
mod table;

pub use grouper::{group_lines, ReadingBlock};
pub use table::{CellContent, ConflictPolicy, TableLayout};

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::model::{BlockKind, LineBlock, WordBlock};
use crate::parser::BlockIndex;

/// A line with its word children resolved, in relation order.
#[derive(Debug)]
pub struct LineLayout<'a> {
    /// The source line block
    pub line: &'a LineBlock,

    /// Word children, in relation order
    pub words: Vec<&'a WordBlock>,
}

/// One top-level item of a page, in emission order.
#[derive(Debug)]
pub enum PageItem<'a> {
    /// A synthetic reading block of grouped lines
    Block(ReadingBlock<'a>),
    /// An assembled table
    Table(TableLayout<'a>),
}

impl PageItem<'_> {
    fn top(&self) -> f64 {
        match self {
            PageItem::Block(block) => block.bbox.top,
            PageItem::Table(table) => table.table.bbox.top,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            PageItem::Block(_) => 0,
            PageItem::Table(_) => 1,
        }
    }
}

/// The resolved layout of one page.
#[derive(Debug)]
pub struct PageLayout<'a> {
    /// 1-based page number
    pub number: u32,

    /// Top-level items, sorted by top edge; reading blocks sort before
    /// tables that start at the same height
    pub items: Vec<PageItem<'a>>,
}

/// Resolve one page's layout.
///
/// Tables are assembled first; lines a table owns are then withheld from
/// the page flow so their text appears exactly once. A line belongs to a
/// table when it is a direct cell child, or when any of its words is
/// claimed by a cell.
pub fn layout_page<'a>(
    index: &'a BlockIndex,
    page: u32,
    conflicts: ConflictPolicy,
    diagnostics: &mut Diagnostics,
) -> Result<PageLayout<'a>> {
    let mut tables = Vec::new();
    for block in index.blocks_of_kind(BlockKind::Table, Some(page)) {
        if let Some(table) = block.as_table() {
            tables.push(TableLayout::assemble(index, table, conflicts, diagnostics)?);
        }
    }

    let mut table_line_ids: HashSet<&str> = HashSet::new();
    let mut table_word_ids: HashSet<&str> = HashSet::new();
    for layout in &tables {
        for content in layout.cells() {
            for word in &content.words {
                table_word_ids.insert(word.id.as_str());
            }
            for line in &content.lines {
                table_line_ids.insert(line.line.id.as_str());
                for word in &line.words {
                    table_word_ids.insert(word.id.as_str());
                }
            }
        }
    }

    let mut free_lines = Vec::new();
    for block in index.blocks_of_kind(BlockKind::Line, Some(page)) {
        let Some(line) = block.as_line() else {
            continue;
        };
        if table_line_ids.contains(line.id.as_str()) {
            continue;
        }
        let words: Vec<&WordBlock> = index
            .children_of(&line.id)
            .into_iter()
            .filter_map(|b| b.as_word())
            .collect();
        if words.iter().any(|w| table_word_ids.contains(w.id.as_str())) {
            continue;
        }
        free_lines.push(LineLayout { line, words });
    }

    let mut items: Vec<PageItem<'a>> = group_lines(free_lines, page)
        .into_iter()
        .map(PageItem::Block)
        .collect();
    items.extend(tables.into_iter().map(PageItem::Table));
    items.sort_by(|a, b| {
        a.top()
            .partial_cmp(&b.top())
            .unwrap_or(Ordering::Equal)
            .then(a.rank().cmp(&b.rank()))
    });

    Ok(PageLayout {
        number: page,
        items,
    })
}

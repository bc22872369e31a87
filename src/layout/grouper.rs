//! Grouping of lines into reading blocks by vertical overlap.

use std::cmp::Ordering;

use super::LineLayout;
use crate::model::NormBox;

/// A synthetic grouping of lines that vertically overlap.
///
/// Not present in the source document; created during conversion and
/// discarded after emission. The id is deterministic:
/// `block_<page>_<ordinal>`, 1-based per page in emission order.
#[derive(Debug)]
pub struct ReadingBlock<'a> {
    /// Synthetic block id
    pub id: String,

    /// Member lines, in sweep order (top to bottom)
    pub lines: Vec<LineLayout<'a>>,

    /// Union of all member line boxes
    pub bbox: NormBox,
}

/// Cluster a page's lines into reading blocks.
///
/// Lines are sorted by `top` ascending, ties broken by `left` ascending
/// and then by the original relation order (the sort is stable). A single
/// sweep then grows an open group while each next line's vertical interval
/// overlaps the group's extent by any positive amount; a gap closes the
/// group and opens a new one. Groups are returned in the order they close,
/// which is top-to-bottom.
pub fn group_lines<'a>(lines: Vec<LineLayout<'a>>, page: u32) -> Vec<ReadingBlock<'a>> {
    let mut sorted = lines;
    sorted.sort_by(|a, b| {
        a.line
            .bbox
            .top
            .partial_cmp(&b.line.bbox.top)
            .unwrap_or(Ordering::Equal)
            .then(
                a.line
                    .bbox
                    .left
                    .partial_cmp(&b.line.bbox.left)
                    .unwrap_or(Ordering::Equal),
            )
    });

    let mut groups: Vec<ReadingBlock<'a>> = Vec::new();
    let mut open: Vec<LineLayout<'a>> = Vec::new();
    let mut extent: Option<NormBox> = None;

    for line in sorted {
        let bbox = line.line.bbox;
        match extent {
            Some(current) if current.overlaps_vertically(&bbox) => {
                extent = Some(current.union(&bbox));
                open.push(line);
            }
            Some(current) => {
                groups.push(close_group(std::mem::take(&mut open), current, page, groups.len()));
                extent = Some(bbox);
                open.push(line);
            }
            None => {
                extent = Some(bbox);
                open.push(line);
            }
        }
    }

    if let Some(current) = extent {
        if !open.is_empty() {
            groups.push(close_group(open, current, page, groups.len()));
        }
    }

    groups
}

fn close_group<'a>(
    lines: Vec<LineLayout<'a>>,
    bbox: NormBox,
    page: u32,
    closed_so_far: usize,
) -> ReadingBlock<'a> {
    ReadingBlock {
        id: format!("block_{}_{}", page, closed_so_far + 1),
        lines,
        bbox,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineBlock;

    fn line(id: &str, left: f64, top: f64, width: f64, height: f64) -> LineBlock {
        LineBlock {
            id: id.into(),
            page: 1,
            bbox: NormBox::new(left, top, width, height),
            confidence: Some(95.0),
            relationships: Vec::new(),
        }
    }

    fn layouts(lines: &[LineBlock]) -> Vec<LineLayout<'_>> {
        lines
            .iter()
            .map(|l| LineLayout {
                line: l,
                words: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn test_overlapping_lines_form_one_group() {
        let lines = vec![
            line("a", 0.1, 0.10, 0.5, 0.05),
            line("b", 0.1, 0.12, 0.5, 0.05),
            line("c", 0.1, 0.14, 0.5, 0.05),
        ];
        let groups = group_lines(layouts(&lines), 1);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, "block_1_1");
        assert_eq!(groups[0].lines.len(), 3);
    }

    #[test]
    fn test_gap_splits_groups() {
        let lines = vec![
            line("a", 0.1, 0.10, 0.5, 0.05),
            line("b", 0.1, 0.50, 0.5, 0.05),
        ];
        let groups = group_lines(layouts(&lines), 2);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, "block_2_1");
        assert_eq!(groups[1].id, "block_2_2");
    }

    #[test]
    fn test_touching_edges_do_not_group() {
        // b starts exactly where a ends; zero overlap splits
        let lines = vec![
            line("a", 0.1, 0.10, 0.5, 0.05),
            line("b", 0.1, 0.15, 0.5, 0.05),
        ];
        let groups = group_lines(layouts(&lines), 1);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_group_extent_chains_overlaps() {
        // c overlaps b but not a; the group grows through b
        let lines = vec![
            line("a", 0.1, 0.10, 0.5, 0.06),
            line("b", 0.1, 0.14, 0.5, 0.06),
            line("c", 0.1, 0.19, 0.5, 0.06),
        ];
        let groups = group_lines(layouts(&lines), 1);
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_union_bbox_contains_members() {
        let lines = vec![
            line("a", 0.1, 0.10, 0.2, 0.05),
            line("b", 0.4, 0.12, 0.3, 0.06),
        ];
        let groups = group_lines(layouts(&lines), 1);
        let bbox = groups[0].bbox;
        for member in &groups[0].lines {
            let m = member.line.bbox;
            assert!(bbox.left <= m.left);
            assert!(bbox.top <= m.top);
            assert!(bbox.right() >= m.right());
            assert!(bbox.bottom() >= m.bottom());
        }
    }

    #[test]
    fn test_never_more_groups_than_lines() {
        let lines: Vec<_> = (0..10)
            .map(|i| line(&format!("l{}", i), 0.1, 0.05 * f64::from(i), 0.5, 0.02))
            .collect();
        let count = lines.len();
        let groups = group_lines(layouts(&lines), 1);
        assert!(groups.len() <= count);
    }

    #[test]
    fn test_identical_tops_keep_input_order() {
        // Same top and left: the stable sort keeps relation order
        let lines = vec![
            line("first", 0.1, 0.10, 0.2, 0.05),
            line("second", 0.1, 0.10, 0.2, 0.05),
        ];
        let groups = group_lines(layouts(&lines), 1);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].lines[0].line.id, "first");
        assert_eq!(groups[0].lines[1].line.id, "second");
    }

    #[test]
    fn test_same_top_sorted_by_left() {
        let lines = vec![
            line("right", 0.6, 0.10, 0.2, 0.05),
            line("left", 0.1, 0.10, 0.2, 0.05),
        ];
        let groups = group_lines(layouts(&lines), 1);
        assert_eq!(groups[0].lines[0].line.id, "left");
        assert_eq!(groups[0].lines[1].line.id, "right");
    }

    #[test]
    fn test_empty_input() {
        let groups = group_lines(Vec::new(), 1);
        assert!(groups.is_empty());
    }
}

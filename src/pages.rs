//! Page-range selection.

use crate::error::{Error, Result};
use crate::parser::BlockIndex;

/// Resolve the page numbers to render.
///
/// `first` defaults to 1 and `last` to the index's page count. Both bounds
/// must lie in `[1, page_count]` and `first` must not exceed `last`. Pages
/// are returned in strictly ascending order. An empty document with no
/// explicit bounds selects zero pages, which is not an error.
pub fn select_pages(index: &BlockIndex, first: Option<u32>, last: Option<u32>) -> Result<Vec<u32>> {
    let page_count = index.page_count();

    if page_count == 0 {
        return match (first, last) {
            (None, None) => Ok(Vec::new()),
            _ => Err(Error::InvalidPageRange(
                "document has no pages".to_string(),
            )),
        };
    }

    let first = first.unwrap_or(1);
    let last = last.unwrap_or(page_count);

    if first < 1 || first > page_count {
        return Err(Error::PageOutOfRange(first, page_count));
    }
    if last < 1 || last > page_count {
        return Err(Error::PageOutOfRange(last, page_count));
    }
    if first > last {
        return Err(Error::InvalidPageRange(format!(
            "first page {} is greater than last page {}",
            first, last
        )));
    }

    Ok((first..=last).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::model::{Document, DocumentMetadata};
    use crate::parser::ErrorMode;

    fn index_with_pages(pages: u32) -> BlockIndex {
        let doc = Document {
            document_metadata: Some(DocumentMetadata { pages: Some(pages) }),
            blocks: Vec::new(),
        };
        let mut diags = Diagnostics::new();
        BlockIndex::build(&doc, ErrorMode::Strict, &mut diags).unwrap()
    }

    #[test]
    fn test_single_page_selection() {
        let index = index_with_pages(5);
        assert_eq!(select_pages(&index, Some(2), Some(2)).unwrap(), vec![2]);
    }

    #[test]
    fn test_open_ended_selection() {
        let index = index_with_pages(5);
        assert_eq!(select_pages(&index, Some(3), None).unwrap(), vec![3, 4, 5]);
        assert_eq!(
            select_pages(&index, None, None).unwrap(),
            vec![1, 2, 3, 4, 5]
        );
        assert_eq!(select_pages(&index, None, Some(2)).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_out_of_range_fails() {
        let index = index_with_pages(5);
        assert!(matches!(
            select_pages(&index, Some(6), Some(6)),
            Err(Error::PageOutOfRange(6, 5))
        ));
        assert!(matches!(
            select_pages(&index, Some(0), None),
            Err(Error::PageOutOfRange(0, 5))
        ));
    }

    #[test]
    fn test_inverted_range_fails() {
        let index = index_with_pages(5);
        assert!(matches!(
            select_pages(&index, Some(4), Some(2)),
            Err(Error::InvalidPageRange(_))
        ));
    }

    #[test]
    fn test_empty_document_selects_nothing() {
        let index = index_with_pages(0);
        assert_eq!(select_pages(&index, None, None).unwrap(), Vec::<u32>::new());
        assert!(select_pages(&index, Some(1), None).is_err());
    }
}

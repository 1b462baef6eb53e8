// AuditSleuth - core/page.rs
//
// Fixed-size pagination over the filtered view.
// Core layer: pure logic, no I/O or rendering dependencies.

/// One page of a paginated collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    /// The items on this page (borrowed slice of the input).
    pub items: &'a [T],

    /// Total number of pages for the input at this page size.
    /// 0 for an empty input; callers treat 0 and 1 alike.
    pub total_pages: usize,

    /// The 1-indexed page this slice represents (after clamping below 1).
    pub page: usize,
}

/// Slice a collection into a fixed-size page.
///
/// `page` is 1-indexed; values below 1 are treated as 1. A page beyond
/// `total_pages` yields an empty item slice; resetting to page 1 when the
/// view shrinks is the caller's contract, not this function's.
///
/// Total function: never panics, including `page_size == 0`, which
/// degrades to an empty zero-page result.
pub fn paginate<T>(records: &[T], page_size: usize, page: usize) -> Page<'_, T> {
    let page = page.max(1);

    if page_size == 0 || records.is_empty() {
        return Page {
            items: &[],
            total_pages: 0,
            page,
        };
    }

    let total_pages = records.len().div_ceil(page_size);
    let start = (page - 1).saturating_mul(page_size);
    let items = if start < records.len() {
        let end = (start + page_size).min(records.len());
        &records[start..end]
    } else {
        &[]
    };

    Page {
        items,
        total_pages,
        page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twenty_five_records_page_size_ten() {
        let records: Vec<u32> = (0..25).collect();

        let first = paginate(&records, 10, 1);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.items, (0..10).collect::<Vec<u32>>());

        let last = paginate(&records, 10, 3);
        assert_eq!(last.items.len(), 5);
        assert_eq!(last.items, &[20, 21, 22, 23, 24]);
    }

    #[test]
    fn test_exact_multiple_has_no_ragged_page() {
        let records: Vec<u32> = (0..20).collect();
        let page = paginate(&records, 10, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 10);
    }

    #[test]
    fn test_empty_input_has_zero_pages() {
        let records: Vec<u32> = Vec::new();
        let page = paginate(&records, 10, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let records: Vec<u32> = (0..5).collect();
        let page = paginate(&records, 10, 7);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
        assert_eq!(page.page, 7);
    }

    #[test]
    fn test_page_below_one_is_clamped() {
        let records: Vec<u32> = (0..5).collect();
        let page = paginate(&records, 10, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 5);
    }

    #[test]
    fn test_zero_page_size_degrades_to_empty() {
        let records: Vec<u32> = (0..5).collect();
        let page = paginate(&records, 0, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_single_record() {
        let records = vec![42u32];
        let page = paginate(&records, 10, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.items, &[42]);
    }
}

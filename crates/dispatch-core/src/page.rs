//! # Pagination Primitives
//!
//! Shared page/size semantics for every collection read in the system.
//! Page indices are zero-based; the page size is clamped to
//! [`MAX_PAGE_SIZE`] and defaults to [`DEFAULT_PAGE_SIZE`].

use serde::{Deserialize, Serialize};

/// Default number of items per page when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Hard ceiling on the number of items per page.
pub const MAX_PAGE_SIZE: usize = 100;

/// Caller-supplied pagination parameters, before normalization.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    /// Zero-based page index. Defaults to 0.
    pub page: Option<usize>,
    /// Requested page size. Defaults to [`DEFAULT_PAGE_SIZE`],
    /// clamped to [`MAX_PAGE_SIZE`].
    pub size: Option<usize>,
}

impl PageParams {
    /// Resolve the effective zero-based page index.
    pub fn page(&self) -> usize {
        self.page.unwrap_or(0)
    }

    /// Resolve the effective page size: defaulted, floored at 1, and
    /// clamped to [`MAX_PAGE_SIZE`].
    pub fn size(&self) -> usize {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

/// One page of a filtered collection, with stable totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// The items on this page, in collection order.
    pub items: Vec<T>,
    /// Zero-based index of this page.
    pub page: usize,
    /// The effective page size used to slice the collection.
    pub size: usize,
    /// Total number of items across all pages, before slicing.
    pub total_items: usize,
    /// Total number of pages at this page size.
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Slice an already-filtered collection into the requested page.
    ///
    /// The total counts reflect the full collection, so a page index past
    /// the end yields an empty `items` with the correct totals rather than
    /// an error.
    pub fn from_vec(all: Vec<T>, params: PageParams) -> Self {
        let size = params.size();
        let page = params.page();
        let total_items = all.len();
        let total_pages = total_items.div_ceil(size);

        let items = all
            .into_iter()
            .skip(page.saturating_mul(size))
            .take(size)
            .collect();

        Self {
            items,
            page,
            size,
            total_items,
            total_pages,
        }
    }

    /// Map the items of this page, preserving pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: usize, size: usize) -> PageParams {
        PageParams {
            page: Some(page),
            size: Some(size),
        }
    }

    #[test]
    fn defaults_apply_when_unset() {
        let p = PageParams::default();
        assert_eq!(p.page(), 0);
        assert_eq!(p.size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn size_is_clamped_to_max() {
        let p = params(0, 10_000);
        assert_eq!(p.size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn zero_size_is_floored_to_one() {
        let p = params(0, 0);
        assert_eq!(p.size(), 1);
    }

    #[test]
    fn first_page_slices_from_start() {
        let page = Page::from_vec((0..25).collect::<Vec<_>>(), params(0, 10));
        assert_eq!(page.items, (0..10).collect::<Vec<_>>());
        assert_eq!(page.total_items, 25);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn last_partial_page_is_short() {
        let page = Page::from_vec((0..25).collect::<Vec<_>>(), params(2, 10));
        assert_eq!(page.items, vec![20, 21, 22, 23, 24]);
    }

    #[test]
    fn page_past_end_is_empty_with_totals() {
        let page = Page::from_vec((0..5).collect::<Vec<_>>(), params(7, 10));
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 5);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn empty_collection_has_zero_pages() {
        let page = Page::from_vec(Vec::<u32>::new(), params(0, 10));
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn map_preserves_metadata() {
        let page = Page::from_vec((0..12).collect::<Vec<_>>(), params(1, 5)).map(|n| n * 2);
        assert_eq!(page.items, vec![10, 12, 14, 16, 18]);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_items, 12);
        assert_eq!(page.total_pages, 3);
    }
}

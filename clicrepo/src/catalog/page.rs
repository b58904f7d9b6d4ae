//! 1-based pagination.

/// One page of a result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Requested page number (1-based).
    pub page: usize,
    /// Page size.
    pub per_page: usize,
    /// Number of items across all pages.
    pub total_items: usize,
    /// Number of pages (0 for an empty list).
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Whether a page follows this one.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether a page precedes this one.
    pub fn has_previous(&self) -> bool {
        self.page > 1 && self.total_pages > 0
    }
}

/// Slice `items` into page `page` of `per_page` entries.
///
/// Pages start at 1. Page 0 and pages past the end are empty. A zero
/// `per_page` is treated as 1.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);

    let page_items = if page == 0 || page > total_pages {
        Vec::new()
    } else {
        let start = (page - 1) * per_page;
        let end = (start + per_page).min(total_items);
        items[start..end].to_vec()
    };

    Page {
        items: page_items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}

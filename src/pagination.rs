//! Page arithmetic for cached article sets.
//!
//! Pages are 1-based. An empty set has zero pages; every requested page is
//! clamped into range before slicing.

use std::ops::RangeInclusive;

/// Articles shown per page.
pub const PAGE_SIZE: usize = 12;

/// Maximum number of page buttons shown between Previous and Next.
pub const PAGE_WINDOW: usize = 5;

/// Number of pages needed for `total_items` articles.
pub fn total_pages(total_items: usize) -> usize {
    total_items.div_ceil(PAGE_SIZE)
}

/// Clamp a requested page into `[1, total_pages]` (1 when there are no pages).
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Page numbers shown as buttons for `current` out of `total`.
///
/// Centered on `current` where possible and shifted at the ends so that up
/// to [`PAGE_WINDOW`] numbers are always visible. Empty when `total` is 0.
pub fn page_window(current: usize, total: usize) -> RangeInclusive<usize> {
    if total == 0 {
        #[allow(clippy::reversed_empty_ranges)]
        return 1..=0;
    }
    let current = clamp_page(current, total);
    let mut start = current.saturating_sub(2).max(1);
    let end = (start + PAGE_WINDOW - 1).min(total);
    if end - start + 1 < PAGE_WINDOW {
        start = total.saturating_sub(PAGE_WINDOW - 1).max(1);
    }
    start..=end
}

/// One page of items plus everything needed to draw its navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// Clamped page number; 1 when there are no items.
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub window: RangeInclusive<usize>,
}

impl<T> Page<'_, T> {
    pub fn has_prev(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    /// Page controls are only drawn for multi-page sets.
    pub fn shows_controls(&self) -> bool {
        self.total_pages > 1
    }

    /// Index into the full set of the first item on this page.
    pub fn offset(&self) -> usize {
        (self.number - 1) * PAGE_SIZE
    }
}

/// Slice `items` to the requested (clamped) page.
pub fn paginate<T>(items: &[T], requested: usize) -> Page<'_, T> {
    let total = total_pages(items.len());
    let number = clamp_page(requested, total);
    let start = ((number - 1) * PAGE_SIZE).min(items.len());
    let end = (start + PAGE_SIZE).min(items.len());

    Page {
        items: &items[start..end],
        number,
        total_pages: total,
        total_items: items.len(),
        window: page_window(number, total),
    }
}

/// Page on which the item at `index` appears.
pub fn page_of(index: usize) -> usize {
    index / PAGE_SIZE + 1
}

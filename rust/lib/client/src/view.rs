//! Pure projection of the synchronized state into the operator's view.
//!
//! The filtered, paginated license table is recomputed from scratch on
//! every call; there is no independent view cache to fall out of step
//! with the state.

use crate::model::{License, SyncedState};

/// Fixed number of license rows per page.
pub const PAGE_SIZE: usize = 10;

/// Search term and page position. Derived, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewCursor {
    search: String,
    page: usize,
}

impl ViewCursor {
    pub fn new() -> Self {
        Self {
            search: String::new(),
            page: 1,
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> usize {
        self.page.max(1)
    }

    /// Change the search term; the page snaps back to 1.
    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        if search != self.search {
            self.search = search;
            self.page = 1;
        }
    }

    /// Move forward one page. Refuses to pass `total_pages`; the "next"
    /// control is disabled at the boundary rather than clamped after the
    /// fact.
    pub fn next_page(&mut self, total_pages: usize) {
        if self.page() < total_pages {
            self.page = self.page() + 1;
        }
    }

    /// Move back one page. Refuses to pass page 1.
    pub fn prev_page(&mut self) {
        if self.page() > 1 {
            self.page = self.page() - 1;
        }
    }

    /// Jump to a page, refusing positions outside `[1, total_pages]`.
    pub fn set_page(&mut self, page: usize, total_pages: usize) {
        if (1..=total_pages).contains(&page) {
            self.page = page;
        }
    }
}

/// One derived page of license rows, borrowed from the state snapshot.
#[derive(Debug)]
pub struct LicensePage<'a> {
    pub rows: Vec<&'a License>,
    pub page: usize,
    pub total_pages: usize,
}

impl LicensePage<'_> {
    /// The "previous" control is enabled only off the first page.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// The "next" control is enabled only off the last page.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Derive the filtered, paginated license view.
///
/// A row is included when the case-folded search term is a substring of
/// its key or of its system's display name; a license without a system
/// can still match through its key. Backend ordering is preserved and
/// `total_pages` is at least 1 even when nothing matches.
pub fn project<'a>(state: &'a SyncedState, cursor: &ViewCursor) -> LicensePage<'a> {
    let needle = cursor.search().to_lowercase();
    let filtered: Vec<&License> = state
        .licenses
        .iter()
        .filter(|lic| {
            lic.license_key.to_lowercase().contains(&needle)
                || lic
                    .active_system
                    .as_deref()
                    .is_some_and(|s| s.to_lowercase().contains(&needle))
        })
        .collect();

    let total_pages = filtered.len().div_ceil(PAGE_SIZE).max(1);
    let page = cursor.page();
    let rows = filtered
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();

    LicensePage {
        rows,
        page,
        total_pages,
    }
}

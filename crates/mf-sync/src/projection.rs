//! Derived View Projection
//!
//! Pure filter + paginate over a client list, plus the small view-state
//! machine each surface keeps (search term, page, page size).

use std::collections::BTreeSet;

use crate::models::{Client, ClientId};

/// Page sizes offered by the clients surface
pub const CLIENTS_PAGE_SIZE_OPTIONS: [usize; 5] = [8, 12, 16, 20, 24];
/// Page sizes offered by the selected-clients surface
pub const SELECTED_PAGE_SIZE_OPTIONS: [usize; 3] = [8, 16, 32];

/// Visible slice plus pagination metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginatedView {
    pub items: Vec<Client>,
    pub current_page: usize,
    pub total_pages: usize,
    pub items_per_page: usize,
    pub total_count: usize,
}

/// Case-insensitive substring match on the trimmed term.
/// An empty term matches everything.
pub fn matches_search(name: &str, term: &str) -> bool {
    let term = term.trim();
    term.is_empty() || name.to_lowercase().contains(&term.to_lowercase())
}

pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// Filter `clients` (optionally restricted to `selection`) by `search`,
/// then cut page `page` (1-based) of `page_size` items.
///
/// The page is not clamped: pages past the end are empty and page 0 reads
/// as page 1.
pub fn project(
    clients: &[Client],
    selection: Option<&BTreeSet<ClientId>>,
    search: &str,
    page: usize,
    page_size: usize,
) -> PaginatedView {
    let filtered: Vec<&Client> = clients
        .iter()
        .filter(|c| selection.map_or(true, |ids| ids.contains(&c.id)))
        .filter(|c| matches_search(&c.name, search))
        .collect();

    let start = page.saturating_sub(1).saturating_mul(page_size);
    let items = filtered
        .iter()
        .skip(start)
        .take(page_size)
        .map(|c| (*c).clone())
        .collect();

    PaginatedView {
        items,
        current_page: page,
        total_pages: total_pages(filtered.len(), page_size),
        items_per_page: page_size,
        total_count: filtered.len(),
    }
}

/// Items per page for a viewport width; narrower shows fewer
pub fn page_size_for_viewport(width: u32) -> usize {
    match width {
        0..=600 => 8,
        601..=900 => 12,
        901..=1200 => 15,
        _ => 16,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    /// Follow the viewport breakpoints
    #[default]
    Auto,
    Fixed(usize),
}

impl PageSize {
    pub fn resolve(self, viewport_width: u32) -> usize {
        match self {
            PageSize::Auto => page_size_for_viewport(viewport_width),
            PageSize::Fixed(size) => size.max(1),
        }
    }
}

/// Search term, current page and page size of one surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search: String,
    pub page: usize,
    pub page_size: PageSize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(PageSize::Auto)
    }
}

impl ViewState {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            search: String::new(),
            page: 1,
            page_size,
        }
    }

    /// Changing the term goes back to page 1
    pub fn set_search(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term != self.search {
            self.search = term;
            self.page = 1;
        }
    }

    /// Changing the page size goes back to page 1
    pub fn set_page_size(&mut self, page_size: PageSize) {
        if page_size != self.page_size {
            self.page_size = page_size;
            self.page = 1;
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.page = (self.page + 1).min(total_pages.max(1));
    }

    pub fn previous_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    /// Pull the page back into range after the list shrank.
    /// Returns whether the page moved.
    pub fn clamp_page(&mut self, total_pages: usize) -> bool {
        let clamped = self.page.clamp(1, total_pages.max(1));
        let moved = clamped != self.page;
        self.page = clamped;
        moved
    }

    pub fn project(
        &self,
        clients: &[Client],
        selection: Option<&BTreeSet<ClientId>>,
        viewport_width: u32,
    ) -> PaginatedView {
        project(
            clients,
            selection,
            &self.search,
            self.page,
            self.page_size.resolve(viewport_width),
        )
    }
}

/// One slot of the pagination bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(usize),
    Ellipsis,
}

/// Pagination bar: every page when there are at most 7, otherwise the
/// first and last page around a window of the current one
pub fn visible_pages(current: usize, total: usize) -> Vec<PageLink> {
    use PageLink::{Ellipsis, Page};

    if total <= 7 {
        return (1..=total).map(Page).collect();
    }
    if current <= 4 {
        vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(total)]
    } else if current >= total - 3 {
        let mut links = vec![Page(1), Ellipsis];
        links.extend((total - 4..=total).map(Page));
        links
    } else {
        vec![
            Page(1),
            Ellipsis,
            Page(current - 1),
            Page(current),
            Page(current + 1),
            Ellipsis,
            Page(total),
        ]
    }
}

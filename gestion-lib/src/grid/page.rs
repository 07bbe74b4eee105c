//! Pagination state and slicing.

use std::fmt;
use std::sync::Arc;

/// Page sizes offered by default.
pub const DEFAULT_PAGE_SIZES: [usize; 4] = [10, 25, 50, 100];

/// Page size used when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Number of pages needed for `total_items`, never less than one.
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1)).max(1)
}

/// Returns the rows of a 1-based page.
///
/// Out-of-range pages yield an empty slice; the grid clamps before calling.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// A page request handed to a server-side data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: usize,
    /// Rows per page.
    pub page_size: usize,
}

/// Callback invoked when a server-paged grid changes page or page size.
pub type PageHandler = Arc<dyn Fn(PageRequest) + Send + Sync>;

/// Where paging happens.
#[derive(Clone, Default)]
pub enum PagingMode {
    /// The grid holds every row and slices locally.
    #[default]
    Client,
    /// The grid holds only the current page; the source knows the total.
    Server {
        /// Called on every page or page-size change.
        on_change: Option<PageHandler>,
    },
}

impl PagingMode {
    /// Server paging with a change handler.
    pub fn server(on_change: impl Fn(PageRequest) + Send + Sync + 'static) -> Self {
        PagingMode::Server {
            on_change: Some(Arc::new(on_change)),
        }
    }

    /// Returns `true` for server paging.
    pub fn is_server(&self) -> bool {
        matches!(self, PagingMode::Server { .. })
    }
}

impl fmt::Debug for PagingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PagingMode::Client => f.write_str("Client"),
            PagingMode::Server { on_change } => f
                .debug_struct("Server")
                .field("on_change", &on_change.is_some())
                .finish(),
        }
    }
}

/// Current page, page size and item count.
///
/// `current_page` always stays within `1..=total_pages()`.
///
/// # Example
///
/// ```
/// use gestion_lib::grid::Pagination;
///
/// let mut page = Pagination::new(10);
/// page.set_total_items(42);
/// assert_eq!(page.total_pages(), 5);
/// assert!(page.go_to(5));
/// assert!(!page.go_to(6));
/// assert_eq!(page.current_page(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    current_page: usize,
    page_size: usize,
    total_items: usize,
}

impl Pagination {
    /// Starts on page 1 with no items.
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            total_items: 0,
        }
    }

    /// 1-based current page.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Item count the page math is based on.
    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Number of pages, at least one.
    pub fn total_pages(&self) -> usize {
        total_pages(self.total_items, self.page_size)
    }

    /// Moves to `page` if it is in range. Returns `true` if the page changed.
    pub fn go_to(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() || page == self.current_page {
            return false;
        }
        self.current_page = page;
        true
    }

    /// Next page, no-op on the last page.
    pub fn next(&mut self) -> bool {
        self.go_to(self.current_page + 1)
    }

    /// Previous page, no-op on the first page.
    pub fn previous(&mut self) -> bool {
        self.current_page > 1 && self.go_to(self.current_page - 1)
    }

    /// First page.
    pub fn first(&mut self) -> bool {
        self.go_to(1)
    }

    /// Last page.
    pub fn last(&mut self) -> bool {
        self.go_to(self.total_pages())
    }

    /// Changes the page size and returns to page 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.current_page = 1;
    }

    /// Back to page 1.
    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Updates the item count and pulls the current page back into range.
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.current_page = self.current_page.clamp(1, self.total_pages());
    }

    /// 0-based index range of the current page within `total_items`.
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = (self.current_page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.total_items);
        start.min(end)..end
    }

    /// Request describing the current state, for server paging.
    pub fn request(&self) -> PageRequest {
        PageRequest {
            page: self.current_page,
            page_size: self.page_size,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

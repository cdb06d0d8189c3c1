//! Pagination utilities for request lists

/// Page size when the caller does not ask for one
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Largest page size a caller may ask for
pub const MAX_PER_PAGE: i64 = 100;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Rows per page
    pub per_page: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

/// Sanitize a requested page size into `[1, MAX_PER_PAGE]`
pub fn clamp_per_page(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE)
}

/// Calculate pagination metadata from total results and requested page
///
/// Ensures page is within valid bounds [1, total_pages]
///
/// # Examples
/// ```
/// use tvbook_api::pagination::calculate_pagination;
///
/// // 25 results at 10 per page = 3 pages (10 + 10 + 5)
/// let p = calculate_pagination(25, 2, 10);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 10);
///
/// // Requesting out-of-bounds page gets clamped
/// let p = calculate_pagination(25, 99, 10);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 20);
/// ```
pub fn calculate_pagination(total_results: i64, requested_page: i64, per_page: i64) -> Pagination {
    let per_page = per_page.clamp(1, MAX_PER_PAGE);
    let total_pages = (total_results + per_page - 1) / per_page;
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * per_page;

    Pagination {
        page,
        per_page,
        total_pages,
        offset,
    }
}

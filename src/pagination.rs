use serde::Serialize;
use thiserror::Error;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;
/// Largest page size a caller may request.
pub const MAX_ITEMS_PER_PAGE: usize = 100;

/// Rejected pagination parameters. Values are never clamped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page must be greater than or equal to 1, got {0}")]
    InvalidPage(i64),
    #[error("limit must be between 1 and {max}, got {0}", max = MAX_ITEMS_PER_PAGE)]
    InvalidLimit(i64),
}

/// Validated `(page, limit)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Validates raw request values, applying defaults for absent ones.
    pub fn try_new(page: Option<i64>, limit: Option<i64>) -> Result<Self, PaginationError> {
        let page = match page {
            None => 1,
            Some(value) if value >= 1 => value as usize,
            Some(value) => return Err(PaginationError::InvalidPage(value)),
        };

        let limit = match limit {
            None => DEFAULT_ITEMS_PER_PAGE,
            Some(value) if value >= 1 && value as usize <= MAX_ITEMS_PER_PAGE => value as usize,
            Some(value) => return Err(PaginationError::InvalidLimit(value)),
        };

        Ok(Self { page, limit })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> i64 {
        ((self.page - 1) as i64).saturating_mul(self.limit as i64)
    }

    /// Maximum number of rows fetched for this page.
    pub fn count(&self) -> i64 {
        self.limit as i64
    }
}

/// Number of pages needed for `records` rows; zero when there are no rows.
pub fn total_pages(records: usize, limit: usize) -> usize {
    if limit == 0 {
        return 0;
    }
    records.div_ceil(limit)
}

/// Pagination block of a [`Page`] envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Page requested by the caller.
    pub current: usize,
    /// Page size used for the query.
    pub limit: usize,
    /// Total matching rows before pagination.
    pub records: usize,
    /// `ceil(records / limit)`.
    pub pages: usize,
}

impl Pagination {
    pub fn new(records: usize, request: &PageRequest) -> Self {
        Self {
            current: request.page(),
            limit: request.limit(),
            records,
            pages: total_pages(records, request.limit()),
        }
    }
}

/// `{ pagination, data }` response envelope shared by every list endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page<T> {
    pub pagination: Pagination,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(records: usize, request: &PageRequest, data: Vec<T>) -> Self {
        Self {
            pagination: Pagination::new(records, request),
            data,
        }
    }

    /// Envelope for a query that matched nothing.
    pub fn empty(request: &PageRequest) -> Self {
        Self::new(0, request, Vec::new())
    }

    /// Converts every item while keeping the pagination block.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            pagination: self.pagination,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

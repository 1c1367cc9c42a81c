pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// A page request that is always within bounds: `page >= 1` and
/// `1 <= page_size <= MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Builds a request from raw query-string values. Missing or unparsable
    /// values fall back to the defaults before clamping.
    pub fn from_raw(page: Option<&str>, page_size: Option<&str>) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_PAGE);
        let page_size = page_size
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self::new(page, page_size)
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

/// A bounded page plus an optional free-text filter.
///
/// Blank search terms are normalized away so the store never sees them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub page: PageRequest,
    pub search: Option<String>,
}

impl PageQuery {
    pub fn new(page: PageRequest, search: Option<&str>) -> Self {
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self { page, search }
    }
}

/// Integer ceiling division; zero rows means zero pages.
pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if total <= 0 || page_size <= 0 {
        return 0;
    }
    (total + page_size - 1) / page_size
}

use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// Page request as received on the query string. Clamped on
/// construction: page ≥ 1, 1 ≤ limit ≤ 100.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + request.limit - 1) / request.limit
        };
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_clamps_bounds() {
        let req = PageRequest::new(Some(0), Some(500));
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 100);
        assert_eq!(req.offset(), 0);

        let req = PageRequest::new(Some(3), Some(25));
        assert_eq!(req.offset(), 50);
    }

    #[test]
    fn pagination_rounds_total_pages_up() {
        let req = PageRequest::new(Some(1), Some(10));
        assert_eq!(Pagination::new(req, 0).total_pages, 0);
        assert_eq!(Pagination::new(req, 10).total_pages, 1);
        assert_eq!(Pagination::new(req, 11).total_pages, 2);
    }

    #[test]
    fn pagination_serializes_camel_case_total_pages() {
        let page = Pagination::new(PageRequest::default(), 42);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalPages"], 5);
        assert_eq!(json["limit"], 10);
    }
}

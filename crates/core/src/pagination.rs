//! Page-number pagination.
//!
//! List endpoints accept `?page=N` (1-based) and respond with a [`Page`]
//! envelope: `{ count, next, previous, results }`. `next` and `previous`
//! are page numbers, or `null` at either end.

use serde::{Deserialize, Serialize};

use crate::de::empty_as_none;
use crate::error::CoreError;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Upper bound for a configured page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters for list endpoints with no other filters.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
}

/// A validated page request: which page and how many rows per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Build a request from the raw `page` query value.
    ///
    /// A missing page means the first page. Pages below 1 do not exist.
    pub fn new(page: Option<i64>, page_size: i64) -> Result<Self, CoreError> {
        let page = page.unwrap_or(1);
        if page < 1 {
            return Err(CoreError::not_found("Page", page));
        }
        Ok(Self {
            page,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        })
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// One page of results plus navigation metadata.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    /// Total number of rows across all pages.
    pub count: i64,
    pub next: Option<i64>,
    pub previous: Option<i64>,
    pub results: Vec<T>,
}

impl<T: Serialize> Page<T> {
    /// Wrap `results` fetched for `request`, given the total row `count`.
    ///
    /// The first page always exists (possibly empty); any later page past
    /// the end is reported as not found.
    pub fn new(results: Vec<T>, count: i64, request: PageRequest) -> Result<Self, CoreError> {
        let last_page = last_page(count, request.page_size);
        if request.page > last_page {
            return Err(CoreError::not_found("Page", request.page));
        }

        Ok(Self {
            count,
            next: (request.page < last_page).then_some(request.page + 1),
            previous: (request.page > 1).then_some(request.page - 1),
            results,
        })
    }

}

/// Number of the last page; an empty collection still has page 1.
fn last_page(count: i64, page_size: i64) -> i64 {
    if count <= 0 {
        1
    } else {
        (count + page_size - 1) / page_size
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn missing_page_is_first_page() {
        let req = PageRequest::new(None, 10).unwrap();
        assert_eq!(req.page, 1);
        assert_eq!(req.offset(), 0);
        assert_eq!(req.limit(), 10);
    }

    #[test]
    fn offset_follows_page_number() {
        let req = PageRequest::new(Some(3), 10).unwrap();
        assert_eq!(req.offset(), 20);
    }

    #[test]
    fn page_zero_does_not_exist() {
        assert_matches!(PageRequest::new(Some(0), 10), Err(CoreError::NotFound { .. }));
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(PageRequest::new(None, 0).unwrap().page_size, 1);
        assert_eq!(PageRequest::new(None, 10_000).unwrap().page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn navigation_in_the_middle() {
        let req = PageRequest::new(Some(2), 10).unwrap();
        let page = Page::new(vec![1, 2, 3], 25, req).unwrap();
        assert_eq!(page.count, 25);
        assert_eq!(page.next, Some(3));
        assert_eq!(page.previous, Some(1));
    }

    #[test]
    fn empty_first_page_is_valid() {
        let req = PageRequest::new(None, 10).unwrap();
        let page = Page::<i32>::new(vec![], 0, req).unwrap();
        assert_eq!(page.next, None);
        assert_eq!(page.previous, None);
    }

    #[test]
    fn page_past_the_end_is_not_found() {
        let req = PageRequest::new(Some(4), 10).unwrap();
        assert_matches!(Page::<i32>::new(vec![], 25, req), Err(CoreError::NotFound { .. }));
    }
}

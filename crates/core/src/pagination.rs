//! Page-number pagination shared by list endpoints.

use serde::{Deserialize, Serialize};

use crate::validation::ValidationErrors;

/// Upper bound on page size; larger requests are capped.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Build a request from optional query values.
    ///
    /// Zero page or limit is rejected; limits above [`MAX_PAGE_SIZE`] are capped.
    pub fn new(
        page: Option<u32>,
        limit: Option<u32>,
        default_limit: u32,
    ) -> Result<Self, ValidationErrors> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(default_limit);

        let mut errors = ValidationErrors::new();
        if page == 0 {
            errors.push("page", "must be at least 1");
        }
        if limit == 0 {
            errors.push("limit", "must be at least 1");
        }
        errors.into_result()?;

        Ok(Self {
            page,
            limit: limit.min(MAX_PAGE_SIZE),
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of records skipped before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Cut this page out of an already filtered and ordered result set.
    pub fn slice<T: Clone>(&self, all: &[T]) -> Vec<T> {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        all.iter()
            .skip(start)
            .take(self.limit as usize)
            .cloned()
            .collect()
    }
}

/// One page of results plus the totals needed to render a pager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            total_pages: total_pages(total, request.limit()),
            current_page: request.page(),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            total_pages: self.total_pages,
            current_page: self.current_page,
        }
    }
}

/// Ceiling division of `total` by `limit`.
pub fn total_pages(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults_apply() {
        let req = PageRequest::new(None, None, 10).unwrap();
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 10);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn zero_values_are_rejected() {
        let err = PageRequest::new(Some(0), Some(0), 10).unwrap_err();
        let fields: Vec<&str> = err.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["page", "limit"]);
    }

    #[test]
    fn oversized_limit_is_capped() {
        let req = PageRequest::new(Some(1), Some(10_000), 10).unwrap();
        assert_eq!(req.limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn second_page_of_fifteen() {
        let all: Vec<u32> = (0..15).collect();
        let req = PageRequest::new(Some(2), Some(10), 10).unwrap();
        let page = Page::new(req.slice(&all), all.len() as u64, req);

        assert_eq!(page.items, vec![10, 11, 12, 13, 14]);
        assert_eq!(page.total, 15);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.current_page, 2);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let all: Vec<u32> = (0..3).collect();
        let req = PageRequest::new(Some(5), Some(10), 10).unwrap();
        assert!(req.slice(&all).is_empty());
    }

    #[test]
    fn empty_result_has_zero_pages() {
        assert_eq!(total_pages(0, 10), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: total_pages is the smallest page count covering every record.
        #[test]
        fn total_pages_is_ceiling(total in 0u64..100_000, limit in 1u32..=MAX_PAGE_SIZE) {
            let pages = total_pages(total, limit);
            prop_assert!(pages * u64::from(limit) >= total);
            if pages > 0 {
                prop_assert!((pages - 1) * u64::from(limit) < total);
            }
        }

        /// Property: concatenating every page reproduces the full result set.
        #[test]
        fn pages_partition_results(len in 0usize..200, limit in 1u32..30) {
            let all: Vec<usize> = (0..len).collect();
            let pages = total_pages(len as u64, limit);
            let mut joined = Vec::new();
            for p in 1..=pages {
                let req = PageRequest::new(Some(p as u32), Some(limit), 10).unwrap();
                joined.extend(req.slice(&all));
            }
            prop_assert_eq!(joined, all);
        }
    }
}

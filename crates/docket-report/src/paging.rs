//! Pagination conventions shared by every listing and report.
//!
//! Pages are 1-based and each resource has a fixed page size. The total
//! count travels next to the items so callers can print or send it out of
//! band; the count comes from a count-only twin of the listing query, not
//! from materializing the full result.

use docket_core::error::{Error, Result};
use serde::Serialize;

pub const DRILLDOWN_PAGE_SIZE: u32 = 5;
pub const INDEX_PAGE_SIZE: u32 = 8;
pub const TRANSMITTAL_PAGE_SIZE: u32 = 10;
pub const CORRESPONDENCE_PAGE_SIZE: u32 = 10;
pub const LATEST_PAGE_SIZE: u32 = 30;

/// One page of results plus the numbers needed to navigate.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        if self.total_items == 0 {
            0
        } else {
            self.total_items.div_ceil(u64::from(self.page_size))
        }
    }
}

/// Converts a 1-based page into a limit/offset window.
pub fn window(page: u32, page_size: u32) -> Result<(i64, i64)> {
    if page < 1 {
        return Err(Error::validation("page numbers start at 1"));
    }
    let limit = i64::from(page_size);
    let offset = i64::from(page - 1) * limit;
    Ok((limit, offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_one_based() {
        assert_eq!(window(1, 5).unwrap(), (5, 0));
        assert_eq!(window(3, 10).unwrap(), (10, 20));
        assert!(window(0, 5).is_err());
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page {
            items: Vec::<()>::new(),
            page: 1,
            page_size: 8,
            total_items: 17,
        };
        assert_eq!(page.total_pages(), 3);

        let empty = Page {
            items: Vec::<()>::new(),
            page: 1,
            page_size: 8,
            total_items: 0,
        };
        assert_eq!(empty.total_pages(), 0);
    }
}

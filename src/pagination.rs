//! Page-number pagination over ordered listings.
//!
//! Listings count their rows first, resolve the requested page against that
//! count, then fetch only the `LIMIT/OFFSET` window of the resolved page.

use std::ops::RangeInclusive;

use serde::Deserialize;

/// The `?page=` query parameter, kept raw so malformed values can fall back
/// to the first page instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    total: i64,
    per_page: u32,
}

impl Paginator {
    pub fn new(total: i64, per_page: u32) -> Self {
        Self {
            total: total.max(0),
            per_page: per_page.max(1),
        }
    }

    /// Number of pages; an empty listing still has one (empty) page.
    pub fn num_pages(&self) -> u32 {
        if self.total == 0 {
            return 1;
        }
        let per_page = i64::from(self.per_page);
        let pages = (self.total + per_page - 1) / per_page;
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Resolves a raw page parameter: missing or non-integer values give the
    /// first page, out-of-range integers give the last page.
    pub fn resolve(&self, raw: Option<&str>) -> u32 {
        let Some(value) = raw.map(str::trim) else {
            return 1;
        };

        let last = self.num_pages();
        match value.parse::<i64>() {
            Ok(number) if number >= 1 && number <= i64::from(last) => number as u32,
            Ok(_) => last,
            // Too many digits for i64 is still an integer, just out of range.
            Err(_) if is_integer(value) => last,
            Err(_) => 1,
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self, number: u32) -> i64 {
        i64::from(number.saturating_sub(1)) * i64::from(self.per_page)
    }

    pub fn page<T>(&self, number: u32, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number,
            num_pages: self.num_pages(),
            total: self.total,
        }
    }
}

fn is_integer(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// One page of a listing plus the metadata the paginator widget renders.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub num_pages: u32,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_other_pages(&self) -> bool {
        self.num_pages > 1
    }

    pub fn previous_page_number(&self) -> u32 {
        self.number.saturating_sub(1).max(1)
    }

    pub fn next_page_number(&self) -> u32 {
        (self.number + 1).min(self.num_pages)
    }

    pub fn page_range(&self) -> RangeInclusive<u32> {
        1..=self.num_pages
    }
}

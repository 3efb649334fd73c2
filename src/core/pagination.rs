// Pagination - fixed page size with graceful out-of-range handling

use serde::Serialize;

/// Splits an ordered result set into fixed-size pages.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: u32,
}

/// Resolved window into the result set for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub limit: i64,
    pub offset: i64,
}

impl Paginator {
    pub fn new(per_page: u32) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// An empty result set still has one (empty) page.
    pub fn num_pages(&self, count: u64) -> u64 {
        if count == 0 {
            1
        } else {
            count.div_ceil(self.per_page as u64)
        }
    }

    /// Resolve a raw `?page=` value against `count` items.
    ///
    /// Missing or non-numeric values select the first page; numbers outside
    /// `1..=num_pages` are clamped to the nearest valid page.
    pub fn window(&self, count: u64, requested: Option<&str>) -> PageWindow {
        let num_pages = self.num_pages(count);
        let number = match requested.map(str::trim).and_then(|raw| raw.parse::<i64>().ok()) {
            Some(n) if n < 1 => 1,
            Some(n) => (n as u64).min(num_pages),
            None => 1,
        };
        PageWindow {
            number,
            num_pages,
            limit: self.per_page as i64,
            offset: ((number - 1) * self.per_page as u64) as i64,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total_count: u64,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow, total_count: u64, per_page: u32) -> Self {
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            total_count,
            per_page,
        }
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_other_pages(&self) -> bool {
        self.has_next() || self.has_previous()
    }

    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

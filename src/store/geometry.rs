//! Fixed dimensions of an open file: size and page partitioning.

use std::fmt;

/// Default page size in bytes.
pub const DEFAULT_PAGE_SIZE: u64 = 10_240;

/// Zero-based index of a fixed-size page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageIndex(pub u64);

impl PageIndex {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Total size and page size of a session's file.
///
/// Immutable for the lifetime of a session.
///
/// # Invariants
/// - `page_size > 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileGeometry {
    total_size: u64,
    page_size: u64,
}

impl FileGeometry {
    pub fn new(total_size: u64, page_size: u64) -> Result<Self, InvalidGeometry> {
        if page_size == 0 {
            return Err(InvalidGeometry::ZeroPageSize);
        }
        Ok(Self {
            total_size,
            page_size,
        })
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// `ceil(total_size / page_size)`; zero for an empty file.
    pub fn page_count(&self) -> u64 {
        self.total_size.div_ceil(self.page_size)
    }

    /// Page containing `offset`. Not clamped: offsets past the end map past
    /// the last page.
    pub fn page_of(&self, offset: u64) -> PageIndex {
        PageIndex(offset / self.page_size)
    }

    pub fn last_page(&self) -> Option<PageIndex> {
        self.page_count().checked_sub(1).map(PageIndex)
    }

    /// Inclusive byte span `[start, end]` of `page`; the last page is
    /// clamped to `total_size - 1`. `None` for pages outside the file.
    pub fn page_span(&self, page: PageIndex) -> Option<(u64, u64)> {
        if page.0 >= self.page_count() {
            return None;
        }
        let start = page.0 * self.page_size;
        let end = (start + self.page_size).min(self.total_size) - 1;
        Some((start, end))
    }

    /// Number of rows needed to show the whole file.
    pub fn total_rows(&self, bytes_per_row: usize) -> u64 {
        self.total_size.div_ceil(bytes_per_row.max(1) as u64)
    }

    pub fn contains(&self, offset: u64) -> bool {
        offset < self.total_size
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidGeometry {
    #[error("Page size must be greater than zero")]
    ZeroPageSize,
}

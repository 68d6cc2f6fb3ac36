//! Sparse, page-granular view of a remote byte sequence.

use super::geometry::{FileGeometry, PageIndex};
use super::loader::{PageRequest, RangeLoader};
use crate::model::StoreError;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Partially populated address space backed by a [`RangeLoader`].
///
/// # Invariants
/// - A resident page holds exactly `page_span(p)` bytes, so every offset in
///   a resident page has a value.
/// - Pages never become non-resident again.
/// - A page is never requested while it is in flight.
pub struct PagedByteStore {
    geometry: FileGeometry,
    loader: Box<dyn RangeLoader>,
    pages: BTreeMap<PageIndex, Vec<u8>>,
    in_flight: BTreeSet<PageIndex>,
}

impl std::fmt::Debug for PagedByteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedByteStore")
            .field("geometry", &self.geometry)
            .field("resident", &self.pages.len())
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

impl PagedByteStore {
    pub fn new(geometry: FileGeometry, loader: Box<dyn RangeLoader>) -> Self {
        Self {
            geometry,
            loader,
            pages: BTreeMap::new(),
            in_flight: BTreeSet::new(),
        }
    }

    pub fn geometry(&self) -> &FileGeometry {
        &self.geometry
    }

    /// Request every page covering `[byte_start, byte_end]` that is neither
    /// resident nor in flight.
    ///
    /// Endpoints may be given in either order and are clamped to the file.
    /// Returns the pages for which a fetch was issued.
    pub fn request_range(&mut self, byte_start: u64, byte_end: u64) -> Vec<PageIndex> {
        let Some(last) = self.geometry.last_page() else {
            return Vec::new();
        };
        let (start, end) = (byte_start.min(byte_end), byte_start.max(byte_end));
        if !self.geometry.contains(start) {
            return Vec::new();
        }
        let first = self.geometry.page_of(start);
        let last = self.geometry.page_of(end).min(last);
        self.request_pages(first, last)
    }

    /// Request pages `first..=last` (clamped to the file).
    pub fn request_pages(&mut self, first: PageIndex, last: PageIndex) -> Vec<PageIndex> {
        let Some(last_page) = self.geometry.last_page() else {
            return Vec::new();
        };
        let last = last.min(last_page);
        (first.get()..=last.get())
            .map(PageIndex)
            .filter(|&page| self.request_page(page))
            .collect()
    }

    /// Request a single page. Returns `true` if a fetch was issued.
    pub fn request_page(&mut self, page: PageIndex) -> bool {
        if self.pages.contains_key(&page) || self.in_flight.contains(&page) {
            return false;
        }
        let Some((start, end)) = self.geometry.page_span(page) else {
            return false;
        };
        self.in_flight.insert(page);
        debug!(page = page.get(), start, end, "Fetching page");
        self.loader.fetch(PageRequest { page, start, end });
        true
    }

    /// Store a fetched page and clear its in-flight mark.
    ///
    /// A repeated resolution overwrites the earlier bytes. A payload whose
    /// length does not match the page span is rejected and the page is left
    /// unloaded (and eligible for a new request).
    pub fn on_page_resolved(&mut self, page: PageIndex, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.in_flight.remove(&page);
        let (start, end) = self
            .geometry
            .page_span(page)
            .ok_or(StoreError::PageOutOfRange {
                page: page.get(),
                page_count: self.geometry.page_count(),
            })?;
        let expected = end - start + 1;
        if bytes.len() as u64 != expected {
            warn!(
                page = page.get(),
                expected,
                actual = bytes.len(),
                "Rejecting page payload with wrong length"
            );
            return Err(StoreError::LengthMismatch {
                page: page.get(),
                expected,
                actual: bytes.len() as u64,
            });
        }
        self.pages.insert(page, bytes);
        Ok(())
    }

    /// Clear the in-flight mark after a failed fetch. The page stays unloaded.
    pub fn on_page_failed(&mut self, page: PageIndex) {
        self.in_flight.remove(&page);
    }

    /// Byte at `offset`, or `None` if its page is not resident (or the
    /// offset is past the end). Never substitutes zero.
    pub fn get_byte(&self, offset: u64) -> Option<u8> {
        if !self.geometry.contains(offset) {
            return None;
        }
        let page = self.geometry.page_of(offset);
        let within = offset - page.get() * self.geometry.page_size();
        self.pages
            .get(&page)
            .and_then(|bytes| bytes.get(within as usize))
            .copied()
    }

    /// Bytes of the inclusive range `[start, end]`; empty if `start > end`.
    pub fn get_slice(&self, start: u64, end: u64) -> Vec<Option<u8>> {
        if start > end {
            return Vec::new();
        }
        (start..=end).map(|offset| self.get_byte(offset)).collect()
    }

    /// Check whether every byte of `[start, end]` is resident.
    pub fn is_range_loaded(&self, start: u64, end: u64) -> bool {
        if start > end || !self.geometry.contains(end) {
            return false;
        }
        let first = self.geometry.page_of(start).get();
        let last = self.geometry.page_of(end).get();
        (first..=last).all(|p| self.pages.contains_key(&PageIndex(p)))
    }

    pub fn is_loaded(&self, page: PageIndex) -> bool {
        self.pages.contains_key(&page)
    }

    pub fn is_in_flight(&self, page: PageIndex) -> bool {
        self.in_flight.contains(&page)
    }

    pub fn resident_pages(&self) -> impl Iterator<Item = PageIndex> + '_ {
        self.pages.keys().copied()
    }

    pub fn in_flight_pages(&self) -> impl Iterator<Item = PageIndex> + '_ {
        self.in_flight.iter().copied()
    }
}

//! Range loading seam between the byte store and a blob backend.

use super::geometry::PageIndex;
use std::sync::{Arc, Mutex};

/// One page-sized byte-range read, `[start, end]` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: PageIndex,
    pub start: u64,
    pub end: u64,
}

impl PageRequest {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Issues asynchronous range reads.
///
/// `fetch` must not block. The result is reported later to
/// [`PagedByteStore::on_page_resolved`](super::PagedByteStore::on_page_resolved) or
/// [`PagedByteStore::on_page_failed`](super::PagedByteStore::on_page_failed), usually
/// through the event loop.
pub trait RangeLoader: Send {
    fn fetch(&self, request: PageRequest);
}

/// Loader that only records what was asked of it.
///
/// Useful wherever completions are driven by hand (tests, benchmarks, a
/// session whose bytes aren't available yet).
#[derive(Debug, Clone, Default)]
pub struct RecordingLoader {
    requests: Arc<Mutex<Vec<PageRequest>>>,
}

impl RecordingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every request so far, in issue order.
    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Page indices requested so far, in issue order.
    pub fn requested_pages(&self) -> Vec<u64> {
        self.requests().iter().map(|r| r.page.get()).collect()
    }

    /// Forget recorded requests.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.requests.lock() {
            guard.clear();
        }
    }
}

impl RangeLoader for RecordingLoader {
    fn fetch(&self, request: PageRequest) {
        if let Ok(mut guard) = self.requests.lock() {
            guard.push(request);
        }
    }
}

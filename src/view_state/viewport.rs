//! Virtualized viewport: which rows to draw and which pages to fetch.
//!
//! Positions are in display units: `scroll_offset` and `container_height`
//! share the unit of `row_height` (pixels in the browser layout, lines in
//! the terminal, where `row_height` is 1).

use super::debounce::Debouncer;
use crate::store::{FileGeometry, PageIndex};
use std::time::{Duration, Instant};
use tracing::debug;

/// Static viewport parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportConfig {
    /// Height of one row; must be > 0.
    pub row_height: u64,
    /// Rows rendered above and below the visible area.
    pub buffer_rows: u64,
    /// Quiet period before a scroll position triggers fetches.
    pub scroll_debounce: Duration,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            row_height: 1,
            buffer_rows: 10,
            scroll_debounce: Duration::from_millis(150),
        }
    }
}

/// Contiguous range of rows `[start_row, end_row)` to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleWindow {
    pub start_row: u64,
    pub end_row: u64,
    pub bytes_per_row: usize,
}

impl VisibleWindow {
    /// First byte offset of the window (row aligned).
    pub fn visible_start(&self) -> u64 {
        self.start_row * self.bytes_per_row as u64
    }

    /// One past the last byte offset of the window (row aligned, exclusive;
    /// may extend past the end of the file on the last row).
    pub fn visible_end(&self) -> u64 {
        self.end_row * self.bytes_per_row as u64
    }

    pub fn row_count(&self) -> u64 {
        self.end_row - self.start_row
    }

    pub fn is_empty(&self) -> bool {
        self.end_row == self.start_row
    }

    pub fn rows(&self) -> std::ops::Range<u64> {
        self.start_row..self.end_row
    }
}

/// Rows to render for a scroll position.
///
/// `start_row = max(0, floor(scroll / row_height) - buffer_rows)`,
/// `end_row = min(total_rows, start_row + ceil(height / row_height) + 2 * buffer_rows)`.
pub fn compute_window(
    scroll_offset: u64,
    container_height: u64,
    bytes_per_row: usize,
    row_height: u64,
    buffer_rows: u64,
    total_size: u64,
) -> VisibleWindow {
    let row_height = row_height.max(1);
    let bytes_per_row = bytes_per_row.max(1);
    let total_rows = total_size.div_ceil(bytes_per_row as u64);

    let first_row = scroll_offset / row_height;
    let start_row = first_row.saturating_sub(buffer_rows).min(total_rows);
    let visible_rows = container_height.div_ceil(row_height);
    let end_row = start_row
        .saturating_add(visible_rows)
        .saturating_add(buffer_rows.saturating_mul(2))
        .min(total_rows);

    VisibleWindow {
        start_row,
        end_row,
        bytes_per_row,
    }
}

/// Pages backing `window`, plus one page of read-ahead on each side.
///
/// `None` when the window holds no bytes.
pub fn required_pages(window: &VisibleWindow, geometry: &FileGeometry) -> Option<(PageIndex, PageIndex)> {
    let last_page = geometry.last_page()?;
    if window.is_empty() {
        return None;
    }
    let start = window.visible_start();
    let end = window.visible_end().min(geometry.total_size()).checked_sub(1)?;
    if start > end {
        return None;
    }
    let first = geometry.page_of(start).get().saturating_sub(1);
    let last = (geometry.page_of(end).get() + 1).min(last_page.get());
    Some((PageIndex(first), PageIndex(last)))
}

/// Pages around a single offset: its own page and one neighbour each side.
pub fn pages_around(offset: u64, geometry: &FileGeometry) -> Option<(PageIndex, PageIndex)> {
    let last_page = geometry.last_page()?;
    let page = geometry.page_of(offset).min(last_page).get();
    Some((
        PageIndex(page.saturating_sub(1)),
        PageIndex((page + 1).min(last_page.get())),
    ))
}

/// Smallest page span covering both inputs.
fn merge_spans(
    a: Option<(PageIndex, PageIndex)>,
    b: Option<(PageIndex, PageIndex)>,
) -> Option<(PageIndex, PageIndex)> {
    match (a, b) {
        (Some((a0, a1)), Some((b0, b1))) => Some((a0.min(b0), a1.max(b1))),
        (span, None) | (None, span) => span,
    }
}

/// Scroll state of one session's hex pane.
///
/// The window used for drawing always follows the latest scroll position;
/// the pages to fetch are only produced once scrolling settles (see
/// [`ViewportScheduler::poll`]) or immediately for jumps.
#[derive(Debug, Clone)]
pub struct ViewportScheduler {
    config: ViewportConfig,
    geometry: FileGeometry,
    bytes_per_row: usize,
    scroll_offset: u64,
    container_height: u64,
    settle: Debouncer<u64>,
}

impl ViewportScheduler {
    pub fn new(config: ViewportConfig, geometry: FileGeometry, bytes_per_row: usize) -> Self {
        Self {
            settle: Debouncer::new(config.scroll_debounce),
            config,
            geometry,
            bytes_per_row: bytes_per_row.max(1),
            scroll_offset: 0,
            container_height: 0,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn container_height(&self) -> u64 {
        self.container_height
    }

    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    pub fn total_rows(&self) -> u64 {
        self.geometry.total_rows(self.bytes_per_row)
    }

    /// Largest valid scroll offset: `max(0, total_rows * row_height - height)`.
    pub fn max_scroll(&self) -> u64 {
        (self.total_rows() * self.config.row_height).saturating_sub(self.container_height)
    }

    /// Row at the top edge of the container.
    pub fn first_visible_row(&self) -> u64 {
        self.scroll_offset / self.config.row_height.max(1)
    }

    /// Number of whole rows that fit in the container.
    pub fn page_rows(&self) -> u64 {
        (self.container_height / self.config.row_height.max(1)).max(1)
    }

    pub fn window(&self) -> VisibleWindow {
        compute_window(
            self.scroll_offset,
            self.container_height,
            self.bytes_per_row,
            self.config.row_height,
            self.config.buffer_rows,
            self.geometry.total_size(),
        )
    }

    /// Pages for the current window, without waiting for the debounce.
    pub fn current_pages(&self) -> Option<(PageIndex, PageIndex)> {
        required_pages(&self.window(), &self.geometry)
    }

    /// Update the container height; re-clamps the scroll position.
    pub fn set_container_height(&mut self, height: u64) {
        self.container_height = height;
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    /// Change bytes-per-row, keeping the byte at the top edge in view.
    pub fn set_bytes_per_row(&mut self, bytes_per_row: usize) {
        let top_byte = self.first_visible_row() * self.bytes_per_row as u64;
        self.bytes_per_row = bytes_per_row.max(1);
        let row = top_byte / self.bytes_per_row as u64;
        self.scroll_offset = (row * self.config.row_height).min(self.max_scroll());
    }

    /// Scroll to `offset` (clamped) and restart the settle delay.
    pub fn scroll_to(&mut self, offset: u64, now: Instant) {
        self.scroll_offset = offset.min(self.max_scroll());
        self.settle.trigger(self.scroll_offset, now);
    }

    /// Scroll by whole rows; negative moves up.
    pub fn scroll_rows(&mut self, rows: i64, now: Instant) {
        let delta = rows.unsigned_abs().saturating_mul(self.config.row_height);
        let target = if rows < 0 {
            self.scroll_offset.saturating_sub(delta)
        } else {
            self.scroll_offset.saturating_add(delta)
        };
        self.scroll_to(target, now);
    }

    /// Pages to request once the scroll position has settled.
    ///
    /// Returns `None` while scrolling is still in progress or when nothing
    /// is pending.
    pub fn poll(&mut self, now: Instant) -> Option<(PageIndex, PageIndex)> {
        let settled = self.settle.poll(now)?;
        let window = compute_window(
            settled,
            self.container_height,
            self.bytes_per_row,
            self.config.row_height,
            self.config.buffer_rows,
            self.geometry.total_size(),
        );
        let pages = required_pages(&window, &self.geometry);
        debug!(scroll = settled, ?pages, "Scroll settled");
        pages
    }

    pub fn is_settling(&self) -> bool {
        self.settle.is_pending()
    }

    /// Centre the row containing `offset` and return the pages to fetch now:
    /// the target page and its neighbours, widened to cover the new window.
    ///
    /// Cancels any pending scroll debounce.
    pub fn jump_to(&mut self, offset: u64) -> Option<(PageIndex, PageIndex)> {
        self.settle.cancel();
        let row = offset / self.bytes_per_row as u64;
        let target = row
            .saturating_mul(self.config.row_height)
            .saturating_sub(self.container_height / 2);
        self.scroll_offset = target.min(self.max_scroll());
        let pages = merge_spans(pages_around(offset, &self.geometry), self.current_pages());
        debug!(offset, scroll = self.scroll_offset, ?pages, "Jump");
        pages
    }

    /// Check whether the row holding `offset` is inside the container.
    pub fn is_offset_visible(&self, offset: u64) -> bool {
        let row = offset / self.bytes_per_row as u64;
        let first = self.first_visible_row();
        row >= first && row < first + self.page_rows()
    }
}

//! Row layout: how many bytes fit on a row and where each column starts.

use super::debounce::Debouncer;
use std::time::{Duration, Instant};
use tracing::debug;

/// Smallest row width in bytes; rows are always a multiple of this.
pub const MIN_BYTES_PER_ROW: usize = 4;

/// Widths of the glyphs a row is made of, in display units (terminal cells
/// or pixels).
///
/// A byte costs `3 * hex_glyph` in the hex column (two digits plus a
/// separator), `8 * binary_glyph + hex_glyph` in the binary column and
/// `ascii_glyph` in the ASCII column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub offset_column: u32,
    pub hex_glyph: u32,
    pub binary_glyph: u32,
    pub ascii_glyph: u32,
    pub padding: u32,
}

impl GlyphMetrics {
    /// Terminal layout: one-cell glyphs, `"0000abcd  "` offset column, borders
    /// and scrollbar as padding.
    pub const TERMINAL: Self = Self {
        offset_column: 10,
        hex_glyph: 1,
        binary_glyph: 1,
        ascii_glyph: 1,
        padding: 3,
    };

    /// Pixel layout of the browser viewer.
    pub const BROWSER: Self = Self {
        offset_column: 56,
        hex_glyph: 7,
        binary_glyph: 6,
        ascii_glyph: 7,
        padding: 40,
    };

    pub fn hex_cell(&self) -> u32 {
        3 * self.hex_glyph
    }

    pub fn binary_cell(&self) -> u32 {
        8 * self.binary_glyph + self.hex_glyph
    }

    pub fn per_byte(&self) -> u32 {
        self.hex_cell() + self.binary_cell() + self.ascii_glyph
    }
}

impl Default for GlyphMetrics {
    fn default() -> Self {
        Self::TERMINAL
    }
}

/// Number of bytes per row for a container `width` units wide.
///
/// Pure. Always a multiple of [`MIN_BYTES_PER_ROW`] and never below it, even
/// for widths too narrow to fit a single byte.
pub fn compute_bytes_per_row(width: u32, metrics: &GlyphMetrics) -> usize {
    let available = width
        .saturating_sub(metrics.offset_column)
        .saturating_sub(metrics.padding);
    let fitting = (available / metrics.per_byte().max(1)) as usize;
    let aligned = fitting / MIN_BYTES_PER_ROW * MIN_BYTES_PER_ROW;
    aligned.max(MIN_BYTES_PER_ROW)
}

/// Tracks container width and the derived bytes-per-row.
///
/// Resizes are debounced: [`LayoutEngine::on_resize`] only records the width;
/// [`LayoutEngine::poll`] applies it once the delay has passed and reports a
/// change only when bytes-per-row actually differs.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    metrics: GlyphMetrics,
    bytes_per_row: usize,
    pending_width: Debouncer<u32>,
}

impl LayoutEngine {
    pub fn new(metrics: GlyphMetrics, width: u32, resize_debounce: Duration) -> Self {
        Self {
            metrics,
            bytes_per_row: compute_bytes_per_row(width, &metrics),
            pending_width: Debouncer::new(resize_debounce),
        }
    }

    pub fn metrics(&self) -> &GlyphMetrics {
        &self.metrics
    }

    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    pub fn on_resize(&mut self, width: u32, now: Instant) {
        self.pending_width.trigger(width, now);
    }

    /// Apply a settled resize. Returns the new bytes-per-row if it changed.
    pub fn poll(&mut self, now: Instant) -> Option<usize> {
        let width = self.pending_width.poll(now)?;
        self.apply_width(width)
    }

    /// Apply `width` immediately. Returns the new bytes-per-row if it changed.
    pub fn apply_width(&mut self, width: u32) -> Option<usize> {
        let next = compute_bytes_per_row(width, &self.metrics);
        if next == self.bytes_per_row {
            return None;
        }
        debug!(width, from = self.bytes_per_row, to = next, "Bytes per row changed");
        self.bytes_per_row = next;
        Some(next)
    }

    pub fn row_geometry(&self) -> RowGeometry {
        RowGeometry::new(self.metrics, self.bytes_per_row)
    }
}

/// Which representation a column position belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowColumn {
    Hex,
    Binary,
    Ascii,
}

/// Column positions inside one rendered row.
///
/// Shared by the painter and by mouse hit-testing so both agree on where a
/// byte is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowGeometry {
    metrics: GlyphMetrics,
    bytes_per_row: usize,
}

impl RowGeometry {
    pub fn new(metrics: GlyphMetrics, bytes_per_row: usize) -> Self {
        Self {
            metrics,
            bytes_per_row,
        }
    }

    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    pub fn hex_start(&self) -> u32 {
        self.metrics.offset_column
    }

    pub fn binary_start(&self) -> u32 {
        self.hex_start() + self.metrics.hex_cell() * self.bytes_per_row as u32
    }

    pub fn ascii_start(&self) -> u32 {
        self.binary_start() + self.metrics.binary_cell() * self.bytes_per_row as u32
    }

    /// Total width of a row without padding.
    pub fn row_width(&self) -> u32 {
        self.ascii_start() + self.metrics.ascii_glyph * self.bytes_per_row as u32
    }

    /// Byte index within the row drawn at `column`, and which representation
    /// it was hit in. `None` in the offset column or past the ASCII column.
    pub fn byte_at(&self, column: u32) -> Option<(usize, RowColumn)> {
        let bpr = self.bytes_per_row as u32;
        let (start, cell, kind) = if column < self.hex_start() {
            return None;
        } else if column < self.binary_start() {
            (self.hex_start(), self.metrics.hex_cell(), RowColumn::Hex)
        } else if column < self.ascii_start() {
            (self.binary_start(), self.metrics.binary_cell(), RowColumn::Binary)
        } else if column < self.row_width() {
            (self.ascii_start(), self.metrics.ascii_glyph, RowColumn::Ascii)
        } else {
            return None;
        };
        let index = ((column - start) / cell.max(1)).min(bpr.saturating_sub(1));
        Some((index as usize, kind))
    }
}

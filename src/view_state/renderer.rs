//! Pure row rendering: visible window + resident bytes -> row descriptors.
//!
//! Nothing here touches the terminal. The view layer turns descriptors into
//! styled ratatui lines; tests and benchmarks inspect them directly.

use super::viewport::VisibleWindow;
use crate::model::{AnnotationIndex, ByteRange};
use crate::store::PagedByteStore;

/// Placeholder for a byte whose page has not loaded yet (hex column).
pub const HEX_PLACEHOLDER: &str = "··";
/// Placeholder for a byte whose page has not loaded yet (binary column).
pub const BINARY_PLACEHOLDER: &str = "········";
/// Placeholder for a byte whose page has not loaded yet (ASCII column).
pub const ASCII_PLACEHOLDER: char = '·';

/// One byte position in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteCell {
    pub offset: u64,
    /// `None` until the byte's page is resident.
    pub value: Option<u8>,
    /// Inside the current selection.
    pub selected: bool,
    /// Inside the deep-link / jump highlight.
    pub highlighted: bool,
    /// Covered by at least one annotation.
    pub annotated: bool,
    /// Inside the active (focused) annotation.
    pub active: bool,
}

impl ByteCell {
    pub fn hex(&self) -> String {
        match self.value {
            Some(b) => format!("{b:02x}"),
            None => HEX_PLACEHOLDER.to_string(),
        }
    }

    pub fn binary(&self) -> String {
        match self.value {
            Some(b) => format!("{b:08b}"),
            None => BINARY_PLACEHOLDER.to_string(),
        }
    }

    /// Printable ASCII (32..=126) as itself, anything else as `.`.
    pub fn ascii(&self) -> char {
        match self.value {
            Some(b @ 32..=126) => b as char,
            Some(_) => '.',
            None => ASCII_PLACEHOLDER,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.value.is_some()
    }
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDescriptor {
    pub row: u64,
    pub offset: u64,
    /// Bytes of the row that exist in the file.
    pub cells: Vec<ByteCell>,
    /// Empty positions after the last byte of the file.
    pub padding: usize,
    /// Any annotation intersects this row.
    pub has_annotation: bool,
}

impl RowDescriptor {
    /// Eight lowercase hex digits.
    pub fn offset_label(&self) -> String {
        format!("{:08x}", self.offset)
    }
}

/// Everything a row needs besides raw bytes.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub store: &'a PagedByteStore,
    pub annotations: &'a AnnotationIndex,
    pub selection: Option<ByteRange>,
    pub highlight: Option<ByteRange>,
    pub active: Option<ByteRange>,
}

/// Render every row of `window`.
pub fn render_rows(window: &VisibleWindow, ctx: &RenderContext<'_>) -> Vec<RowDescriptor> {
    window
        .rows()
        .map(|row| render_row(row, window.bytes_per_row, ctx))
        .collect()
}

/// Render one row. A row at or past the end of the file has no cells.
pub fn render_row(row: u64, bytes_per_row: usize, ctx: &RenderContext<'_>) -> RowDescriptor {
    let total = ctx.store.geometry().total_size();
    let offset = row * bytes_per_row as u64;
    let row_end = offset + bytes_per_row as u64;
    let last = row_end.min(total);

    let in_range = |range: Option<ByteRange>, o: u64| range.is_some_and(|r| r.contains(o));
    let cells: Vec<ByteCell> = (offset..last.max(offset))
        .map(|o| ByteCell {
            offset: o,
            value: ctx.store.get_byte(o),
            selected: in_range(ctx.selection, o),
            highlighted: in_range(ctx.highlight, o),
            annotated: ctx.annotations.is_annotated(o),
            active: in_range(ctx.active, o),
        })
        .collect();

    RowDescriptor {
        row,
        offset,
        padding: bytes_per_row - cells.len(),
        has_annotation: ctx.annotations.row_has_annotation(offset, row_end.saturating_sub(1)),
        cells,
    }
}

//! View-state layer - Layout, scrolling, and row rendering
//!
//! This module implements the view-state layer for the TUI application,
//! responsible for row layout, virtualized scrolling, page scheduling and
//! producing row descriptors for the painter.
//!
//! # Module Structure
//!
//! - `types`: Core newtypes (ViewportDimensions)
//! - `debounce`: Debouncer - trailing-edge debounce driven by explicit instants
//! - `layout`: GlyphMetrics, LayoutEngine, RowGeometry - bytes per row and column positions
//! - `viewport`: ViewportScheduler - visible window and required pages
//! - `renderer`: RowDescriptor - pure rendering of the visible window

pub mod debounce;
pub mod layout;
pub mod renderer;
pub mod types;
pub mod viewport;

pub use layout::{compute_bytes_per_row, GlyphMetrics, LayoutEngine, RowColumn, RowGeometry};
pub use renderer::{render_row, render_rows, ByteCell, RenderContext, RowDescriptor};
pub use viewport::{compute_window, required_pages, ViewportConfig, ViewportScheduler, VisibleWindow};

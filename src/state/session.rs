//! One open session: bytes, annotations, selection and viewport together.
//!
//! A [`FileSession`] is built when a session is opened and dropped wholesale
//! when another one replaces it (e.g. after a fork). Backend events carry
//! the id of the session they were issued for and are ignored here if it
//! doesn't match.

use super::selection::{PressOutcome, SelectionModel};
use crate::model::{
    AnnotationError, AnnotationIndex, ByteRange, CommentsMap, Endianness, LinkError,
    NumericValue, SessionId, SessionRecord, Signedness, UserId,
};
use crate::source::{BackendEvent, CommentWriter};
use crate::store::{FileGeometry, InvalidGeometry, PageIndex, PagedByteStore, RangeLoader};
use crate::view_state::renderer::{render_rows, RenderContext, RowDescriptor};
use crate::view_state::types::ViewportDimensions;
use crate::view_state::{GlyphMetrics, LayoutEngine, ViewportConfig, ViewportScheduler, VisibleWindow};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Per-session tunables, resolved from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub page_size: u64,
    pub viewport: ViewportConfig,
    pub metrics: GlyphMetrics,
    pub resize_debounce: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            page_size: crate::store::DEFAULT_PAGE_SIZE,
            viewport: ViewportConfig::default(),
            metrics: GlyphMetrics::TERMINAL,
            resize_debounce: Duration::from_millis(100),
        }
    }
}

/// Something worth telling the user about in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Self::Info(text) | Self::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// State of one open session.
pub struct FileSession {
    record: SessionRecord,
    viewer: Option<UserId>,
    store: PagedByteStore,
    annotations: AnnotationIndex,
    selection: SelectionModel,
    layout: LayoutEngine,
    viewport: ViewportScheduler,
    /// Range emphasised by a deep link or jump.
    highlight: Option<ByteRange>,
    /// Annotation focused in the sidebar.
    active: Option<ByteRange>,
    writer: Box<dyn CommentWriter>,
}

impl std::fmt::Debug for FileSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSession")
            .field("record", &self.record.id)
            .field("store", &self.store)
            .field("annotations", &self.annotations.len())
            .field("selection", &self.selection)
            .field("scroll", &self.viewport.scroll_offset())
            .finish()
    }
}

impl FileSession {
    /// Build a session over `record`.
    ///
    /// `dims` is the hex pane's inner size in cells. Nothing is fetched until
    /// [`FileSession::load_visible`] or a scroll settles.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGeometry` if `settings.page_size` is zero.
    pub fn new(
        record: SessionRecord,
        viewer: Option<UserId>,
        loader: Box<dyn RangeLoader>,
        writer: Box<dyn CommentWriter>,
        settings: &SessionSettings,
        dims: ViewportDimensions,
    ) -> Result<Self, InvalidGeometry> {
        let geometry = FileGeometry::new(record.file_size, settings.page_size)?;
        let layout = LayoutEngine::new(
            settings.metrics,
            u32::from(dims.width),
            settings.resize_debounce,
        );
        let mut viewport = ViewportScheduler::new(settings.viewport, geometry, layout.bytes_per_row());
        viewport.set_container_height(u64::from(dims.height) * settings.viewport.row_height);
        let annotations = AnnotationIndex::from_comments(&record.comments);

        info!(
            session = %record.id,
            file_size = record.file_size,
            pages = geometry.page_count(),
            annotations = annotations.len(),
            "Session opened"
        );

        Ok(Self {
            record,
            viewer,
            store: PagedByteStore::new(geometry, loader),
            annotations,
            selection: SelectionModel::new(),
            layout,
            viewport,
            highlight: None,
            active: None,
            writer,
        })
    }

    // ===== Accessors =====

    pub fn id(&self) -> &SessionId {
        &self.record.id
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    pub fn viewer(&self) -> Option<&UserId> {
        self.viewer.as_ref()
    }

    pub fn is_owner(&self) -> bool {
        self.record.is_owned_by(self.viewer.as_ref())
    }

    pub fn geometry(&self) -> &FileGeometry {
        self.store.geometry()
    }

    pub fn store(&self) -> &PagedByteStore {
        &self.store
    }

    pub fn annotations(&self) -> &AnnotationIndex {
        &self.annotations
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn viewport(&self) -> &ViewportScheduler {
        &self.viewport
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn bytes_per_row(&self) -> usize {
        self.layout.bytes_per_row()
    }

    pub fn highlight(&self) -> Option<ByteRange> {
        self.highlight
    }

    pub fn active_annotation(&self) -> Option<ByteRange> {
        self.active
    }

    // ===== Viewport =====

    /// Request the pages of the current window immediately.
    pub fn load_visible(&mut self) -> Vec<PageIndex> {
        match self.viewport.current_pages() {
            Some((first, last)) => self.store.request_pages(first, last),
            None => Vec::new(),
        }
    }

    /// Record a new hex pane size. Width changes are debounced; height
    /// changes apply at once and re-arm the scroll settle timer.
    pub fn resize(&mut self, dims: ViewportDimensions, now: Instant) {
        self.layout.on_resize(u32::from(dims.width), now);
        let row_height = self.viewport.config().row_height;
        self.viewport
            .set_container_height(u64::from(dims.height) * row_height);
        let scroll = self.viewport.scroll_offset();
        self.viewport.scroll_to(scroll, now);
    }

    /// Apply settled resizes and scrolls. Returns pages newly requested.
    pub fn tick(&mut self, now: Instant) -> Vec<PageIndex> {
        let mut issued = Vec::new();
        if let Some(bytes_per_row) = self.layout.poll(now) {
            self.viewport.set_bytes_per_row(bytes_per_row);
            issued.extend(self.load_visible());
        }
        if let Some((first, last)) = self.viewport.poll(now) {
            issued.extend(self.store.request_pages(first, last));
        }
        if !issued.is_empty() {
            debug!(?issued, "Requested pages");
        }
        issued
    }

    pub fn scroll_rows(&mut self, rows: i64, now: Instant) {
        self.viewport.scroll_rows(rows, now);
    }

    pub fn scroll_pages(&mut self, pages: i64, now: Instant) {
        let rows = self.viewport.page_rows() as i64;
        self.viewport.scroll_rows(pages.saturating_mul(rows), now);
    }

    pub fn scroll_to_top(&mut self, now: Instant) {
        self.viewport.scroll_to(0, now);
    }

    pub fn scroll_to_bottom(&mut self, now: Instant) {
        self.viewport.scroll_to(u64::MAX, now);
    }

    /// Centre `offset` and fetch its page and neighbours now.
    pub fn jump_to(&mut self, offset: u64) -> Vec<PageIndex> {
        match self.viewport.jump_to(offset) {
            Some((first, last)) => self.store.request_pages(first, last),
            None => Vec::new(),
        }
    }

    /// Window including buffer rows.
    pub fn window(&self) -> VisibleWindow {
        self.viewport.window()
    }

    /// Rows of the whole window (buffers included).
    pub fn render_window(&self) -> Vec<RowDescriptor> {
        render_rows(&self.window(), &self.render_context())
    }

    /// Only the rows that fit in the pane, starting at the top edge.
    pub fn render_visible(&self) -> Vec<RowDescriptor> {
        let first = self.viewport.first_visible_row();
        let end = (first + self.viewport.page_rows()).min(self.viewport.total_rows());
        let window = VisibleWindow {
            start_row: first.min(end),
            end_row: end,
            bytes_per_row: self.bytes_per_row(),
        };
        render_rows(&window, &self.render_context())
    }

    fn render_context(&self) -> RenderContext<'_> {
        RenderContext {
            store: &self.store,
            annotations: &self.annotations,
            selection: self.selection.range(),
            highlight: self.highlight,
            active: self.active,
        }
    }

    /// Byte offset drawn at `row_in_pane`, `byte_in_row`, if it exists.
    pub fn offset_at(&self, row_in_pane: u64, byte_in_row: usize) -> Option<u64> {
        let row = self.viewport.first_visible_row() + row_in_pane;
        let offset = row * self.bytes_per_row() as u64 + byte_in_row as u64;
        self.geometry().contains(offset).then_some(offset)
    }

    // ===== Backend events =====

    /// Apply a backend completion. Events for other sessions are ignored.
    pub fn handle_event(&mut self, event: BackendEvent) -> Option<Notice> {
        if event.session() != self.id() {
            debug!(event_session = %event.session(), "Ignoring event for another session");
            return None;
        }
        match event {
            BackendEvent::PageLoaded { page, bytes, .. } => {
                match self.store.on_page_resolved(page, bytes) {
                    Ok(()) => None,
                    Err(e) => self.page_notice(page, &e.to_string()),
                }
            }
            BackendEvent::PageFailed { page, error, .. } => {
                warn!(page = page.get(), error = %error, "Page failed to load");
                self.store.on_page_failed(page);
                self.page_notice(page, &error)
            }
            BackendEvent::CommentsSaved { .. } => {
                debug!(session = %self.id(), "Annotations saved");
                None
            }
            BackendEvent::CommentsSaveFailed { error, .. } => {
                warn!(session = %self.id(), error = %error, "Annotations not saved");
                Some(Notice::Error(format!("Saving annotations failed: {error}")))
            }
            BackendEvent::CommentsChanged { comments, .. } => {
                self.replace_comments(comments);
                None
            }
        }
    }

    fn page_notice(&self, page: PageIndex, error: &str) -> Option<Notice> {
        let (start, end) = self.geometry().page_span(page)?;
        let window = self.window();
        let visible = start < window.visible_end() && end >= window.visible_start();
        visible.then(|| {
            Notice::Error(format!(
                "Could not load bytes {start}-{end} ({error}); scroll to retry"
            ))
        })
    }

    /// Replace the annotation set with a change-feed snapshot.
    fn replace_comments(&mut self, comments: CommentsMap) {
        let index = AnnotationIndex::from_comments(&comments);
        debug!(session = %self.id(), annotations = index.len(), "Annotations replaced");
        if let Some(active) = self.active {
            if index.get(&active).is_none() {
                self.active = None;
            }
        }
        self.annotations.replace_with(index);
        self.record.comments = comments;
    }

    // ===== Deep links =====

    /// Apply a `comment-{start}-{end}` fragment: highlight the range, focus
    /// its annotation if there is one, and jump to it.
    ///
    /// # Errors
    ///
    /// `LinkError::Malformed` for unparseable fragments and
    /// `LinkError::OutOfRange` when `start` is past the end of the file.
    pub fn apply_fragment(&mut self, fragment: &str) -> Result<ByteRange, LinkError> {
        let range = ByteRange::from_fragment(fragment)?;
        let total_size = self.geometry().total_size();
        if range.start() >= total_size {
            return Err(LinkError::OutOfRange {
                offset: range.start(),
                total_size,
            });
        }
        self.selection.clear();
        self.highlight = Some(range);
        self.active = self.annotations.get(&range).map(|_| range);
        self.jump_to(range.start());
        info!(session = %self.id(), %range, "Applied deep link");
        Ok(range)
    }

    /// Shareable link to `range` in this session.
    pub fn deep_link(&self, range: ByteRange) -> String {
        format!("{}#{}", self.id(), range.to_fragment())
    }

    // ===== Selection =====

    /// Mouse press on `offset`.
    pub fn press(&mut self, offset: u64) -> PressOutcome {
        let outcome = self.selection.press(offset, &self.annotations);
        match outcome {
            PressOutcome::Annotation(range) => self.active = Some(range),
            PressOutcome::Selecting => self.highlight = None,
        }
        outcome
    }

    pub fn drag(&mut self, offset: u64) {
        self.selection.extend(offset);
    }

    pub fn release(&mut self) {
        self.selection.end();
    }

    /// Move (or with `extend`, stretch) a keyboard selection by `delta`
    /// bytes, scrolling to keep the moving end in view.
    pub fn move_cursor(&mut self, delta: i64, extend: bool, now: Instant) {
        let last = match self.geometry().total_size().checked_sub(1) {
            Some(last) => last,
            None => return,
        };
        let current = self
            .selection
            .focus()
            .or(self.active.map(|r| r.start()))
            .unwrap_or_else(|| {
                self.viewport.first_visible_row() * self.bytes_per_row() as u64
            });
        let target = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta as u64)
        }
        .min(last);

        if extend && !self.selection.is_empty() {
            self.selection.adjust_focus(target);
        } else {
            self.selection.begin(target);
            self.selection.end();
        }
        self.reveal(target, now);
    }

    fn reveal(&mut self, offset: u64, now: Instant) {
        if self.viewport.is_offset_visible(offset) {
            return;
        }
        let row = (offset / self.bytes_per_row() as u64) as i64;
        let first = self.viewport.first_visible_row() as i64;
        let rows = self.viewport.page_rows() as i64;
        let delta = if row < first { row - first } else { row - (first + rows - 1) };
        self.viewport.scroll_rows(delta, now);
    }

    /// Clear selection, highlight and active annotation.
    pub fn clear(&mut self) {
        self.selection.clear();
        self.highlight = None;
        self.active = None;
    }

    /// Decode the selection as a fixed-width integer.
    pub fn numeric_value(&self, endianness: Endianness, signedness: Signedness) -> NumericValue {
        let Some(range) = self.selection.range() else {
            return NumericValue::NoSelection;
        };
        if !self.store.is_range_loaded(range.start(), range.end()) {
            return NumericValue::NotFullyLoaded;
        }
        if range.len() > 8 {
            return NumericValue::UnsupportedLength(usize::try_from(range.len()).unwrap_or(usize::MAX));
        }
        let bytes = self.store.get_slice(range.start(), range.end());
        crate::model::interpret(&bytes, endianness, signedness)
    }

    // ===== Annotations =====

    /// Focus `range` in the sidebar without moving the view.
    pub fn set_active(&mut self, range: Option<ByteRange>) {
        self.active = range;
    }

    /// Focus `range`, highlight it and jump to its start.
    pub fn jump_to_annotation(&mut self, range: ByteRange) -> Vec<PageIndex> {
        self.selection.clear();
        self.active = Some(range);
        self.highlight = Some(range);
        self.jump_to(range.start())
    }

    /// Annotate the current selection.
    pub fn annotate_selection(&mut self, text: &str) -> Result<ByteRange, AnnotationError> {
        let range = self.selection.range().ok_or(AnnotationError::NoSelection)?;
        self.annotate(range, text)
    }

    /// Add or replace the annotation on `range`.
    ///
    /// Applied locally at once; the full map is handed to the writer and
    /// never rolled back if the write fails.
    pub fn annotate(&mut self, range: ByteRange, text: &str) -> Result<ByteRange, AnnotationError> {
        if !self.is_owner() {
            return Err(AnnotationError::ReadOnly);
        }
        if text.trim().is_empty() {
            return Err(AnnotationError::EmptyText);
        }
        self.annotations.put(range, text);
        self.selection.clear();
        self.active = Some(range);
        self.sync_comments();
        Ok(range)
    }

    /// Remove the annotation on exactly `range`.
    pub fn delete_annotation(&mut self, range: ByteRange) -> Result<(), AnnotationError> {
        if !self.is_owner() {
            return Err(AnnotationError::ReadOnly);
        }
        if self.annotations.remove(&range).is_none() {
            return Err(AnnotationError::Missing(range.to_string()));
        }
        if self.active == Some(range) {
            self.active = None;
        }
        self.sync_comments();
        Ok(())
    }

    /// Current annotations in wire form (used when forking).
    pub fn comments(&self) -> CommentsMap {
        self.annotations.to_comments()
    }

    fn sync_comments(&mut self) {
        let comments = self.annotations.to_comments();
        self.record.comments = comments.clone();
        self.writer.write(&self.record.id, comments);
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

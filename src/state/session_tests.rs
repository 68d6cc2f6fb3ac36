//! Tests for FileSession.

use super::*;
use crate::model::{LinkError, NumericValue};
use crate::source::RecordingWriter;
use crate::store::RecordingLoader;
use chrono::Utc;
use std::time::{Duration, Instant};

const FILE_SIZE: u64 = 1000;
const PAGE_SIZE: u64 = 256;
/// 10 + 3 + 13 * 16: sixteen bytes per row with terminal metrics.
const WIDTH: u16 = 221;
const HEIGHT: u16 = 10;

fn settings() -> SessionSettings {
    SessionSettings {
        page_size: PAGE_SIZE,
        viewport: ViewportConfig {
            row_height: 1,
            buffer_rows: 10,
            scroll_debounce: Duration::from_millis(150),
        },
        metrics: GlyphMetrics::TERMINAL,
        resize_debounce: Duration::from_millis(100),
    }
}

fn range(start: u64, end: u64) -> ByteRange {
    ByteRange::new(start, end).unwrap()
}

fn record(owner: &str, comments: &[(&str, &str)]) -> SessionRecord {
    SessionRecord {
        id: SessionId::new("sess1").unwrap(),
        filename: "firmware.bin".into(),
        file_size: FILE_SIZE,
        comments: comments
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        user_id: UserId::new(owner).unwrap(),
        forked_from: None,
        created_at: Utc::now(),
    }
}

struct Harness {
    session: FileSession,
    loader: RecordingLoader,
    writer: RecordingWriter,
}

fn harness(viewer: Option<&str>, comments: &[(&str, &str)]) -> Harness {
    harness_with(viewer, comments, &settings(), HEIGHT)
}

fn harness_with(
    viewer: Option<&str>,
    comments: &[(&str, &str)],
    settings: &SessionSettings,
    height: u16,
) -> Harness {
    let loader = RecordingLoader::new();
    let writer = RecordingWriter::new();
    let session = FileSession::new(
        record("ada", comments),
        viewer.map(|v| UserId::new(v).unwrap()),
        Box::new(loader.clone()),
        Box::new(writer.clone()),
        settings,
        ViewportDimensions::new(WIDTH, height),
    )
    .unwrap();
    Harness {
        session,
        loader,
        writer,
    }
}

fn page_bytes(page: u64) -> Vec<u8> {
    let start = page * PAGE_SIZE;
    let end = (start + PAGE_SIZE).min(FILE_SIZE);
    (start..end).map(|offset| offset as u8).collect()
}

fn loaded(session: &SessionId, page: u64) -> BackendEvent {
    BackendEvent::PageLoaded {
        session: session.clone(),
        page: PageIndex(page),
        bytes: page_bytes(page),
    }
}

#[test]
fn zero_page_size_is_rejected() {
    let mut bad = settings();
    bad.page_size = 0;
    let result = FileSession::new(
        record("ada", &[]),
        None,
        Box::new(RecordingLoader::new()),
        Box::new(RecordingWriter::new()),
        &bad,
        ViewportDimensions::new(WIDTH, HEIGHT),
    );
    assert!(result.is_err());
}

#[test]
fn load_visible_requests_window_pages_once() {
    let mut h = harness(Some("ada"), &[]);
    assert_eq!(h.session.bytes_per_row(), 16);

    // 30 rows of 16 bytes cover pages 0 and 1; one page of read-ahead adds 2.
    let first = h.session.load_visible();
    let second = h.session.load_visible();

    assert_eq!(first, vec![PageIndex(0), PageIndex(1), PageIndex(2)]);
    assert!(second.is_empty());
    assert_eq!(h.loader.requested_pages(), vec![0, 1, 2]);
}

#[test]
fn loaded_page_renders_real_bytes() {
    let mut h = harness(Some("ada"), &[]);
    h.session.load_visible();
    let id = h.session.id().clone();

    assert_eq!(h.session.handle_event(loaded(&id, 0)), None);

    let rows = h.session.render_visible();
    assert_eq!(rows.len(), HEIGHT as usize);
    assert_eq!(rows[1].offset_label(), "00000010");
    assert_eq!(rows[1].cells[0].hex(), "10");
    // Page 1 was requested but hasn't arrived.
    let row16 = &h.session.render_window()[16];
    assert!(!row16.cells[0].is_loaded());
}

#[test]
fn events_for_other_sessions_are_ignored() {
    let mut h = harness(Some("ada"), &[]);
    h.session.load_visible();
    let other = SessionId::new("other").unwrap();

    let notice = h.session.handle_event(loaded(&other, 0));

    assert_eq!(notice, None);
    assert!(!h.session.store().is_loaded(PageIndex(0)));
}

#[test]
fn failed_visible_page_reports_and_can_be_retried() {
    let mut h = harness(Some("ada"), &[]);
    h.session.load_visible();
    let id = h.session.id().clone();

    let notice = h.session.handle_event(BackendEvent::PageFailed {
        session: id,
        page: PageIndex(0),
        error: "connection reset".into(),
    });

    assert!(notice.as_ref().is_some_and(Notice::is_error));
    assert!(notice.unwrap().text().contains("connection reset"));
    assert!(!h.session.store().is_in_flight(PageIndex(0)));
    assert_eq!(h.session.load_visible(), vec![PageIndex(0)]);
}

#[test]
fn failed_offscreen_page_is_silent() {
    let mut h = harness(Some("ada"), &[]);
    h.session.load_visible();
    let id = h.session.id().clone();

    let notice = h.session.handle_event(BackendEvent::PageFailed {
        session: id,
        page: PageIndex(3),
        error: "timeout".into(),
    });

    assert_eq!(notice, None);
}

#[test]
fn wrong_length_page_is_reported() {
    let mut h = harness(Some("ada"), &[]);
    h.session.load_visible();
    let id = h.session.id().clone();

    let notice = h.session.handle_event(BackendEvent::PageLoaded {
        session: id,
        page: PageIndex(0),
        bytes: vec![0; 3],
    });

    assert!(notice.is_some());
    assert!(!h.session.store().is_loaded(PageIndex(0)));
}

#[test]
fn fragment_highlights_activates_and_jumps() {
    let mut h = harness(Some("ada"), &[("100-104", "**magic header**")]);

    let applied = h.session.apply_fragment("comment-100-104").unwrap();

    assert_eq!(applied, range(100, 104));
    assert_eq!(h.session.highlight(), Some(range(100, 104)));
    assert_eq!(h.session.active_annotation(), Some(range(100, 104)));
    assert!(h.session.viewport().is_offset_visible(100));
    // Target page and neighbours, widened to the window's read-ahead.
    assert_eq!(h.loader.requested_pages(), vec![0, 1, 2]);
}

#[test]
fn jump_with_small_pages_fills_every_visible_row() {
    let small = SessionSettings {
        page_size: 64,
        ..settings()
    };
    let mut h = harness_with(None, &[], &small, 30);
    let id = h.session.id().clone();
    let start = Instant::now();

    h.session.jump_to(500);
    for page in h.loader.requested_pages() {
        let begin = page * 64;
        let end = (begin + 64).min(FILE_SIZE);
        h.session.handle_event(BackendEvent::PageLoaded {
            session: id.clone(),
            page: PageIndex(page),
            bytes: (begin..end).map(|offset| offset as u8).collect(),
        });
    }

    assert!(h.session.tick(start + Duration::from_secs(5)).is_empty());
    let unloaded: Vec<u64> = h
        .session
        .render_visible()
        .iter()
        .filter(|row| row.cells.iter().any(|cell| !cell.is_loaded()))
        .map(|row| row.offset)
        .collect();
    assert!(unloaded.is_empty(), "rows still unloaded: {unloaded:?}");
    assert!(h.session.viewport().is_offset_visible(500));
}

#[test]
fn jump_to_annotation_at_end_of_address_space_does_not_overflow() {
    let far = format!("{}-{}", u64::MAX - 3, u64::MAX);
    let mut h = harness(Some("ada"), &[(far.as_str(), "sentinel")]);
    let range: ByteRange = far.parse().unwrap();
    assert_eq!(h.session.annotations().get(&range), Some("sentinel"));

    h.session.jump_to_annotation(range);

    assert_eq!(
        h.session.viewport().scroll_offset(),
        h.session.viewport().max_scroll()
    );
}

#[test]
fn fragment_without_annotation_still_highlights() {
    let mut h = harness(None, &[]);

    h.session.apply_fragment("comment-600-603").unwrap();

    assert_eq!(h.session.highlight(), Some(range(600, 603)));
    assert_eq!(h.session.active_annotation(), None);
    assert!(h.session.viewport().is_offset_visible(600));
}

#[test]
fn bad_fragments_are_rejected() {
    let mut h = harness(None, &[]);

    assert!(matches!(
        h.session.apply_fragment("comment-5-x"),
        Err(LinkError::Malformed(_))
    ));
    assert!(matches!(
        h.session.apply_fragment("comment-1000-1003"),
        Err(LinkError::OutOfRange {
            offset: 1000,
            total_size: FILE_SIZE
        })
    ));
    assert_eq!(h.session.highlight(), None);
}

#[test]
fn deep_link_names_session_and_range() {
    let h = harness(None, &[]);
    assert_eq!(h.session.deep_link(range(100, 104)), "sess1#comment-100-104");
}

#[test]
fn owner_annotation_is_applied_and_written() {
    let mut h = harness(Some("ada"), &[]);
    h.session.press(10);
    h.session.drag(13);
    h.session.release();

    let annotated = h.session.annotate_selection("length field").unwrap();

    assert_eq!(annotated, range(10, 13));
    assert_eq!(h.session.annotations().get(&range(10, 13)), Some("length field"));
    assert!(h.session.selection().is_empty());
    assert_eq!(h.session.active_annotation(), Some(range(10, 13)));
    let written = h.writer.last().unwrap();
    assert_eq!(written.get("10-13").map(String::as_str), Some("length field"));
    assert_eq!(h.session.record().comments, written);
}

#[test]
fn viewer_without_ownership_cannot_annotate() {
    let mut h = harness(Some("bob"), &[("0-3", "magic")]);

    assert_eq!(
        h.session.annotate(range(4, 7), "nope"),
        Err(AnnotationError::ReadOnly)
    );
    assert_eq!(
        h.session.delete_annotation(range(0, 3)),
        Err(AnnotationError::ReadOnly)
    );
    assert!(h.writer.writes().is_empty());
}

#[test]
fn annotation_requires_selection_and_text() {
    let mut h = harness(Some("ada"), &[]);

    assert_eq!(
        h.session.annotate_selection("x"),
        Err(AnnotationError::NoSelection)
    );
    assert_eq!(
        h.session.annotate(range(0, 1), "   "),
        Err(AnnotationError::EmptyText)
    );
}

#[test]
fn delete_removes_and_writes() {
    let mut h = harness(Some("ada"), &[("0-3", "magic"), ("8-9", "crc")]);
    h.session.set_active(Some(range(0, 3)));

    h.session.delete_annotation(range(0, 3)).unwrap();

    assert_eq!(h.session.active_annotation(), None);
    assert_eq!(h.session.annotations().len(), 1);
    assert_eq!(h.writer.last().unwrap().len(), 1);
    assert_eq!(
        h.session.delete_annotation(range(0, 3)),
        Err(AnnotationError::Missing("0-3".into()))
    );
}

#[test]
fn change_feed_replaces_annotations() {
    let mut h = harness(None, &[("0-3", "magic")]);
    h.session.set_active(Some(range(0, 3)));
    let id = h.session.id().clone();
    let mut comments = CommentsMap::new();
    comments.insert("20-21".into(), "version".into());

    let notice = h.session.handle_event(BackendEvent::CommentsChanged {
        session: id,
        comments: comments.clone(),
    });

    assert_eq!(notice, None);
    assert_eq!(h.session.annotations().get(&range(0, 3)), None);
    assert_eq!(h.session.annotations().get(&range(20, 21)), Some("version"));
    assert_eq!(h.session.active_annotation(), None);
    assert_eq!(h.session.comments(), comments);
}

#[test]
fn save_failure_surfaces_notice_but_keeps_edit() {
    let mut h = harness(Some("ada"), &[]);
    h.session.annotate(range(0, 0), "first byte").unwrap();
    let id = h.session.id().clone();

    let notice = h.session.handle_event(BackendEvent::CommentsSaveFailed {
        session: id,
        error: "disk full".into(),
    });

    assert!(notice.is_some_and(|n| n.is_error()));
    assert_eq!(h.session.annotations().len(), 1);
}

#[test]
fn press_on_annotated_byte_activates_without_jumping() {
    let mut h = harness(Some("ada"), &[("100-104", "magic")]);
    let scroll = h.session.viewport().scroll_offset();

    let outcome = h.session.press(102);

    assert_eq!(outcome, PressOutcome::Annotation(range(100, 104)));
    assert_eq!(h.session.active_annotation(), Some(range(100, 104)));
    assert_eq!(h.session.viewport().scroll_offset(), scroll);
}

#[test]
fn numeric_value_tracks_loading_and_length() {
    let mut h = harness(None, &[]);
    assert_eq!(
        h.session.numeric_value(Endianness::Little, Signedness::Unsigned),
        NumericValue::NoSelection
    );

    h.session.press(0);
    h.session.drag(3);
    h.session.release();
    assert_eq!(
        h.session.numeric_value(Endianness::Little, Signedness::Unsigned),
        NumericValue::NotFullyLoaded
    );

    h.session.load_visible();
    let id = h.session.id().clone();
    h.session.handle_event(loaded(&id, 0));
    assert_eq!(
        h.session.numeric_value(Endianness::Little, Signedness::Unsigned),
        NumericValue::Decoded("50462976".into())
    );
    assert_eq!(
        h.session.numeric_value(Endianness::Big, Signedness::Unsigned),
        NumericValue::Decoded("66051".into())
    );

    h.session.press(0);
    h.session.drag(99);
    h.session.release();
    assert_eq!(
        h.session.numeric_value(Endianness::Little, Signedness::Unsigned),
        NumericValue::UnsupportedLength(100)
    );
}

#[test]
fn cursor_moves_extend_and_stay_in_bounds() {
    let mut h = harness(None, &[]);
    let now = Instant::now();

    h.session.move_cursor(1, false, now);
    assert_eq!(h.session.selection().range(), Some(range(1, 1)));

    h.session.move_cursor(3, true, now);
    assert_eq!(h.session.selection().range(), Some(range(1, 4)));

    h.session.move_cursor(-10, false, now);
    assert_eq!(h.session.selection().range(), Some(range(0, 0)));

    h.session.move_cursor(i64::MAX, false, now);
    assert_eq!(h.session.selection().range(), Some(range(999, 999)));
    assert!(h.session.viewport().is_offset_visible(999));
}

#[test]
fn scroll_requests_pages_only_after_settling() {
    let mut h = harness(None, &[]);
    let start = Instant::now();
    h.session.load_visible();
    h.loader.clear();

    h.session.scroll_to_bottom(start);
    assert!(h.session.tick(start + Duration::from_millis(50)).is_empty());

    let issued = h.session.tick(start + Duration::from_millis(200));

    assert_eq!(issued, vec![PageIndex(3)]);
    assert_eq!(h.loader.requested_pages(), vec![3]);
}

#[test]
fn resize_applies_after_debounce_and_keeps_top_byte() {
    let mut h = harness(None, &[]);
    let start = Instant::now();
    h.session.jump_to(512);
    let top_byte = h.session.viewport().first_visible_row() * 16;

    // 10 + 3 + 13 * 8: eight bytes per row.
    h.session.resize(ViewportDimensions::new(117, HEIGHT), start);
    assert_eq!(h.session.bytes_per_row(), 16);

    h.session.tick(start + Duration::from_millis(200));

    assert_eq!(h.session.bytes_per_row(), 8);
    assert_eq!(h.session.viewport().first_visible_row() * 8, top_byte);
}

#[test]
fn clear_drops_selection_highlight_and_focus() {
    let mut h = harness(Some("ada"), &[("100-104", "magic")]);
    h.session.apply_fragment("comment-100-104").unwrap();
    h.session.press(5);

    h.session.clear();

    assert!(h.session.selection().is_empty());
    assert_eq!(h.session.highlight(), None);
    assert_eq!(h.session.active_annotation(), None);
}

#[test]
fn offset_at_maps_pane_cells_to_bytes() {
    let h = harness(None, &[]);
    assert_eq!(h.session.offset_at(2, 3), Some(35));
    assert_eq!(h.session.offset_at(70, 0), None);
}

//! Tests for screen layout and full-frame rendering.

use super::*;
use crate::model::SessionId;
use crate::source::BackendEvent;
use crate::state::test_support::app_state;
use crate::store::PageIndex;
use crate::view::styles::ColorConfig;
use ratatui::backend::TestBackend;
use ratatui::Terminal;

// ===== Test Helpers =====

fn styles() -> HexStyles {
    HexStyles::with_color_config(ColorConfig::disabled())
}

fn render(state: &AppState, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal
        .draw(|frame| render_layout(frame, state, &styles()))
        .unwrap();
    let buffer = terminal.backend().buffer().clone();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

fn text(line: &Line) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

// ===== calculate_areas =====

#[test]
fn wide_terminal_gets_sidebar() {
    let areas = calculate_areas(Rect::new(0, 0, 240, 30));

    assert_eq!(areas.header, Rect::new(0, 0, 240, 1));
    assert_eq!(areas.info_bar, Rect::new(0, 28, 240, 1));
    assert_eq!(areas.status, Rect::new(0, 29, 240, 1));
    let sidebar = areas.sidebar.expect("sidebar should be shown");
    assert_eq!(sidebar.width, 72);
    assert_eq!(areas.hex.width + sidebar.width, 240);
    assert_eq!(areas.hex.height, 27);
}

#[test]
fn narrow_terminal_hides_sidebar() {
    let areas = calculate_areas(Rect::new(0, 0, 60, 20));

    assert!(areas.sidebar.is_none());
    assert_eq!(areas.hex.width, 60);
}

#[test]
fn very_wide_terminal_keeps_sidebar_proportion() {
    let areas = calculate_areas(Rect::new(0, 0, 4000, 10));

    assert_eq!(areas.sidebar.map(|r| r.width), Some(1200));
    assert_eq!(areas.hex.width, 2800);
}

#[test]
fn hex_viewport_uses_outer_width_and_inner_height() {
    let areas = calculate_areas(Rect::new(0, 0, 60, 20));

    assert_eq!(areas.hex_inner(), Rect::new(1, 2, 58, 15));
    assert_eq!(areas.hex_viewport(), ViewportDimensions::new(60, 15));
}

// ===== Header and status =====

#[test]
fn header_marks_owner_and_read_only() {
    let (owner, _, _) = app_state(64, Some("ada"), &[]);
    let (guest, _, _) = app_state(64, Some("bob"), &[]);

    assert!(text(&header_line(&owner, &styles())).ends_with("[OWNER]"));
    let guest_header = text(&header_line(&guest, &styles()));
    assert!(guest_header.starts_with(" test.bin │ test-session │ owner ada"));
    assert!(guest_header.ends_with("[READ-ONLY]"));
}

#[test]
fn truncate_to_width_counts_display_columns() {
    assert_eq!(truncate_to_width("dump.bin", 8), "dump.bin");
    assert_eq!(truncate_to_width("firmware_image.bin", 9), "firmware…");
    // Wide characters take two columns each.
    assert_eq!(truncate_to_width("固件固件.bin", 6), "固件…");
}

#[test]
fn status_shows_notice_before_hints() {
    let (mut state, _, _) = app_state(64, Some("ada"), &[]);
    assert_eq!(
        text(&status_line(&state, &styles())),
        format!(" {}", keyboard_hints(FocusPane::HexPane, true))
    );

    state.error("Select some bytes first");
    assert_eq!(text(&status_line(&state, &styles())), " Select some bytes first");
}

#[test]
fn read_only_hints_offer_fork_instead_of_annotate() {
    assert!(keyboard_hints(FocusPane::HexPane, false).contains("F fork"));
    assert!(!keyboard_hints(FocusPane::HexPane, false).contains("annotate"));
}

// ===== Full frame =====

#[test]
fn frame_shows_placeholders_until_page_arrives() {
    let (mut state, _, _) = app_state(64, Some("ada"), &[]);

    let before = render(&state, 240, 12);
    assert!(before.contains("00000000  ·· ·· ··"));

    let bytes: Vec<u8> = (0u8..64).collect();
    state.session_mut().handle_event(BackendEvent::PageLoaded {
        session: SessionId::new("test-session").unwrap(),
        page: PageIndex(0),
        bytes,
    });

    let after = render(&state, 240, 12);
    assert!(after.contains("00000000  00 01 02 03"));
    assert!(after.contains("00000010  10 11 12 13"));
}

#[test]
fn frame_lists_annotations_in_sidebar() {
    let (state, _, _) = app_state(64, None, &[("16-19", "length field"), ("0-3", "magic")]);

    let screen = render(&state, 240, 14);

    let magic = screen.find("00000000-00000003").expect("first entry");
    let length = screen.find("00000010-00000013").expect("second entry");
    assert!(magic < length, "sidebar is sorted by start");
    assert!(screen.contains("length field"));
    assert!(screen.contains("Annotations (2)"));
}

#[test]
fn frame_draws_editor_overlay() {
    let (mut state, _, _) = app_state(64, Some("ada"), &[]);
    state.editor = Some(crate::state::CommentEditor::open(
        crate::model::ByteRange::new(4, 7).unwrap(),
        Some("crc"),
    ));

    let screen = render(&state, 240, 30);

    assert!(screen.contains("Annotate 00000004-00000007"));
    assert!(screen.contains("crc▏"));
}

//! Selection info bar: range, length and numeric interpretation.

use crate::model::{ByteRange, Endianness, NumericValue, Signedness};
use crate::state::AppState;
use crate::view::styles::HexStyles;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Build the info bar line.
///
/// With a selection: `Selected 0x10-0x13 (4 bytes) | Little Endian Unsigned: 67305985`.
/// Without one, only the decode settings and a prompt.
pub fn info_line(
    selection: Option<ByteRange>,
    endianness: Endianness,
    signedness: Signedness,
    value: &NumericValue,
    styles: &HexStyles,
) -> Line<'static> {
    let mut spans = Vec::new();
    if let Some(range) = selection {
        let noun = if range.len() == 1 { "byte" } else { "bytes" };
        spans.push(Span::styled(
            format!(
                " Selected {:#x}-{:#x} ({} {noun}) │ ",
                range.start(),
                range.end(),
                range.len()
            ),
            styles.info,
        ));
    } else {
        spans.push(Span::raw(" "));
    }

    spans.push(Span::styled(
        format!("{} {}: ", endianness.label(), signedness.label()),
        styles.info,
    ));
    let value_style = match value {
        NumericValue::Decoded(_) => styles.header,
        _ => styles.hint,
    };
    spans.push(Span::styled(value.to_string(), value_style));

    Line::from(spans)
}

pub fn render_info_bar(frame: &mut Frame, area: Rect, state: &AppState, styles: &HexStyles) {
    let line = info_line(
        state.session().selection().range(),
        state.endianness,
        state.signedness,
        &state.numeric_value(),
        styles,
    );
    frame.render_widget(Paragraph::new(line), area);
}

//! Markdown rendering for annotation text.

use ratatui::{
    style::Style,
    text::{Line, Span},
};
use tui_markdown::from_str;

/// Render markdown text with `base_style` applied to unstyled spans.
///
/// Markdown styling (bold, italic, code) takes precedence over the base
/// style. Empty input renders as no lines.
pub fn render_markdown(markdown_text: &str, base_style: Style) -> Vec<Line<'static>> {
    if markdown_text.trim().is_empty() {
        return Vec::new();
    }
    let text = from_str(markdown_text);

    text.lines
        .into_iter()
        .map(|line| {
            let owned_spans: Vec<_> = line
                .spans
                .into_iter()
                .map(|span| Span {
                    content: span.content.into_owned().into(),
                    style: base_style.patch(span.style),
                })
                .collect();
            Line::from(owned_spans)
        })
        .collect()
}

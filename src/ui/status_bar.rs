//! Bottom status line: position, filter state, query editor, messages.

use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::app::App;

fn bar_style() -> Style {
    Style::new().fg(Color::Black).bg(Color::White)
}

pub(super) fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let style = bar_style();
    let mut spans: Vec<Span> = vec![Span::styled(
        format!("file: {}/{} ", app.buffer.position(), app.buffer.len()),
        style,
    )];
    if app.col > 0 {
        spans.push(Span::styled(format!("col: {} ", app.col), style));
    }
    if app.is_filtered() {
        spans.push(Span::styled(
            format!("(orig: {} lines) ", app.origin.len()),
            style,
        ));
    }

    if app.is_query_mode() {
        let (left, right) = app.history.current().halves();
        let bold = style.add_modifier(Modifier::BOLD);
        spans.push(Span::styled(" /", style));
        spans.push(Span::styled(left.to_string(), bold));
        // terminal caret sits between the halves
        let used: usize = spans.iter().map(|s| s.content.width()).sum();
        f.set_cursor_position(Position::new(
            area.x.saturating_add(used.min(u16::MAX as usize) as u16),
            area.y,
        ));
        spans.push(Span::styled(right.to_string(), bold));
        spans.push(Span::styled("/", style));
    } else if let Some(re) = &app.pattern {
        spans.push(Span::styled(format!(" /{}/", re.as_str()), style));
    }

    if let Some(message) = app.active_status_message() {
        spans.push(Span::styled(
            format!("  {message}"),
            style.fg(Color::Green).add_modifier(Modifier::BOLD),
        ));
    }

    let used: usize = spans.iter().map(|s| s.content.width()).sum();
    let width = area.width as usize;
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

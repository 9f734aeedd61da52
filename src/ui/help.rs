//! Key binding overlay.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

const BINDINGS: &[(&str, &str)] = &[
    ("Up/Down", "move one record"),
    ("PgUp/PgDn", "move 25 records (scroll open details)"),
    ("Left/Right", "scroll columns"),
    ("0", "jump to the first record"),
    ("F", "follow new records"),
    ("/", "search (regex, falls back to literal)"),
    ("n/N", "next/previous match or mark"),
    ("Space", "mark the current record"),
    ("m", "mark every match"),
    ("M", "clear all marks"),
    ("g", "keep marked records"),
    ("G", "keep unmarked records"),
    ("O", "back to the full log"),
    ("d", "cycle detail panel (tags, pretty)"),
    ("c", "copy the current line"),
    ("C", "copy marked lines"),
    ("h/F1", "this help"),
    ("q", "quit"),
];

pub(super) fn render_help(f: &mut Frame, area: Rect) {
    let lines: Vec<Line> = BINDINGS
        .iter()
        .map(|(key, what)| Line::from(format!(" {key:<12} {what}")))
        .collect();
    let width = (area.width.saturating_sub(4)).min(54);
    let height = (area.height.saturating_sub(2)).min(lines.len() as u16 + 2);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines)
            .style(Style::new().fg(Color::White).bg(Color::Black))
            .block(Block::default().borders(Borders::ALL).title(" keys ")),
        popup,
    );
}

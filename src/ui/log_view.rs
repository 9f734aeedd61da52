//! Scroll framing and row rendering.
//!
//! Each frame maps the buffer's committed cursor onto a screen row, walks
//! throwaway cursors up and down to fill the rows around it, and overlays
//! the detail panel for the current record. When the frame cannot be drawn
//! as requested (history shorter than the rows above the cursor, or a
//! detail panel that needs more room below) the cursor row moves one step
//! and a repaint is requested; retries converge because each step is
//! toward a fixed target and stops at the viewport edge.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use regex::Regex;
use unicode_width::UnicodeWidthStr;

use super::highlight;
use crate::app::App;
use crate::buffer::Record;
use crate::pretty;

/// Left edge of the detail panel.
const DETAIL_INDENT: usize = 24;
/// Screen row the cursor drifts toward while the detail panel is open.
const DETAIL_ANCHOR_ROW: usize = 5;
/// Object-valued tags longer than this get a pretty-printed expansion.
const TAG_EXPAND_THRESHOLD: usize = 40;

const TEAL: Color = Color::Indexed(30);
const ORANGE: Color = Color::Indexed(208);

fn base_style() -> Style {
    Style::new().fg(Color::White).bg(Color::Indexed(234))
}

/// Rows whose record does not match the active pattern.
fn nomatch_style() -> Style {
    Style::new().fg(Color::Indexed(246)).bg(Color::Indexed(232))
}

fn current_style() -> Style {
    Style::new().fg(Color::Black).bg(Color::White)
}

fn detail_style() -> Style {
    Style::new().fg(Color::White).bg(Color::Indexed(236))
}

pub(super) fn render_log_view(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = area.height as usize;
    let width = area.width as usize;
    if rows == 0 || width == 0 {
        return;
    }
    app.row = app.row.min(rows - 1);

    let now = Utc::now();
    let buffer = Arc::clone(&app.buffer);
    let pattern = app.pattern.clone();
    let current = buffer.get();

    // build the detail panel first so the cursor row can drift toward a
    // position where the panel fits below it
    let detail: Option<Vec<Line<'static>>> = match (&current, app.details) {
        (Some(record), d) if d > 0 => {
            let all = detail_lines(record, pattern.as_ref(), width, app.col, d, now);
            app.detail_offset = app.detail_offset.min(all.len().saturating_sub(1));
            Some(all.into_iter().skip(app.detail_offset).collect())
        }
        _ => None,
    };
    if let Some(visible) = &detail {
        let fit = rows.saturating_sub(1 + visible.len());
        let target = DETAIL_ANCHOR_ROW.min(rows - 1).min(fit);
        if app.row != target {
            if app.row < target {
                app.row += 1;
            } else {
                app.row -= 1;
            }
            app.refresh = true;
        }
    }
    let mut lines: Vec<Line<'static>> =
        (0..rows).map(|_| blank_line(base_style(), width)).collect();

    // rows above the cursor
    let mut cursor = buffer.cursor();
    for y in 1..=rows {
        if y > app.row {
            break;
        }
        match cursor.up() {
            Some(record) => {
                lines[app.row - y] =
                    record_line(&record, app.col, width, pattern.as_ref(), base_style(), now);
            }
            None => {
                // more rows above the cursor than history; reframe
                app.row -= 1;
                app.refresh = true;
                tracing::debug!(row = app.row, "repaint for better framing");
            }
        }
    }

    // rows below the cursor; rows past the tail stay blank
    let mut cursor = buffer.cursor();
    for y in 1..rows {
        let screen_y = app.row + y;
        if screen_y >= rows {
            break;
        }
        if let Some(record) = cursor.down() {
            lines[screen_y] =
                record_line(&record, app.col, width, pattern.as_ref(), base_style(), now);
        }
    }

    // the cursor row itself, plus the detail panel underneath it
    match current {
        Some(record) => {
            let spans = highlight::record_spans(&record, pattern.as_ref(), current_style(), now);
            let pad = highlight::row_base(&record, current_style());
            lines[app.row] = pad_to_width(clip_cols(spans, app.col), width, pad);
        }
        None => lines[app.row] = blank_line(current_style(), width),
    }
    if let Some(visible) = detail {
        for (i, line) in visible.into_iter().enumerate() {
            let y = app.row + 1 + i;
            if y >= rows {
                break;
            }
            lines[y] = line;
        }
    }

    f.render_widget(Paragraph::new(Text::from(lines)), area);
}

/// One log row: styled spans, horizontally clipped, padded to full width.
fn record_line(
    record: &Record,
    col: usize,
    width: usize,
    pattern: Option<&Regex>,
    base: Style,
    now: DateTime<Utc>,
) -> Line<'static> {
    let style = match pattern {
        Some(re) if !re.is_match(&record.text) => nomatch_style(),
        _ => base,
    };
    let spans = highlight::record_spans(record, pattern, style, now);
    let pad = highlight::row_base(record, style);
    pad_to_width(clip_cols(spans, col), width, pad)
}

/// The detail panel rows for the current record.
fn detail_lines(
    record: &Record,
    pattern: Option<&Regex>,
    width: usize,
    col: usize,
    details: u8,
    now: DateTime<Utc>,
) -> Vec<Line<'static>> {
    let style = detail_style();
    let summary = Span::styled(summary_text(record, now), style.fg(TEAL));
    let mut out = Vec::new();
    match details {
        1 => {
            out.push(detail_row(vec![summary], width, col, style));
            for (key, value) in &record.tags {
                let raw = value.to_string();
                let key_span = Span::styled(format!(" {key}: "), style.fg(ORANGE));
                if raw.len() > TAG_EXPAND_THRESHOLD && raw.starts_with('{') {
                    out.push(detail_row(vec![key_span], width, col, style));
                    if let Ok(pretty) = serde_json::to_string_pretty(value) {
                        let plines: Vec<&str> = pretty.lines().collect();
                        // skip the outer braces, one rendered row per line
                        for inner in &plines[1..plines.len().saturating_sub(1)] {
                            let mut spans = Vec::new();
                            highlight::highlight_into(
                                &mut spans,
                                &format!("    {inner}"),
                                pattern,
                                style,
                            );
                            out.push(detail_row(spans, width, col, style));
                        }
                    }
                } else {
                    let mut spans = vec![key_span];
                    highlight::highlight_into(&mut spans, &raw, pattern, style);
                    out.push(detail_row(spans, width, col, style));
                }
            }
        }
        _ => {
            for line in pretty::prettify(record.display_text()) {
                let mut spans = Vec::new();
                highlight::highlight_into(&mut spans, &format!(" {line}"), pattern, style);
                out.push(detail_row(spans, width, col, style));
            }
            out.push(detail_row(vec![summary], width, col, style));
        }
    }
    out
}

fn summary_text(record: &Record, now: DateTime<Utc>) -> String {
    let time = match record.time {
        Some(t) => highlight::format_time(t, now),
        None => "-".to_string(),
    };
    format!(" time: {}, level: {}", time, record.level.as_deref().unwrap_or("-"))
}

fn detail_row(spans: Vec<Span<'static>>, width: usize, col: usize, style: Style) -> Line<'static> {
    let mut all = vec![Span::styled(" ".repeat(DETAIL_INDENT), style)];
    all.extend(spans);
    pad_to_width(clip_cols(all, col), width, style)
}

/// Drop the first `col` characters across the span list (horizontal scroll).
fn clip_cols(spans: Vec<Span<'static>>, col: usize) -> Vec<Span<'static>> {
    if col == 0 {
        return spans;
    }
    let mut skip = col;
    let mut out = Vec::new();
    for span in spans {
        let chars = span.content.chars().count();
        if skip >= chars {
            skip -= chars;
            continue;
        }
        if skip > 0 {
            let kept: String = span.content.chars().skip(skip).collect();
            out.push(Span::styled(kept, span.style));
            skip = 0;
        } else {
            out.push(span);
        }
    }
    out
}

/// Extend the row to the full viewport width so its background fills the line.
fn pad_to_width(mut spans: Vec<Span<'static>>, width: usize, style: Style) -> Line<'static> {
    let used: usize = spans.iter().map(|s| s.content.width()).sum();
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), style));
    }
    Line::from(spans)
}

fn blank_line(style: Style, width: usize) -> Line<'static> {
    Line::from(Span::styled(" ".repeat(width), style))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn draw_until_settled(app: &mut App, width: u16, height: u16) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        for _ in 0..height as usize + 2 {
            app.refresh = false;
            terminal
                .draw(|f| crate::ui::render(f, app))
                .unwrap();
            if !app.refresh {
                break;
            }
        }
        terminal
    }

    fn row_text(terminal: &Terminal<TestBackend>, y: u16) -> String {
        let buf = terminal.backend().buffer();
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    fn app_with_lines(count: usize) -> App {
        let buffer = Arc::new(Buffer::default());
        for i in 0..count {
            buffer.append(&format!("line {i}"));
        }
        App::new(buffer)
    }

    #[test]
    fn test_framing_converges_for_any_geometry() {
        for height in 3..12u16 {
            for depth in 0..8usize {
                let mut app = app_with_lines(depth);
                app.row = height as usize; // deliberately out of range
                draw_until_settled(&mut app, 40, height);
                assert!(
                    app.row <= height as usize - 2,
                    "row {} escaped the viewport (h {height}, depth {depth})",
                    app.row
                );
                assert!(app.row <= depth, "row {} exceeds history {depth}", app.row);
                assert!(!app.refresh, "framing did not settle (h {height}, depth {depth})");
            }
        }
    }

    #[test]
    fn test_rows_render_around_the_cursor() {
        let mut app = app_with_lines(5);
        app.buffer.set_position(2);
        app.row = 2;
        let terminal = draw_until_settled(&mut app, 30, 8);
        assert!(row_text(&terminal, 0).contains("line 0"));
        assert!(row_text(&terminal, 2).contains("line 2"));
        assert!(row_text(&terminal, 4).contains("line 4"));
        // nothing below the tail
        assert_eq!(row_text(&terminal, 5).trim(), "");
    }

    #[test]
    fn test_horizontal_scroll_clips_rows() {
        let mut app = app_with_lines(1);
        app.buffer.set_position(0);
        app.row = 0;
        app.col = 20;
        let terminal = draw_until_settled(&mut app, 30, 4);
        assert!(!row_text(&terminal, 0).contains("line 0"));
    }

    #[test]
    fn test_detail_panel_converges_when_it_overflows() {
        let buffer = Arc::new(Buffer::default());
        for _ in 0..10 {
            buffer.append(r#"{"message":"m","a":1,"b":2,"c":3,"d":4,"e":5}"#);
        }
        let mut app = App::new(buffer);
        app.buffer.set_position(5);
        app.details = 1;
        app.row = 4;
        draw_until_settled(&mut app, 60, 6);
        assert!(app.row <= 4);
        assert!(!app.refresh);
    }

    #[test]
    fn test_clip_cols_spans() {
        let spans = vec![
            Span::raw("abc"),
            Span::raw("defg"),
        ];
        let clipped = clip_cols(spans, 4);
        let text: String = clipped.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "efg");
        assert!(clip_cols(vec![Span::raw("ab")], 5).is_empty());
    }

    #[test]
    fn test_pad_to_width_fills_line() {
        let line = pad_to_width(vec![Span::raw("ab")], 5, Style::default());
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "ab   ");
    }

    #[test]
    fn test_detail_lines_tag_view() {
        let record = crate::parse::parse_record(r#"{"message":"m","user":"alice","n":7}"#);
        let lines = detail_lines(&record, None, 80, 0, 1, Utc::now());
        let texts: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(texts[0].contains("time: -, level: -"));
        assert!(texts.iter().any(|t| t.contains("n: 7")));
        assert!(texts.iter().any(|t| t.contains("user: \"alice\"")));
    }

    #[test]
    fn test_detail_lines_expand_large_objects() {
        let record = crate::parse::parse_record(
            r#"{"payload":{"alpha":"one","beta":"two","gamma":"three"}}"#,
        );
        let lines = detail_lines(&record, None, 120, 0, 1, Utc::now());
        let texts: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        // outer braces skipped, one row per inner line
        assert!(texts.iter().any(|t| t.trim_end().ends_with("payload:")));
        assert!(texts.iter().any(|t| t.contains("\"alpha\": \"one\"")));
        assert!(!texts.iter().any(|t| t.trim() == "{"));
    }

    #[test]
    fn test_detail_lines_pretty_view_ends_with_summary() {
        let record = crate::parse::parse_record(r#"{"message":"hello world","level":"info"}"#);
        let lines = detail_lines(&record, None, 80, 0, 2, Utc::now());
        let last: String = lines
            .last()
            .unwrap()
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(last.contains("level: info"));
    }
}

//! Span construction for log rows: per-character styling, keyword and
//! search-pattern highlighting, severity colors and timestamp formatting.

use std::sync::OnceLock;

use chrono::{DateTime, Duration, Utc};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use regex::Regex;

use crate::buffer::Record;

/// Foreground for the always-on keyword highlight.
const KEYWORD_FG: Color = Color::Indexed(173);
/// Foreground for user search matches; the outer highlight layer.
const SEARCH_FG: Color = Color::Indexed(87);
/// Glyph color for tab/newline placeholders.
const GLYPH_FG: Color = Color::Indexed(220);
/// Timestamp color in log rows.
const TIME_FG: Color = Color::Indexed(246);
/// Background for marked rows.
const MARK_BG: Color = Color::Indexed(52);

/// Built-in alert keywords, matched whole-word and case-insensitively.
fn keyword_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(error|err|panic|close|closed|invalid)\b")
            .expect("keyword pattern is valid")
    })
}

fn is_structural(ch: char) -> bool {
    matches!(
        ch,
        '"' | '\'' | '(' | '{' | '}' | ')' | ',' | ':' | '[' | ']' | '/'
    )
}

/// Append `text` as styled spans. Structural punctuation renders dim when
/// `dim_punct` is set; tab and newline render as visible glyphs either way.
pub fn push_styled(out: &mut Vec<Span<'static>>, text: &str, style: Style, dim_punct: bool) {
    let mut run = String::new();
    let mut run_style = style;
    for ch in text.chars() {
        let (piece, piece_style) = match ch {
            '\t' => ('⇥', style.fg(GLYPH_FG).add_modifier(Modifier::BOLD)),
            '\n' => ('␍', style.fg(GLYPH_FG).add_modifier(Modifier::BOLD)),
            c if dim_punct && is_structural(c) => (c, style.add_modifier(Modifier::DIM)),
            c => (c, style),
        };
        if piece_style != run_style && !run.is_empty() {
            out.push(Span::styled(std::mem::take(&mut run), run_style));
        }
        run_style = piece_style;
        run.push(piece);
    }
    if !run.is_empty() {
        out.push(Span::styled(run, run_style));
    }
}

/// Highlight `text` into spans. The user pattern, when present, is the outer
/// layer; the built-in keyword highlight applies to the unmatched remainder.
pub fn highlight_into(
    out: &mut Vec<Span<'static>>,
    text: &str,
    pattern: Option<&Regex>,
    base: Style,
) {
    match pattern {
        Some(re) => {
            let hi = base.fg(SEARCH_FG).add_modifier(Modifier::BOLD);
            split_matches(out, text, re, hi, base, &keyword_layer);
        }
        None => keyword_layer(out, text, base),
    }
}

fn keyword_layer(out: &mut Vec<Span<'static>>, text: &str, base: Style) {
    let plain = |out: &mut Vec<Span<'static>>, seg: &str, style: Style| {
        push_styled(out, seg, style, true);
    };
    split_matches(out, text, keyword_regex(), base.fg(KEYWORD_FG), base, &plain);
}

/// Walk every match of `re`, rendering matches with `hi` and handing the
/// segments between them to `rest`.
fn split_matches(
    out: &mut Vec<Span<'static>>,
    text: &str,
    re: &Regex,
    hi: Style,
    base: Style,
    rest: &dyn Fn(&mut Vec<Span<'static>>, &str, Style),
) {
    let mut remaining = text;
    while let Some(m) = re.find(remaining) {
        if m.end() == m.start() {
            break; // zero-width match, nothing sensible to paint
        }
        rest(out, &remaining[..m.start()], base);
        push_styled(out, &remaining[m.start()..m.end()], hi, true);
        remaining = &remaining[m.end()..];
    }
    rest(out, remaining, base);
}

fn level_color(level: &str) -> Option<Color> {
    match level.to_ascii_lowercase().as_str() {
        "debug" => Some(Color::Indexed(66)),
        "info" => Some(Color::Indexed(116)),
        "notice" => Some(Color::White),
        "warn" => Some(Color::Yellow),
        "error" => Some(Color::Red),
        _ => None,
    }
}

pub fn level_label(level: &str) -> &str {
    match level.to_ascii_lowercase().as_str() {
        "debug" => "dbg",
        "info" => "inf",
        "notice" => "ntc",
        "warn" => "WRN",
        "error" => "ERR",
        _ => level,
    }
}

/// Luminance check for the level color: against a bright background the
/// color moves to the background role so the label stays legible.
fn is_bright(bg: Option<Color>) -> bool {
    match bg {
        Some(Color::Rgb(r, g, b)) => r as u16 + g as u16 + b as u16 > 200,
        Some(Color::White) => true,
        _ => false,
    }
}

/// The severity label span. Unrecognized levels render literally with no
/// special color.
pub fn level_span(level: &str, base: Style) -> Span<'static> {
    let label = level_label(level).to_string();
    match level_color(level) {
        Some(color) => {
            let style = if is_bright(base.bg) {
                base.bg(color)
            } else {
                base.fg(color)
            };
            Span::styled(label, style)
        }
        None => Span::styled(label, base),
    }
}

/// Age-adaptive UTC timestamp: time-of-day for fresh records, coarser
/// formats the older the record gets.
pub fn format_time(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = (now - time).abs();
    if age < Duration::hours(70) {
        time.format("%H:%M:%S%.3f").to_string()
    } else if age < Duration::days(10) {
        time.format("%m-%d %H:%M:").to_string()
    } else {
        time.format("%y-%m-%d %H:").to_string()
    }
}

/// One full log row: optional timestamp, severity label, then the message
/// body with highlight layers applied.
pub fn record_spans(
    record: &Record,
    pattern: Option<&Regex>,
    base: Style,
    now: DateTime<Utc>,
) -> Vec<Span<'static>> {
    let base = row_base(record, base);
    let mut out = Vec::new();
    if let Some(time) = record.time {
        out.push(Span::styled(format_time(time, now), base.fg(TIME_FG)));
        out.push(Span::styled(" ", base));
    }
    if let Some(level) = &record.level {
        out.push(level_span(level, base));
    }
    out.push(Span::styled(" ", base));
    highlight_into(&mut out, record.display_text(), pattern, base);
    out
}

/// Row background for a record: marked rows carry the mark color no matter
/// what base style the framing chose.
pub fn row_base(record: &Record, base: Style) -> Style {
    if record.marked {
        base.bg(MARK_BG)
    } else {
        base
    }
}

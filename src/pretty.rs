//! Pretty-printing for the detail panel: expands embedded JSON and
//! soft-wraps long lines so a message body fits a readable column.

use serde_json::Value;

/// Soft wrap column for prose lines.
const WRAP_WIDTH: usize = 80;
/// Placeholder for embedded newlines; restored per line at the end so the
/// renderer can show them as a visible glyph.
const NEWLINE_MARK: char = '\u{240D}'; // ␍

/// Split a message into display lines: any embedded JSON object is expanded
/// to an indented form, and overlong prose is wrapped at word boundaries.
pub fn prettify(text: &str) -> Vec<String> {
    let mut s: String = text.replace('\n', &format!("{NEWLINE_MARK}\n"));

    if let (Some(start), Some(end)) = (s.find('{'), s.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&s[start..=end]) {
                if let Ok(pretty) = serde_json::to_string_pretty(&value) {
                    s = format!("{}{}{}", &s[..start], pretty, &s[end + 1..]);
                }
            }
        }
    }

    let mut lines = Vec::new();
    for line in s.split('\n') {
        for wrapped in wrap_line(line, WRAP_WIDTH) {
            lines.push(wrapped.replace(NEWLINE_MARK, "\n"));
        }
    }
    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Break a line at the first space at or after `width` characters, repeating
/// until the remainder fits. A line with no break point stays whole.
fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = line;
    loop {
        if rest.chars().count() <= width {
            out.push(rest.to_string());
            return out;
        }
        let cut = rest
            .char_indices()
            .nth(width)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        match rest[cut..].find(' ') {
            Some(offset) => {
                out.push(rest[..cut + offset].trim_end().to_string());
                rest = rest[cut + offset..].trim_start_matches(' ');
            }
            None => {
                out.push(rest.to_string());
                return out;
            }
        }
    }
}

//! Raw line to [`Record`] conversion.
//!
//! Lines that do not look like JSON objects pass through as opaque text.
//! Structured lines get their message/time/level fields pulled out of the
//! tag map; anything that fails to decode degrades gracefully instead of
//! dropping the line.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::buffer::Record;

/// Message field names, checked in priority order across known schemas.
const MESSAGE_KEYS: &[&str] = &["message", "msg"];
const TIME_KEY: &str = "time";
const LEVEL_KEY: &str = "level";

/// Parse one raw line into a record.
pub fn parse_record(text: &str) -> Record {
    let mut record = Record {
        text: text.to_string(),
        ..Record::default()
    };
    if !text.starts_with('{') {
        return record;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => {
            record.tags = map.into_iter().collect();
        }
        Ok(_) | Err(_) => {
            tracing::debug!(line = %text, "line looks structured but does not decode");
            return record;
        }
    }

    for key in MESSAGE_KEYS {
        if let Some(value) = record.tags.remove(*key) {
            record.short = Some(string_or_json(value));
            break;
        }
    }

    if let Some(value) = record.tags.get(TIME_KEY) {
        match parse_time(value) {
            Some(time) => {
                record.time = Some(time);
                record.tags.remove(TIME_KEY);
            }
            // unparsable timestamps stay visible as a plain tag
            None => tracing::debug!(value = %value, "unparsable time field"),
        }
    }

    if matches!(record.tags.get(LEVEL_KEY), Some(Value::String(_))) {
        if let Some(Value::String(level)) = record.tags.remove(LEVEL_KEY) {
            record.level = Some(level);
        }
    }

    record
}

/// A JSON string becomes its contents; anything else keeps its JSON form.
fn string_or_json(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Accept an RFC 3339 timestamp or an integer epoch-seconds value.
fn parse_time(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_line_stays_opaque() {
        let r = parse_record("plain text line");
        assert_eq!(r.text, "plain text line");
        assert!(r.short.is_none());
        assert!(r.tags.is_empty());
        assert!(r.time.is_none());
        assert!(r.level.is_none());
    }

    #[test]
    fn test_structured_line_extraction() {
        let r = parse_record(
            r#"{"message":"hello","level":"warn","time":"2024-01-01T00:00:00Z","x":1}"#,
        );
        assert_eq!(r.short.as_deref(), Some("hello"));
        assert_eq!(r.level.as_deref(), Some("warn"));
        assert!(r.time.is_some());
        assert_eq!(r.tags.len(), 1);
        assert_eq!(r.tags.get("x"), Some(&json!(1)));
    }

    #[test]
    fn test_malformed_json_degrades_to_text() {
        let r = parse_record(r#"{"message": unterminated"#);
        assert_eq!(r.text, r#"{"message": unterminated"#);
        assert!(r.tags.is_empty());
        assert!(r.short.is_none());
    }

    #[test]
    fn test_msg_is_fallback_message_key() {
        let r = parse_record(r#"{"msg":"short form"}"#);
        assert_eq!(r.short.as_deref(), Some("short form"));
        let r = parse_record(r#"{"message":"wins","msg":"loses"}"#);
        assert_eq!(r.short.as_deref(), Some("wins"));
        assert_eq!(r.tags.get("msg"), Some(&json!("loses")));
    }

    #[test]
    fn test_non_string_message_keeps_json_form() {
        let r = parse_record(r#"{"message":{"a":1}}"#);
        assert_eq!(r.short.as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_epoch_seconds_time() {
        let r = parse_record(r#"{"message":"x","time":1704067200}"#);
        assert_eq!(
            r.time.unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert!(r.tags.is_empty());
    }

    #[test]
    fn test_bad_time_stays_in_tags() {
        let r = parse_record(r#"{"time":"yesterday-ish"}"#);
        assert!(r.time.is_none());
        assert_eq!(r.tags.get("time"), Some(&json!("yesterday-ish")));
    }

    #[test]
    fn test_non_string_level_stays_in_tags() {
        let r = parse_record(r#"{"level":3}"#);
        assert!(r.level.is_none());
        assert_eq!(r.tags.get("level"), Some(&json!(3)));
    }

    #[test]
    fn test_tags_sorted_by_key() {
        let r = parse_record(r#"{"zeta":1,"alpha":2,"mid":3}"#);
        let keys: Vec<_> = r.tags.keys().cloned().collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }
}

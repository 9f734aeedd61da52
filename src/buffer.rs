//! Append-only record buffer shared between the ingest thread and the UI.
//!
//! The buffer owns a single committed cursor position (`pos`). The range of
//! `pos` is `[0, len]` inclusive: `pos == len` is the tail sentinel, meaning
//! "follow the newest record". Appends while at the tail advance `pos` so the
//! view stays pinned to incoming data; appends anywhere else leave `pos`
//! alone so the user is never yanked away from history they are reading.
//!
//! All reads and writes of records and `pos` go through one mutex. The
//! renderer never holds it across a repaint: it uses a throwaway [`Cursor`]
//! that re-locks per step, so ingest is only ever blocked for the duration
//! of a single record read.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::parse;

/// One ingested log line. Immutable after append except for `marked`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// The raw line, byte for byte (minus the trailing newline).
    pub text: String,
    /// Extracted human message, preferred over `text` for display.
    pub short: Option<String>,
    /// Remaining structured fields, sorted by key.
    pub tags: BTreeMap<String, Value>,
    /// Parsed timestamp, when the line carried a recognizable one.
    pub time: Option<DateTime<Utc>>,
    /// Free-text severity label.
    pub level: Option<String>,
    /// User mark, the only field that changes after append.
    pub marked: bool,
}

impl Record {
    /// Body shown in the log view: the extracted message when present.
    pub fn display_text(&self) -> &str {
        self.short.as_deref().unwrap_or(&self.text)
    }
}

#[derive(Default)]
struct BufferInner {
    records: Vec<Record>,
    pos: usize,
}

/// Thread-safe append-only collection of records plus the committed cursor.
#[derive(Default)]
pub struct Buffer {
    inner: Mutex<BufferInner>,
    revision: AtomicU64,
}

impl Buffer {
    /// Parse `raw` and append it. In tail mode the cursor follows the append.
    pub fn append(&self, raw: &str) {
        let record = parse::parse_record(raw);
        let mut inner = self.inner.lock().unwrap();
        if inner.pos == inner.records.len() {
            inner.pos += 1;
        }
        inner.records.push(record);
        drop(inner);
        self.revision.fetch_add(1, Ordering::Relaxed);
    }

    /// Append an already-built record without touching the cursor.
    /// Used by the filter transform when deriving a new buffer.
    pub fn append_record(&self, record: Record) {
        self.inner.lock().unwrap().records.push(record);
    }

    /// Monotonic change counter, readable without the record lock. The run
    /// loop compares it against the last repainted value to decide whether
    /// anything new arrived.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The committed cursor position, `[0, len]`.
    pub fn position(&self) -> usize {
        self.inner.lock().unwrap().pos
    }

    /// Move the committed cursor, clamped to `[0, len]`.
    pub fn set_position(&self, pos: usize) {
        let mut inner = self.inner.lock().unwrap();
        inner.pos = pos.min(inner.records.len());
    }

    /// The record under the cursor. `None` when the buffer is empty or the
    /// cursor sits at the tail sentinel.
    pub fn get(&self) -> Option<Record> {
        let inner = self.inner.lock().unwrap();
        inner.records.get(inner.pos).cloned()
    }

    /// The record at an arbitrary index.
    pub fn at(&self, index: usize) -> Option<Record> {
        self.inner.lock().unwrap().records.get(index).cloned()
    }

    /// Toggle the mark on the record under the cursor. No-op at the tail
    /// sentinel or on an empty buffer.
    pub fn toggle_mark(&self) {
        let mut inner = self.inner.lock().unwrap();
        let pos = inner.pos;
        if let Some(record) = inner.records.get_mut(pos) {
            record.marked = !record.marked;
        }
    }

    /// Step the cursor one record toward the head.
    pub fn up(&self) -> Option<Record> {
        self.up_until(|_| true)
    }

    /// Step the cursor one record toward the tail.
    pub fn down(&self) -> Option<Record> {
        self.down_until(|_| true)
    }

    /// Scan toward the head until `pred` matches. Hitting the head without a
    /// match clamps to record 0 and reports that record as found; the head is
    /// always a landing spot. Returns `None` only when already at 0.
    pub fn up_until(&self, mut pred: impl FnMut(&Record) -> bool) -> Option<Record> {
        let mut inner = self.inner.lock().unwrap();
        if inner.pos == 0 {
            return None;
        }
        let mut p = inner.pos;
        loop {
            p -= 1;
            if p == 0 {
                inner.pos = 0;
                return inner.records.first().cloned();
            }
            if pred(&inner.records[p]) {
                inner.pos = p;
                return Some(inner.records[p].clone());
            }
        }
    }

    /// Scan toward the tail until `pred` matches. Running off the end parks
    /// the cursor on the tail sentinel and reports `None`, so the caller can
    /// tell "found" from "ran out of records".
    pub fn down_until(&self, mut pred: impl FnMut(&Record) -> bool) -> Option<Record> {
        let mut inner = self.inner.lock().unwrap();
        if inner.records.is_empty() || inner.pos >= inner.records.len() {
            return None;
        }
        let mut p = inner.pos;
        loop {
            p += 1;
            if p >= inner.records.len() {
                inner.pos = p;
                return None;
            }
            if pred(&inner.records[p]) {
                inner.pos = p;
                return Some(inner.records[p].clone());
            }
        }
    }

    /// Visit every record under the lock. The visitor may mutate marks and
    /// may stop early by returning `false`.
    pub fn for_each(&self, mut visit: impl FnMut(usize, &mut Record) -> bool) {
        let mut inner = self.inner.lock().unwrap();
        for (i, record) in inner.records.iter_mut().enumerate() {
            if !visit(i, record) {
                return;
            }
        }
    }

    /// Derive a new buffer holding only the records whose mark equals `keep`,
    /// marks cleared on the copies. The cursor lands on the surviving current
    /// record, or on whatever followed it. Returns `None` when nothing
    /// matches; a filter that would display nothing is a no-op for callers.
    pub fn filtered(&self, keep: bool) -> Option<Buffer> {
        let inner = self.inner.lock().unwrap();
        let mut records = Vec::new();
        let mut pos = 0;
        for (i, record) in inner.records.iter().enumerate() {
            if i == inner.pos {
                pos = records.len();
            }
            if record.marked == keep {
                let mut copy = record.clone();
                copy.marked = false;
                records.push(copy);
            }
        }
        if records.is_empty() {
            return None;
        }
        Some(Buffer {
            inner: Mutex::new(BufferInner { records, pos }),
            revision: AtomicU64::new(0),
        })
    }

    /// A speculative cursor starting from the committed position.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor {
            buffer: self,
            at: self.position(),
        }
    }
}

/// A detachable trial position over a [`Buffer`]. Moves never touch the
/// committed `pos` until [`Cursor::commit`]; the renderer uses throwaway
/// cursors to look up neighboring records without disturbing navigation.
pub struct Cursor<'a> {
    buffer: &'a Buffer,
    at: usize,
}

impl Cursor<'_> {
    pub fn up(&mut self) -> Option<Record> {
        self.up_until(|_| true)
    }

    pub fn down(&mut self) -> Option<Record> {
        self.down_until(|_| true)
    }

    /// Same clamp policy as [`Buffer::up_until`], moving only this cursor.
    pub fn up_until(&mut self, mut pred: impl FnMut(&Record) -> bool) -> Option<Record> {
        let inner = self.buffer.inner.lock().unwrap();
        if self.at == 0 {
            return None;
        }
        let mut p = self.at.min(inner.records.len());
        loop {
            p -= 1;
            if p == 0 {
                self.at = 0;
                return inner.records.first().cloned();
            }
            if pred(&inner.records[p]) {
                self.at = p;
                return Some(inner.records[p].clone());
            }
        }
    }

    /// Same end-of-buffer policy as [`Buffer::down_until`].
    pub fn down_until(&mut self, mut pred: impl FnMut(&Record) -> bool) -> Option<Record> {
        let inner = self.buffer.inner.lock().unwrap();
        let size = inner.records.len();
        if size == 0 || self.at >= size {
            return None;
        }
        let mut p = self.at;
        loop {
            p += 1;
            if p >= size {
                self.at = p;
                return None;
            }
            if pred(&inner.records[p]) {
                self.at = p;
                return Some(inner.records[p].clone());
            }
        }
    }

    /// Store the trial position back as the buffer's committed cursor.
    pub fn commit(self) {
        self.buffer.set_position(self.at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(needle: &'static str) -> impl FnMut(&Record) -> bool {
        move |r| r.text.contains(needle)
    }

    #[test]
    fn test_empty_buffer_moves_are_noops() {
        let b = Buffer::default();
        assert!(b.down().is_none());
        assert!(b.up().is_none());
        assert!(b.down().is_none());
        assert!(b.up().is_none());
        assert_eq!(b.position(), 0);
        assert!(b.get().is_none());
    }

    #[test]
    fn test_tail_follow_on_append() {
        let b = Buffer::default();
        b.append("one");
        assert_eq!(b.position(), 1); // was in tail mode, followed
        b.append("two");
        b.append("three");
        assert_eq!(b.position(), 3); // still following
    }

    #[test]
    fn test_append_outside_tail_mode_keeps_position() {
        let b = Buffer::default();
        b.append("one");
        b.up(); // pos 0, reading history now
        assert_eq!(b.position(), 0);
        b.append("two");
        assert_eq!(b.position(), 0);
    }

    #[test]
    fn test_up_clamps_at_head() {
        let b = Buffer::default();
        b.append("one");
        assert!(b.down().is_none()); // already at tail
        assert_eq!(b.position(), 1);
        assert!(b.up().is_some());
        assert_eq!(b.position(), 0);
        assert!(b.up().is_none()); // already at head, no movement
        assert_eq!(b.position(), 0);
    }

    #[test]
    fn test_predicate_scans() {
        let b = Buffer::default();
        b.append("one");
        b.up(); // leave tail mode before the rest arrive
        b.append("two");
        b.append("three foo");
        b.append("four foo");
        b.append("five bar");
        b.append("six");
        assert_eq!(b.position(), 0);

        assert!(b.down_until(contains("foo")).is_some());
        assert_eq!(b.position(), 2);
        assert!(b.down_until(contains("foo")).is_some());
        assert_eq!(b.position(), 3);
        assert!(b.down_until(contains("bar")).is_some());
        assert_eq!(b.position(), 4);
        assert!(b.up_until(contains("foo")).is_some());
        assert_eq!(b.position(), 3);
        // no match above: clamps to the head and reports record 0
        assert!(b.up_until(contains("none")).is_some());
        assert_eq!(b.position(), 0);
    }

    #[test]
    fn test_down_without_match_parks_at_tail() {
        let b = Buffer::default();
        b.append("one");
        b.up();
        b.append("two");
        b.append("three");
        assert!(b.down_until(contains("nothing")).is_none());
        assert_eq!(b.position(), 3); // tail sentinel
        assert!(b.get().is_none());
    }

    #[test]
    fn test_toggle_mark() {
        let b = Buffer::default();
        b.append("one");
        b.toggle_mark(); // pos is at the tail sentinel: no-op
        assert!(!b.at(0).unwrap().marked);
        b.up();
        b.toggle_mark();
        assert!(b.at(0).unwrap().marked);
        b.toggle_mark();
        assert!(!b.at(0).unwrap().marked);
    }

    #[test]
    fn test_revision_counts_appends() {
        let b = Buffer::default();
        let r0 = b.revision();
        b.append("one");
        b.append("two");
        assert_eq!(b.revision(), r0 + 2);
    }

    #[test]
    fn test_cursor_is_speculative_until_commit() {
        let b = Buffer::default();
        for t in ["a", "b", "c", "d"] {
            b.append(t);
        }
        b.set_position(3);
        let mut c = b.cursor();
        assert_eq!(c.up().unwrap().text, "c");
        assert_eq!(c.up().unwrap().text, "b");
        assert_eq!(b.position(), 3); // committed position untouched
        c.commit();
        assert_eq!(b.position(), 1);
    }

    #[test]
    fn test_cursor_down_stops_at_tail() {
        let b = Buffer::default();
        b.append("a");
        b.append("b");
        b.set_position(0);
        let mut c = b.cursor();
        assert_eq!(c.down().unwrap().text, "b");
        assert!(c.down().is_none());
        assert!(c.down().is_none());
        assert_eq!(b.position(), 0);
    }

    #[test]
    fn test_filtered_keeps_current_record() {
        let b = Buffer::default();
        for t in ["a", "b", "c", "d"] {
            b.append(t);
        }
        b.set_position(2);
        b.for_each(|i, r| {
            r.marked = i % 2 == 0; // mark a and c
            true
        });
        let f = b.filtered(true).unwrap();
        assert_eq!(f.len(), 2);
        assert_eq!(f.at(0).unwrap().text, "a");
        assert_eq!(f.at(1).unwrap().text, "c");
        assert!(!f.at(0).unwrap().marked); // marks cleared on copy
        assert_eq!(f.position(), 1); // "c" was current, stays current
    }

    #[test]
    fn test_filtered_current_dropped_lands_on_successor() {
        let b = Buffer::default();
        for t in ["a", "b", "c"] {
            b.append(t);
        }
        b.set_position(1); // "b", unmarked
        b.for_each(|i, r| {
            r.marked = i != 1;
            true
        });
        let f = b.filtered(true).unwrap();
        assert_eq!(f.at(f.position()).unwrap().text, "c");
    }

    #[test]
    fn test_filtered_empty_result_rejected() {
        let b = Buffer::default();
        b.append("a");
        b.append("b");
        assert!(b.filtered(true).is_none()); // nothing marked
        assert!(b.filtered(false).is_some());
    }

    #[test]
    fn test_for_each_early_stop() {
        let b = Buffer::default();
        for t in ["a", "b", "c"] {
            b.append(t);
        }
        let mut seen = 0;
        b.for_each(|i, _| {
            seen += 1;
            i < 1
        });
        assert_eq!(seen, 2);
    }
}

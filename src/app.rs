//! Application context and state transitions.
//!
//! `App` owns everything the render pass and the key handlers need: the
//! origin buffer fed by ingest, the currently viewed buffer (which may be a
//! derived filter of the origin), the cursor's screen row, and the
//! search/query state machine. `apply_event` is the single place state
//! changes happen.

use std::sync::Arc;
use std::time::{Duration, Instant};

use regex::Regex;

use crate::buffer::{Buffer, Record};
use crate::clipboard;
use crate::event::AppEvent;
use crate::query::QueryHistory;

/// Records stepped per PageUp/PageDown.
const PAGE_STEP: usize = 25;
/// Columns scrolled per Left/Right.
const COL_STRIDE: usize = 20;
/// Detail panel rows scrolled per page key while the panel is open.
const DETAIL_STEP: usize = 5;
/// How long transient status messages stay on the status line.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// What kind of query the editor is collecting. Only free-text search
/// exists today; the discriminator leaves room for more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Nav,
    Query(QueryKind),
}

pub struct App {
    /// The buffer ingest appends to. Never replaced.
    pub origin: Arc<Buffer>,
    /// The buffer currently on screen; equals `origin` unless filtered.
    pub buffer: Arc<Buffer>,
    /// Screen row of the cursor record, kept in `[0, height - 2]`.
    pub row: usize,
    /// Horizontal scroll offset in columns.
    pub col: usize,
    /// Detail level for the current record: 0 none, 1 tags, 2 pretty.
    pub details: u8,
    /// Rows scrolled off the top of the open detail panel.
    pub detail_offset: usize,
    /// Terminal height from the most recent render.
    pub height: usize,
    /// Active search pattern; persists after leaving query mode.
    pub pattern: Option<Regex>,
    pub mode: InputMode,
    pub history: QueryHistory,
    pub show_help: bool,
    pub should_quit: bool,
    /// Raised when the next frame must repaint regardless of buffer
    /// changes (resize, reframing retry).
    pub refresh: bool,
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(origin: Arc<Buffer>) -> Self {
        Self {
            buffer: Arc::clone(&origin),
            origin,
            row: 0,
            col: 0,
            details: 0,
            detail_offset: 0,
            height: 24,
            pattern: None,
            mode: InputMode::Nav,
            history: QueryHistory::default(),
            show_help: false,
            should_quit: false,
            refresh: true,
            status_message: None,
        }
    }

    pub fn is_query_mode(&self) -> bool {
        matches!(self.mode, InputMode::Query(_))
    }

    /// True while viewing a derived (filtered) buffer.
    pub fn is_filtered(&self) -> bool {
        !Arc::ptr_eq(&self.buffer, &self.origin)
    }

    /// Largest usable cursor row; the last row belongs to the status line.
    pub fn max_row(&self) -> usize {
        self.height.saturating_sub(2)
    }

    /// The transient status message, if it has not expired yet.
    pub fn active_status_message(&self) -> Option<&str> {
        self.status_message
            .as_ref()
            .filter(|(_, at)| at.elapsed() < STATUS_MESSAGE_TTL)
            .map(|(msg, _)| msg.as_str())
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::CursorUp => {
                self.detail_offset = 0;
                let _ = self.buffer.up();
                self.row = self.row.saturating_sub(1);
            }
            AppEvent::CursorDown => {
                self.detail_offset = 0;
                let _ = self.buffer.down();
                if self.row < self.max_row() {
                    self.row += 1;
                }
            }
            AppEvent::PageUp => {
                if self.details > 0 {
                    self.detail_offset = self.detail_offset.saturating_sub(DETAIL_STEP);
                } else {
                    let mut cursor = self.buffer.cursor();
                    for _ in 0..PAGE_STEP {
                        if cursor.up().is_none() {
                            break;
                        }
                    }
                    cursor.commit();
                    self.row = self.row.saturating_sub(PAGE_STEP);
                }
                self.refresh = true;
            }
            AppEvent::PageDown => {
                if self.details > 0 {
                    self.detail_offset += DETAIL_STEP;
                } else {
                    let mut cursor = self.buffer.cursor();
                    for _ in 0..PAGE_STEP {
                        if cursor.down().is_none() {
                            break;
                        }
                    }
                    cursor.commit();
                    self.row = (self.row + PAGE_STEP).min(self.max_row());
                }
                self.refresh = true;
            }
            AppEvent::JumpHead => {
                self.buffer.set_position(0);
                self.row = 0;
            }
            AppEvent::Follow => {
                let len = self.buffer.len();
                self.buffer.set_position(len);
                self.row = self.max_row().min(len);
            }
            AppEvent::ScrollLeft => self.col = self.col.saturating_sub(COL_STRIDE),
            AppEvent::ScrollRight => self.col += COL_STRIDE,
            AppEvent::NextMatch => {
                self.detail_offset = 0;
                let pattern = self.pattern.clone();
                let mut row = self.row;
                let limit = self.max_row();
                self.buffer.down_until(|record| {
                    if row < limit {
                        row += 1;
                    }
                    is_target(record, pattern.as_ref())
                });
                self.row = row;
            }
            AppEvent::PrevMatch => {
                self.detail_offset = 0;
                let pattern = self.pattern.clone();
                let mut row = self.row;
                self.buffer.up_until(|record| {
                    row = row.saturating_sub(1);
                    is_target(record, pattern.as_ref())
                });
                self.row = row;
            }
            AppEvent::ToggleMark => {
                if self.buffer.get().is_some() {
                    self.buffer.toggle_mark();
                    let _ = self.buffer.down();
                    if self.row < self.max_row() {
                        self.row += 1;
                    }
                }
            }
            AppEvent::UnmarkAll => {
                self.buffer.for_each(|_, record| {
                    record.marked = false;
                    true
                });
            }
            AppEvent::MarkMatches => {
                if let Some(pattern) = self.pattern.take() {
                    self.buffer.for_each(|_, record| {
                        if pattern.is_match(&record.text) {
                            record.marked = true;
                        }
                        true
                    });
                    // the marks are the durable artifact; the pattern is spent
                }
            }
            AppEvent::FilterMarked => self.apply_filter(true),
            AppEvent::FilterUnmarked => self.apply_filter(false),
            AppEvent::RestoreOrigin => {
                self.detail_offset = 0;
                self.buffer = Arc::clone(&self.origin);
                self.pattern = None;
            }
            AppEvent::CycleDetail => {
                self.detail_offset = 0;
                self.details = (self.details + 1) % 3;
            }
            AppEvent::ShowHelp => self.show_help = true,
            AppEvent::HideHelp => self.show_help = false,
            AppEvent::StartSearch => {
                self.mode = InputMode::Query(QueryKind::Search);
                self.history.fresh_entry();
                self.recompile_pattern();
            }
            AppEvent::QueryChar(ch) => {
                self.history.current_mut().insert(ch);
                self.recompile_pattern();
            }
            AppEvent::QueryBackspace => {
                self.history.current_mut().backspace();
                self.recompile_pattern();
            }
            AppEvent::QueryCaretLeft => self.history.current_mut().caret_left(),
            AppEvent::QueryCaretRight => self.history.current_mut().caret_right(),
            AppEvent::QueryHistoryUp => {
                self.history.up();
                self.recompile_pattern();
            }
            AppEvent::QueryHistoryDown => {
                self.history.down();
                self.recompile_pattern();
            }
            AppEvent::QueryHistoryLast => {
                self.history.last();
                self.recompile_pattern();
            }
            AppEvent::QuerySubmit => {
                // the pattern is already live from incremental compilation
                self.mode = InputMode::Nav;
            }
            AppEvent::CopyLine => {
                if let Some(record) = self.buffer.get() {
                    self.copy_to_clipboard(record.text.clone());
                }
            }
            AppEvent::CopyMarked => {
                let mut out = String::new();
                self.buffer.for_each(|_, record| {
                    if record.marked {
                        out.push_str(&record.text);
                        out.push('\n');
                    }
                    true
                });
                self.copy_to_clipboard(out);
            }
            AppEvent::Resize => self.refresh = true,
            AppEvent::Quit => self.should_quit = true,
        }
    }

    /// Recompile the active pattern from the query editor. Invalid regex
    /// syntax falls back to a literal match so typing is never rejected.
    fn recompile_pattern(&mut self) {
        let text = self.history.current().text();
        self.pattern = if text.is_empty() {
            None
        } else {
            match Regex::new(&text) {
                Ok(re) => Some(re),
                Err(_) => Regex::new(&regex::escape(&text)).ok(),
            }
        };
    }

    fn apply_filter(&mut self, keep: bool) {
        self.detail_offset = 0;
        if let Some(filtered) = self.buffer.filtered(keep) {
            self.buffer = Arc::new(filtered);
        }
        // an empty result leaves the current buffer in place
    }

    fn copy_to_clipboard(&mut self, text: String) {
        tracing::info!(bytes = text.len(), "copying to clipboard");
        if let Err(err) = clipboard::copy(&text) {
            tracing::warn!(%err, "clipboard copy failed");
            self.set_status(format!("copy failed: {err}"));
        }
    }
}

/// `n`/`N` target: a pattern match when a search is active, otherwise the
/// next marked record. Marked records always qualify.
fn is_target(record: &Record, pattern: Option<&Regex>) -> bool {
    match pattern {
        Some(re) => record.marked || re.is_match(&record.text),
        None => record.marked,
    }
}

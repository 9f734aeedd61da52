//! Keyboard dispatch: terminal key events in, [`AppEvent`]s out.
//!
//! Handlers never mutate app state; they only translate keys according to
//! the current input mode. The run loop applies the returned events.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, InputMode, QueryKind};
use crate::event::AppEvent;

/// Translate one key event according to the current input mode.
pub fn handle_key(key: KeyEvent, app: &App) -> Vec<AppEvent> {
    if app.show_help {
        return handle_help_mode(key);
    }
    match app.mode {
        InputMode::Query(QueryKind::Search) => handle_query_mode(key),
        InputMode::Nav => handle_nav_mode(key),
    }
}

/// While the help overlay is up, any key dismisses it (quit still quits).
fn handle_help_mode(key: KeyEvent) -> Vec<AppEvent> {
    match key.code {
        KeyCode::Char('q') => vec![AppEvent::Quit],
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            vec![AppEvent::Quit]
        }
        _ => vec![AppEvent::HideHelp],
    }
}

fn handle_query_mode(key: KeyEvent) -> Vec<AppEvent> {
    match key.code {
        KeyCode::Left => vec![AppEvent::QueryCaretLeft],
        KeyCode::Right => vec![AppEvent::QueryCaretRight],
        KeyCode::Backspace => vec![AppEvent::QueryBackspace],
        KeyCode::Up => vec![AppEvent::QueryHistoryUp],
        KeyCode::Down => vec![AppEvent::QueryHistoryDown],
        KeyCode::PageDown => vec![AppEvent::QueryHistoryLast],
        KeyCode::Enter => vec![AppEvent::QuerySubmit],
        KeyCode::Char(c) => vec![AppEvent::QueryChar(c)],
        _ => vec![],
    }
}

fn handle_nav_mode(key: KeyEvent) -> Vec<AppEvent> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            vec![AppEvent::Quit]
        }
        KeyCode::F(1) => vec![AppEvent::ShowHelp],
        KeyCode::Up => vec![AppEvent::CursorUp],
        KeyCode::Down => vec![AppEvent::CursorDown],
        KeyCode::PageUp => vec![AppEvent::PageUp],
        KeyCode::PageDown => vec![AppEvent::PageDown],
        KeyCode::Left => vec![AppEvent::ScrollLeft],
        KeyCode::Right => vec![AppEvent::ScrollRight],
        KeyCode::Char(c) => match c {
            'q' => vec![AppEvent::Quit],
            'h' => vec![AppEvent::ShowHelp],
            '0' => vec![AppEvent::JumpHead],
            'F' => vec![AppEvent::Follow],
            '/' => vec![AppEvent::StartSearch],
            'n' => vec![AppEvent::NextMatch],
            'N' => vec![AppEvent::PrevMatch],
            ' ' => vec![AppEvent::ToggleMark],
            'm' => vec![AppEvent::MarkMatches],
            'M' => vec![AppEvent::UnmarkAll],
            'g' => vec![AppEvent::FilterMarked],
            'G' => vec![AppEvent::FilterUnmarked],
            'O' => vec![AppEvent::RestoreOrigin],
            'd' => vec![AppEvent::CycleDetail],
            'c' => vec![AppEvent::CopyLine],
            'C' => vec![AppEvent::CopyMarked],
            _ => vec![],
        },
        _ => vec![],
    }
}

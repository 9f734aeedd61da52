//! Terminal rendering: the log view, the status line, and the help overlay.

mod help;
mod highlight;
mod log_view;
mod status_bar;

use ratatui::layout::Rect;
use ratatui::Frame;

use crate::app::App;

/// Draw one frame. May raise `app.refresh` when the layout needs another
/// pass to settle (cursor reframing).
pub fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();
    app.height = area.height as usize;
    if area.height == 0 {
        return;
    }
    let content = Rect {
        height: area.height - 1,
        ..area
    };
    let status = Rect {
        y: area.y + area.height - 1,
        height: 1,
        ..area
    };
    log_view::render_log_view(f, content, app);
    status_bar::render_status_bar(f, status, app);
    if app.show_help {
        help::render_help(f, content);
    }
}

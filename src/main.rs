//! Interactive pager for streaming JSON logs.
//!
//! Reads a file or stdin, parses each line as structured JSON when it can,
//! and serves a scrollback UI with search, marks, filters, and per-record
//! detail views. Diagnostics go to /tmp/jlv.log so the terminal stays clean.

mod app;
mod buffer;
mod clipboard;
mod event;
mod handlers;
mod ingest;
mod logging;
mod parse;
mod pretty;
mod query;
mod signal;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::app::App;
use crate::buffer::Buffer;
use crate::event::AppEvent;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "jlv", version, about = "Interactive pager for JSON log streams")]
struct Args {
    /// Log file to read; stdin when omitted.
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();
    tracing::info!(file = ?args.file, "starting");

    let buffer = Arc::new(Buffer::default());
    ingest::start(args.file, Arc::clone(&buffer))?;
    let shutdown = signal::setup_shutdown_flag().context("installing signal handlers")?;

    enable_raw_mode().context("enabling raw mode")?;
    execute!(io::stdout(), EnterAlternateScreen).context("entering alternate screen")?;
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let mut terminal =
        Terminal::new(CrosstermBackend::new(io::stdout())).context("initializing terminal")?;
    let mut app = App::new(buffer);
    app.height = terminal.size().map(|s| s.height as usize).unwrap_or(24);
    app.row = app.height.saturating_sub(5);

    let result = run(&mut terminal, &mut app, &shutdown);

    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    tracing::info!("exiting");
    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    shutdown: &Arc<AtomicBool>,
) -> Result<()> {
    let mut last_revision = u64::MAX;
    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!("shutdown signal received");
            break;
        }

        // redraw on new records or when the previous frame asked for a
        // retry; render clears the flag and may raise it again
        let revision = app.origin.revision();
        if revision != last_revision || app.refresh {
            app.refresh = false;
            terminal.draw(|f| ui::render(f, app))?;
            last_revision = revision;
        }

        if crossterm::event::poll(POLL_INTERVAL).context("polling input")? {
            match crossterm::event::read().context("reading input")? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    for event in handlers::handle_key(key, app) {
                        app.apply_event(event);
                    }
                    app.refresh = true;
                }
                Event::Resize(_, _) => app.apply_event(AppEvent::Resize),
                _ => {}
            }
        }
        if app.should_quit {
            break;
        }
    }
    Ok(())
}

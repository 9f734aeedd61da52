//! Background line ingest.
//!
//! One detached thread reads the input source line by line and appends each
//! line to the origin buffer. It terminates silently at end of input and is
//! allowed to outlive the run loop; its only side effect is buffer appends.

use std::fs::File;
use std::io::{BufRead, BufReader, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};

use crate::buffer::Buffer;

/// Start ingest for the given source. With no file and a piped stdin, stdin
/// is consumed; with no file and an interactive stdin there is nothing to
/// read, so a single placeholder line is appended instead.
pub fn start(file: Option<PathBuf>, buffer: Arc<Buffer>) -> Result<()> {
    match file {
        Some(path) => {
            let name = path.display().to_string();
            let file =
                File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
            spawn_reader(file, buffer, name);
        }
        None => {
            if std::io::stdin().is_terminal() {
                buffer.append("terminal and nothing to read");
            } else {
                spawn_reader(std::io::stdin(), buffer, "stdin".to_string());
            }
        }
    }
    Ok(())
}

fn spawn_reader<R: Read + Send + 'static>(source: R, buffer: Arc<Buffer>, name: String) {
    thread::spawn(move || {
        tracing::info!(source = %name, "ingest started");
        let reader = BufReader::new(source);
        for line in reader.lines() {
            match line {
                Ok(line) => buffer.append(&line),
                Err(err) => {
                    tracing::warn!(source = %name, %err, "ingest read failed");
                    break;
                }
            }
        }
        tracing::info!(source = %name, "ingest finished");
    });
}

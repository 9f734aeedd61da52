//! Clipboard shell-out. Crude exec-based copy via `xclip`; failures are for
//! the caller to log and surface, never fatal.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};

pub fn copy(text: &str) -> Result<()> {
    let mut child = Command::new("xclip")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("failed to run xclip")?;
    child
        .stdin
        .take()
        .context("xclip stdin unavailable")?
        .write_all(text.as_bytes())
        .context("failed to write to xclip")?;
    let status = child.wait().context("failed to wait for xclip")?;
    if !status.success() {
        bail!("xclip exited with {status}");
    }
    Ok(())
}

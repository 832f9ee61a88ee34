//! Forwarding of console lines and directives to the game server's input.

use anyhow::{anyhow, Context, Result};
use std::io::Write;
use std::process::ChildStdin;
use std::sync::Mutex;

use crate::lock_or_recover;

/// Destination for lines typed into the console or generated by the reader.
pub trait ProcessRelay: Send + Sync {
    fn send_line(&self, line: &str) -> Result<()>;
}

/// Writes newline-terminated lines to a pipe (normally the server's stdin).
pub struct WriterRelay<W: Write + Send> {
    writer: Mutex<Option<W>>,
}

pub type ChildRelay = WriterRelay<ChildStdin>;

impl<W: Write + Send> WriterRelay<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(Some(writer)),
        }
    }

    /// Drop the writer so the server sees end of input. Later sends fail.
    pub fn close(&self) -> Option<W> {
        lock_or_recover(&self.writer, "WriterRelay::close").take()
    }
}

impl<W: Write + Send> ProcessRelay for WriterRelay<W> {
    fn send_line(&self, line: &str) -> Result<()> {
        let mut guard = lock_or_recover(&self.writer, "WriterRelay::send_line");
        let writer = guard
            .as_mut()
            .ok_or_else(|| anyhow!("server input is closed"))?;
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush())
            .context("failed to write to server input")?;
        crate::log_debug_content(&format!("relay sent: {line}"));
        Ok(())
    }
}

/// Used when no server process is attached; lines only reach the debug log.
#[derive(Debug, Default)]
pub struct NullRelay;

impl ProcessRelay for NullRelay {
    fn send_line(&self, line: &str) -> Result<()> {
        crate::log_debug_content(&format!("no server attached, dropped: {line}"));
        Ok(())
    }
}

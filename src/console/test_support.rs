use std::io;
use std::sync::{Arc, Mutex};

use super::{plain_text, ColoredMessage, TerminalSink};

/// Terminal double that records primitive calls as readable strings.
#[derive(Clone, Default)]
pub(crate) struct RecordingTerminal {
    pub(crate) ops: Arc<Mutex<Vec<String>>>,
    pub(crate) width: u16,
    pub(crate) fail_writes: bool,
}

impl RecordingTerminal {
    pub(crate) fn with_width(width: u16) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    pub(crate) fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    pub(crate) fn clear_ops(&self) {
        self.ops.lock().unwrap().clear();
    }

    /// Every full line written, without cursor bookkeeping.
    pub(crate) fn written(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| op.strip_prefix("write:").map(str::to_string))
            .collect()
    }

    fn push(&self, op: String) {
        self.ops.lock().unwrap().push(op);
    }
}

impl TerminalSink for RecordingTerminal {
    fn write_segments(&mut self, segments: &[ColoredMessage]) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
        }
        self.push(format!("write:{}", plain_text(segments)));
        Ok(())
    }

    fn clear_line(&mut self) -> io::Result<()> {
        self.push("clear".to_string());
        Ok(())
    }

    fn newline(&mut self) -> io::Result<()> {
        self.push("newline".to_string());
        Ok(())
    }

    fn move_to_column(&mut self, column: u16) -> io::Result<()> {
        self.push(format!("col:{column}"));
        Ok(())
    }

    fn width(&self) -> u16 {
        self.width
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

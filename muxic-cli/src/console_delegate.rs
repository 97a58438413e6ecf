use std::io::{self, Write};

use parking_lot::Mutex;

use muxic_core::{CaptureDelegate, CaptureError, LoopState};

/// CaptureDelegate that prints progress to a terminal.
///
/// Meter lines overwrite each other in place; the next status or error
/// line starts on a fresh line below the bar.
pub struct ConsoleDelegate {
    out: Mutex<ConsoleOut>,
}

struct ConsoleOut {
    writer: Box<dyn Write + Send>,
    meter_active: bool,
}

impl ConsoleDelegate {
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(ConsoleOut {
                writer,
                meter_active: false,
            }),
        }
    }

    fn print_line(&self, line: &str) {
        let mut out = self.out.lock();
        if out.meter_active {
            out.meter_active = false;
            let _ = writeln!(out.writer);
        }
        let _ = writeln!(out.writer, "{line}");
        let _ = out.writer.flush();
    }
}

impl CaptureDelegate for ConsoleDelegate {
    fn on_state_changed(&self, state: LoopState) {
        log::debug!("Capture state: {}", state);
    }

    fn on_status(&self, message: &str) {
        self.print_line(message);
    }

    fn on_meter(&self, line: &str) {
        let mut out = self.out.lock();
        out.meter_active = true;
        let _ = write!(out.writer, "{line}");
        let _ = out.writer.flush();
    }

    fn on_error(&self, error: &CaptureError) {
        self.print_line(&format!("[WARN] {error}"));
    }
}

use crate::models::error::CaptureError;
use crate::models::state::LoopState;

/// Reporting sink for capture progress.
///
/// All methods are called from the thread running the capture loop.
/// Everything reported here is advisory; none of it feeds back into capture.
pub trait CaptureDelegate: Send + Sync {
    /// Called when the loop changes state.
    fn on_state_changed(&self, state: LoopState);

    /// A human-readable progress line (format, start/stop, byte counts).
    fn on_status(&self, message: &str);

    /// A visualizer redraw line, meant to overwrite the previous one.
    fn on_meter(&self, line: &str);

    /// A failure the loop kept going through: the first poll failure of a
    /// run, or a failed stop. Errors returned by `run` are not reported here.
    fn on_error(&self, error: &CaptureError);
}

/// Delegate that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDelegate;

impl CaptureDelegate for NullDelegate {
    fn on_state_changed(&self, _state: LoopState) {}

    fn on_status(&self, _message: &str) {}

    fn on_meter(&self, _line: &str) {}

    fn on_error(&self, _error: &CaptureError) {}
}

use std::time::{Duration, Instant};

/// Number of cells in the level bar.
pub const BAR_WIDTH: usize = 20;

/// Render `amplitude` as a bracketed bar of `|` and space cells.
///
/// Values at or above 1.0 fill the bar; NaN and negatives leave it empty.
pub fn render_bar(amplitude: f32) -> String {
    let filled = if amplitude.is_nan() || amplitude <= 0.0 {
        0
    } else {
        ((amplitude * BAR_WIDTH as f32) as usize).min(BAR_WIDTH)
    };
    format!("[{}{}]", "|".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}

/// The bar prefixed with carriage return and erase-line, so each redraw
/// overwrites the previous one on a terminal.
pub fn redraw_line(amplitude: f32) -> String {
    format!("\r\x1b[K{}", render_bar(amplitude))
}

/// Decides when the level bar is due for a redraw.
#[derive(Debug, Clone)]
pub struct Visualizer {
    interval: Duration,
    next_tick: Option<Instant>,
}

impl Visualizer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_tick: None,
        }
    }

    /// Returns the redraw line when a tick has elapsed since the last
    /// redraw. The first call after construction only schedules a tick.
    pub fn tick(&mut self, now: Instant, amplitude: f32) -> Option<String> {
        match self.next_tick {
            None => {
                self.next_tick = Some(now + self.interval);
                None
            }
            Some(due) if now >= due => {
                // Skip missed ticks instead of bursting to catch up.
                let mut next = due + self.interval;
                if next <= now {
                    next = now + self.interval;
                }
                self.next_tick = Some(next);
                Some(redraw_line(amplitude))
            }
            Some(_) => None,
        }
    }
}

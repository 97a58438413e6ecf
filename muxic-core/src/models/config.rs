use std::time::Duration;

/// Timing and escalation policy for the capture loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureLoopConfig {
    /// Sleep after an empty or failed poll (default: 10ms).
    pub poll_backoff: Duration,

    /// Sleep after a poll that delivered a chunk (default: 1ms).
    pub chunk_pause: Duration,

    /// Visualizer redraw interval (default: 50ms).
    pub visualizer_interval: Duration,

    /// Consecutive transient poll failures that end the capture
    /// (default: 500). `None` retries forever.
    pub max_consecutive_failures: Option<u32>,
}

impl CaptureLoopConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_consecutive_failures == Some(0) {
            return Err("failure threshold must be at least 1".into());
        }
        if self.poll_backoff > Duration::from_secs(1) {
            return Err(format!(
                "poll backoff of {:?} would starve the visualizer",
                self.poll_backoff
            ));
        }
        Ok(())
    }
}

impl Default for CaptureLoopConfig {
    fn default() -> Self {
        Self {
            poll_backoff: Duration::from_millis(10),
            chunk_pause: Duration::from_millis(1),
            visualizer_interval: Duration::from_millis(50),
            max_consecutive_failures: Some(500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(CaptureLoopConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let config = CaptureLoopConfig {
            max_consecutive_failures: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unbounded_retry_is_allowed() {
        let config = CaptureLoopConfig {
            max_consecutive_failures: None,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn long_backoff_is_rejected() {
        let config = CaptureLoopConfig {
            poll_backoff: Duration::from_secs(2),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}

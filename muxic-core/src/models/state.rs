use std::fmt;

/// Capture loop state machine.
///
/// State transitions:
/// ```text
/// idle → armed → capturing → draining → finished
/// ```
/// A failed start leaves the loop `Armed`; `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Armed,
    Capturing,
    Draining,
    Finished,
}

impl LoopState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Armed => "armed",
            Self::Capturing => "capturing",
            Self::Draining => "draining",
            Self::Finished => "finished",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_finished_is_terminal() {
        assert!(LoopState::Finished.is_terminal());
        assert!(!LoopState::Draining.is_terminal());
        assert!(LoopState::Idle.is_idle());
    }

    #[test]
    fn displays_lowercase() {
        assert_eq!(LoopState::Capturing.to_string(), "capturing");
    }
}

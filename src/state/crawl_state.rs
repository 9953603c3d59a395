/// Crawl state definitions for tracking one crawl run
///
/// A run moves `Idle -> Running -> (Completed | Aborted)` and never leaves a
/// terminal state.
use std::fmt;

/// Represents the lifecycle state of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Session constructed, crawl not started
    Idle,

    /// Crawl loop is processing the frontier
    Running,

    /// Frontier exhausted or page budget reached
    Completed,

    /// Interrupted or stopped by an internal fault; partial results kept
    Aborted,
}

impl CrawlState {
    /// Returns true if the transition `self -> next` is allowed
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Aborted)
        )
    }

    /// Converts the state to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }

    /// Parses a state from its database string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(Self::Idle),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "aborted" => Some(Self::Aborted),
            _ => None,
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_string_roundtrip() {
        for state in [
            CrawlState::Idle,
            CrawlState::Running,
            CrawlState::Completed,
            CrawlState::Aborted,
        ] {
            assert_eq!(CrawlState::from_db_string(state.to_db_string()), Some(state));
        }
        assert_eq!(CrawlState::from_db_string("paused"), None);
    }

    #[test]
    fn test_valid_transitions() {
        assert!(CrawlState::Idle.can_transition_to(CrawlState::Running));
        assert!(CrawlState::Running.can_transition_to(CrawlState::Completed));
        assert!(CrawlState::Running.can_transition_to(CrawlState::Aborted));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!CrawlState::Idle.can_transition_to(CrawlState::Completed));
        assert!(!CrawlState::Completed.can_transition_to(CrawlState::Running));
        assert!(!CrawlState::Aborted.can_transition_to(CrawlState::Completed));
        assert!(!CrawlState::Running.can_transition_to(CrawlState::Idle));
    }
}

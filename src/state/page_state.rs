/// State definitions for tracking crawl progress
///
/// `FrontierState` is where a page sits in the frontier; `FetchStage` is how far
/// the fetch pipeline got with it.
use std::fmt;

/// Frontier membership of a page; exactly one holds at any instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrontierState {
    /// Discovered, waiting to be taken by the scheduler
    Pending,

    /// Owned by a running fetch pipeline
    InFlight,

    /// Finalized; never leaves this state
    Done,
}

impl FrontierState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InFlight => "in_flight",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for FrontierState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stages of the per-page fetch state machine
///
/// ```text
/// New -> HeadSent -> {HeadOk, HeadFailed} -> (conditionally) GetSent -> {GetOk, GetFailed} -> Finalized
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStage {
    // ===== Before any request =====
    /// Only a canonical URL is known
    New,

    // ===== HEAD =====
    /// HEAD request issued
    HeadSent,

    /// HEAD answered; status and content type captured
    HeadOk,

    /// HEAD transport failure or hard-failure status
    HeadFailed,

    // ===== GET =====
    /// GET request issued (internal HTML pages only)
    GetSent,

    /// GET answered and the body was handed to the link extractor
    GetOk,

    /// GET transport failure or error status
    GetFailed,

    // ===== Terminal =====
    /// Page handed back to the scheduler
    Finalized,
}

impl FetchStage {
    /// Returns true if the pipeline may move from `self` to `next`
    pub fn can_transition_to(&self, next: FetchStage) -> bool {
        use FetchStage::*;
        matches!(
            (self, next),
            (New, HeadSent)
                | (New, Finalized)
                | (HeadSent, HeadOk)
                | (HeadSent, HeadFailed)
                | (HeadOk, GetSent)
                | (HeadOk, Finalized)
                | (HeadFailed, Finalized)
                | (GetSent, GetOk)
                | (GetSent, GetFailed)
                | (GetOk, Finalized)
                | (GetFailed, Finalized)
        )
    }

    /// Returns true if this stage records a failed request
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::HeadFailed | Self::GetFailed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::HeadSent => "head_sent",
            Self::HeadOk => "head_ok",
            Self::HeadFailed => "head_failed",
            Self::GetSent => "get_sent",
            Self::GetOk => "get_ok",
            Self::GetFailed => "get_failed",
            Self::Finalized => "finalized",
        }
    }
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        use FetchStage::*;
        let path = [New, HeadSent, HeadOk, GetSent, GetOk, Finalized];
        for pair in path.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} -> {} should be allowed",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_head_only_paths() {
        use FetchStage::*;
        assert!(HeadOk.can_transition_to(Finalized));
        assert!(HeadFailed.can_transition_to(Finalized));
        assert!(New.can_transition_to(Finalized));
    }

    #[test]
    fn test_forbidden_transitions() {
        use FetchStage::*;
        assert!(!HeadFailed.can_transition_to(GetSent));
        assert!(!New.can_transition_to(GetSent));
        assert!(!Finalized.can_transition_to(New));
        assert!(!GetOk.can_transition_to(HeadSent));
    }

    #[test]
    fn test_is_failure() {
        assert!(FetchStage::HeadFailed.is_failure());
        assert!(FetchStage::GetFailed.is_failure());
        assert!(!FetchStage::HeadOk.is_failure());
        assert!(!FetchStage::Finalized.is_failure());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", FetchStage::HeadOk), "head_ok");
        assert_eq!(format!("{}", FrontierState::InFlight), "in_flight");
    }
}

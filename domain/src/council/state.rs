//! Council run state machine
//!
//! ```text
//! Init ─► Round1InFlight ─┬─► Agreed                         (success)
//!                         ├─► Round2InFlight ─► Finalized    (success)
//!                         └─► AllFailed                      (failure)
//! ```

use serde::{Deserialize, Serialize};

/// State of one grading council run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouncilState {
    Init,
    Round1InFlight,
    /// Round-1 graders agreed; finalized on round-1 results
    Agreed,
    Round2InFlight,
    /// Finalized after deliberation (on round-2 results, or round 1 as fallback)
    Finalized,
    /// Every round-1 grader failed
    AllFailed,
}

impl CouncilState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouncilState::Init => "init",
            CouncilState::Round1InFlight => "round1_inflight",
            CouncilState::Agreed => "agreed",
            CouncilState::Round2InFlight => "round2_inflight",
            CouncilState::Finalized => "finalized",
            CouncilState::AllFailed => "all_failed",
        }
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: CouncilState) -> bool {
        use CouncilState::*;
        matches!(
            (self, next),
            (Init, Round1InFlight)
                | (Round1InFlight, Agreed)
                | (Round1InFlight, Round2InFlight)
                | (Round1InFlight, AllFailed)
                | (Round2InFlight, Finalized)
        )
    }
}

impl std::fmt::Display for CouncilState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        assert!(CouncilState::Init.can_transition_to(CouncilState::Round1InFlight));
        assert!(CouncilState::Round1InFlight.can_transition_to(CouncilState::Round2InFlight));
        assert!(!CouncilState::Round2InFlight.can_transition_to(CouncilState::AllFailed));
        assert!(!CouncilState::Agreed.can_transition_to(CouncilState::Round2InFlight));
        assert!(!CouncilState::Init.can_transition_to(CouncilState::Finalized));
    }
}

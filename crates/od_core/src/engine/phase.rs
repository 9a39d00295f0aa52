//! Episode phases and outcomes

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EpisodePhase {
    /// Targets alive, agents fighting
    Combat,
    /// Every target down, the key waits on the floor
    KeyPhase,
    /// An agent carries the key toward the door
    EscapePhase,
    Won,
    Failed,
}

impl EpisodePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, EpisodePhase::Won | EpisodePhase::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The escape countdown ran out
    TimerExpired,
    /// A guarded target reached its lair
    TargetEscaped,
}

impl FailureReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureReason::TimerExpired => "timer_expired",
            FailureReason::TargetEscaped => "target_escaped",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeOutcome {
    Won,
    Failed(FailureReason),
}

impl EpisodeOutcome {
    pub fn phase(self) -> EpisodePhase {
        match self {
            EpisodeOutcome::Won => EpisodePhase::Won,
            EpisodeOutcome::Failed(_) => EpisodePhase::Failed,
        }
    }

    pub fn failure_reason(self) -> Option<FailureReason> {
        match self {
            EpisodeOutcome::Won => None,
            EpisodeOutcome::Failed(reason) => Some(reason),
        }
    }
}

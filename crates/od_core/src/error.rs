//! Error taxonomy for the dungeon simulation
//!
//! - `Configuration`: fatal, aborts the run before the first episode
//! - `SpawnExhaustion`: recoverable, the caller relaxes constraints and retries
//! - `InconsistentState`: discarded by the orchestrator, never crosses a tick

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DungeonError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Spawn exhaustion: could not place {entity} after {attempts} attempts")]
    SpawnExhaustion { entity: String, attempts: u32 },

    #[error("Inconsistent state: {0}")]
    InconsistentState(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DungeonError {
    /// Shorthand for a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        DungeonError::Configuration(msg.into())
    }

    pub fn is_recoverable(&self) -> bool {
        match self {
            DungeonError::SpawnExhaustion { .. } => true,
            DungeonError::InconsistentState(_) => true,
            DungeonError::Configuration(_) => false,
            DungeonError::Io(_) => false,
            DungeonError::Yaml(_) | DungeonError::Json(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, DungeonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        let spawn = DungeonError::SpawnExhaustion { entity: "key".into(), attempts: 10 };
        assert!(spawn.is_recoverable());
        assert!(DungeonError::InconsistentState("stale key".into()).is_recoverable());
        assert!(!DungeonError::config("missing personality").is_recoverable());
    }

    #[test]
    fn test_display() {
        let err = DungeonError::SpawnExhaustion { entity: "agent 2".into(), attempts: 500 };
        assert_eq!(
            err.to_string(),
            "Spawn exhaustion: could not place agent 2 after 500 attempts"
        );
    }
}

//! # od_core - Personality-Driven Multi-Agent Dungeon Simulation
//!
//! A fixed-timestep arena where a team of agents, each with an OCEAN
//! personality, defeats guarded targets, grabs a key and escapes through
//! a door before the timer runs out. Every reward an agent receives is
//! shaped by its personality traits.
//!
//! ## Features
//! - Deterministic episodes (same seed = same layout and outcome)
//! - Reward shaping engine with a per-term breakdown for every event
//! - Episode phase machine with group rewards and auto-reset
//! - Rejection-sampling spawn solver with radius relaxation
//! - Per-episode statistics rows handed to a pluggable sink
//!
//! ## Usage
//! ```rust
//! use od_core::{AgentAction, Dungeon, DungeonConfig};
//!
//! let mut dungeon = Dungeon::new(DungeonConfig::deterministic(7)).unwrap();
//! let actions = vec![AgentAction::new(0.0, 1.0); dungeon.agents().len()];
//! let outcome = dungeon.tick(&actions);
//! assert_eq!(outcome.rewards.len(), 3);
//! ```

// Game engine APIs often require many parameters for physics, state, etc.
#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod stats;

pub use config::{DungeonConfig, PersonalitySettings};
pub use engine::{
    AgentObservation, Dungeon, EpisodeOutcome, EpisodePhase, FailureReason, MultiAgentEnvironment, StepResult,
    TickOutcome,
};
pub use error::{DungeonError, Result};
pub use models::{AgentAction, AgentId, AgentState, Personality, TargetId};
pub use stats::{MemoryStatsSink, NullStatsSink, StatsSink};

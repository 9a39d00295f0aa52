//! # Simulation Engine
//!
//! - `orchestrator`: episode phase machine and tick loop (`Dungeon`)
//! - `reward`: personality-shaped per-agent rewards
//! - `spawn`: rejection-sampling placement with radius relaxation
//! - `target`: guarded target state machine
//! - `door`: exit door that unlocks for the key carrier
//! - `env`: multi-agent environment protocol for training harnesses
//!
//! Perception, movement and target navigation are collaborators behind
//! traits; the orchestrator ships reference implementations of each.

pub mod collision;
pub mod door;
pub mod env;
pub mod events;
pub mod movement;
pub mod orchestrator;
pub mod perception;
pub mod phase;
pub mod reward;
pub mod snapshot;
pub mod spawn;
pub mod target;
pub mod timer;

pub use collision::{AgentContact, Collision, CollisionKind};
pub use door::Door;
pub use env::{AgentObservation, MultiAgentEnvironment, SightingObservation, StepResult};
pub use events::{EpisodeEvent, EpisodeObserver, EventQueue, VisualCue};
pub use movement::{Colliders, KinematicMovement, Movement, Navigator, StraightLineNavigator};
pub use orchestrator::{Dungeon, TickOutcome};
pub use perception::{ConePerception, Contact, Perception, PerceptionTag, Sighting};
pub use phase::{EpisodeOutcome, EpisodePhase, FailureReason};
pub use reward::{AgentRewardCalculator, RewardBreakdown, RewardMemory};
pub use snapshot::ArenaSnapshot;
pub use spawn::{BlockerQuery, DoorLayout, LairLayout, SpawnSolver, SphereBlockers};
pub use target::{Target, TargetState};
pub use timer::EscapeTimer;

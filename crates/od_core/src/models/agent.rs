//! Agent runtime state
//!
//! Owned by the orchestrator. Other agents only ever see read-only
//! snapshots of it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::geometry::Vec3;
use super::personality::Personality;

pub type AgentId = usize;
pub type TargetId = usize;

/// Per-tick action decided by the external policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentAction {
    /// Rotation input in [-1, 1], scaled by the rotation speed
    pub rotation: f32,
    /// Forward input in [-1, 1], scaled by the agent speed
    pub forward: f32,
}

impl AgentAction {
    pub fn new(rotation: f32, forward: f32) -> Self {
        Self { rotation, forward }
    }

    pub fn idle() -> Self {
        Self::default()
    }

    /// Clamps both inputs into [-1, 1]; non-finite inputs become 0
    pub fn sanitized(self) -> Self {
        let clean = |v: f32| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        Self { rotation: clean(self.rotation), forward: clean(self.forward) }
    }
}

#[derive(Debug, Clone)]
pub struct AgentState {
    pub id: AgentId,
    pub position: Vec3,
    /// Yaw in degrees
    pub heading: f32,
    pub has_key: bool,
    pub hits_inflicted: u32,
    pub targets_alive: bool,
    pub personality: Arc<Personality>,
    /// Policy identifier bound to this agent slot
    pub behavior_name: String,
    /// Forward input applied on the last tick
    pub forward_speed: f32,
}

impl AgentState {
    pub fn new(id: AgentId, personality: Arc<Personality>, behavior_name: impl Into<String>) -> Self {
        Self {
            id,
            position: Vec3::zeros(),
            heading: 0.0,
            has_key: false,
            hits_inflicted: 0,
            targets_alive: true,
            personality,
            behavior_name: behavior_name.into(),
            forward_speed: 0.0,
        }
    }

    /// Clears per-episode counters; position is reassigned by the spawn solver
    pub fn reset_episode(&mut self) {
        self.has_key = false;
        self.hits_inflicted = 0;
        self.targets_alive = true;
        self.forward_speed = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_episode_clears_counters() {
        let mut agent = AgentState::new(0, Arc::new(Personality::neutral("n")), "Neutral");
        agent.has_key = true;
        agent.hits_inflicted = 4;
        agent.targets_alive = false;
        agent.forward_speed = 1.0;

        agent.reset_episode();

        assert!(!agent.has_key);
        assert_eq!(agent.hits_inflicted, 0);
        assert!(agent.targets_alive);
        assert_eq!(agent.forward_speed, 0.0);
    }

    #[test]
    fn test_action_sanitized() {
        let a = AgentAction::new(3.0, f32::NAN).sanitized();
        assert_eq!(a, AgentAction::new(1.0, 0.0));
    }
}

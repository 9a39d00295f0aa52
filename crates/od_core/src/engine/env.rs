//! Multi-agent environment protocol
//!
//! The contract a training harness drives: `begin_episode` once, then
//! `step` with one action per agent every tick. A step after a terminal
//! step starts the next episode first.

use serde::{Deserialize, Serialize};

use crate::models::{AgentAction, AgentId};

use super::orchestrator::Dungeon;
use super::perception::{PerceptionTag, Sighting};
use super::phase::{EpisodeOutcome, EpisodePhase};

/// Multi-agent episodic environment
pub trait MultiAgentEnvironment {
    type Observation;
    type Action;

    fn num_agents(&self) -> usize;

    /// Starts a fresh episode and returns the first observations
    fn begin_episode(&mut self) -> Vec<Self::Observation>;

    fn observe(&self, agent: AgentId) -> Self::Observation;

    fn step(&mut self, actions: &[Self::Action]) -> StepResult<Self::Observation>;
}

/// Result of one environment step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult<O> {
    pub observations: Vec<O>,
    /// Individual reward per agent
    pub rewards: Vec<f32>,
    /// Team reward every agent receives on top of its own
    pub group_reward: f32,
    pub terminated: Vec<bool>,
    pub truncated: Vec<bool>,
    pub phase: EpisodePhase,
    pub outcome: Option<EpisodeOutcome>,
}

impl<O> StepResult<O> {
    pub fn all_done(&self) -> bool {
        self.terminated.iter().zip(&self.truncated).all(|(term, trunc)| *term || *trunc)
    }

    pub fn any_done(&self) -> bool {
        self.terminated.iter().zip(&self.truncated).any(|(term, trunc)| *term || *trunc)
    }
}

// ============================================================================
// Observation
// ============================================================================

/// Sighting encoded for a policy: distance normalized, angle over 180
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SightingObservation {
    pub visible: bool,
    pub distance: f32,
    pub angle: f32,
}

impl SightingObservation {
    fn encode(sighting: Sighting, max_distance: f32) -> Self {
        match sighting.contact() {
            Some(c) => Self {
                visible: true,
                distance: if max_distance > f32::EPSILON { c.distance / max_distance } else { 0.0 },
                angle: c.angle / 180.0,
            },
            None => Self::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentObservation {
    /// Position relative to the arena center, in [-1, 1] per axis
    pub position: [f32; 2],
    pub heading_sin: f32,
    pub heading_cos: f32,
    pub has_key: bool,
    pub targets_alive: bool,
    pub door_unlocked: bool,
    pub urgency: f32,
    pub target: SightingObservation,
    pub key: SightingObservation,
    pub door: SightingObservation,
}

impl AgentObservation {
    pub const LEN: usize = 17;

    /// Flat vector layout for a policy network
    pub fn to_vec(&self) -> Vec<f32> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let mut v = Vec::with_capacity(Self::LEN);
        v.extend_from_slice(&self.position);
        v.push(self.heading_sin);
        v.push(self.heading_cos);
        v.push(flag(self.has_key));
        v.push(flag(self.targets_alive));
        v.push(flag(self.door_unlocked));
        v.push(self.urgency);
        for s in [&self.target, &self.key, &self.door] {
            v.push(flag(s.visible));
            v.push(s.distance);
            v.push(s.angle);
        }
        v
    }
}

// ============================================================================
// Dungeon as an environment
// ============================================================================

impl MultiAgentEnvironment for Dungeon {
    type Observation = AgentObservation;
    type Action = AgentAction;

    fn num_agents(&self) -> usize {
        self.agents().len()
    }

    fn begin_episode(&mut self) -> Vec<AgentObservation> {
        Dungeon::begin_episode(self);
        (0..self.num_agents()).map(|i| self.observe(i)).collect()
    }

    fn observe(&self, agent: AgentId) -> AgentObservation {
        let Some(state) = self.agents().get(agent) else {
            return AgentObservation::default();
        };
        let floor = self.config().arena.floor;
        let max_distance = self.config().arena.max_distance();
        let half_w = (floor.width() * 0.5).max(f32::EPSILON);
        let half_d = (floor.depth() * 0.5).max(f32::EPSILON);
        let heading = state.heading.to_radians();

        AgentObservation {
            position: [
                ((state.position.x - floor.center_x()) / half_w).clamp(-1.0, 1.0),
                ((state.position.z - floor.center_z()) / half_d).clamp(-1.0, 1.0),
            ],
            heading_sin: heading.sin(),
            heading_cos: heading.cos(),
            has_key: state.has_key,
            targets_alive: state.targets_alive,
            door_unlocked: self.door_unlocked(),
            urgency: self.urgency(),
            target: SightingObservation::encode(self.perceive(agent, PerceptionTag::Target), max_distance),
            key: SightingObservation::encode(self.perceive(agent, PerceptionTag::Key), max_distance),
            door: SightingObservation::encode(self.perceive(agent, PerceptionTag::Door), max_distance),
        }
    }

    fn step(&mut self, actions: &[AgentAction]) -> StepResult<AgentObservation> {
        let outcome = self.tick(actions);
        let done = outcome.phase.is_terminal();
        let n = self.num_agents();

        StepResult {
            observations: (0..n).map(|i| self.observe(i)).collect(),
            rewards: outcome.rewards,
            group_reward: outcome.group_reward,
            terminated: vec![done; n],
            truncated: vec![false; n],
            phase: outcome.phase,
            outcome: outcome.outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DungeonConfig;

    #[test]
    fn test_observation_layout() {
        let mut env = Dungeon::new(DungeonConfig::deterministic(3)).unwrap();
        let obs = MultiAgentEnvironment::begin_episode(&mut env);
        assert_eq!(obs.len(), 3);

        for o in &obs {
            let v = o.to_vec();
            assert_eq!(v.len(), AgentObservation::LEN);
            assert!(v.iter().all(|x| x.is_finite()));
            assert!(o.position.iter().all(|p| (-1.0..=1.0).contains(p)));
            assert!((o.heading_sin.powi(2) + o.heading_cos.powi(2) - 1.0).abs() < 1e-4);
            assert!(!o.has_key);
            assert!(o.targets_alive);
        }
    }

    #[test]
    fn test_step_shapes() {
        let mut env = Dungeon::new(DungeonConfig::deterministic(5)).unwrap();
        let result = env.step(&[AgentAction::new(0.2, 1.0); 3]);
        assert_eq!(result.observations.len(), 3);
        assert_eq!(result.rewards.len(), 3);
        assert_eq!(result.terminated, vec![false; 3]);
        assert!(!result.any_done());
        assert_eq!(result.phase, EpisodePhase::Combat);
        assert!(result.outcome.is_none());
    }

    #[test]
    fn test_unseen_sighting_encodes_zero() {
        let s = SightingObservation::encode(Sighting::unseen(), 20.0);
        assert_eq!(s, SightingObservation::default());
        let seen = SightingObservation::encode(Sighting::seen(10.0, -90.0), 20.0);
        assert!((seen.distance - 0.5).abs() < 1e-6);
        assert!((seen.angle + 0.5).abs() < 1e-6);
    }
}

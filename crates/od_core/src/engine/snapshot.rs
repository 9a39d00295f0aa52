//! Read-only view of the arena handed to reward terms and perception
//!
//! Built by the orchestrator once per dispatch phase. Nothing behind it can
//! be mutated while a snapshot is alive.

use crate::config::Obstacle;
use crate::models::{planar_distance, AgentId, AgentState, Rect, Vec3};

use super::target::Target;

#[derive(Debug, Clone, Copy)]
pub struct ArenaSnapshot<'a> {
    pub agents: &'a [AgentState],
    pub targets: &'a [Target],
    pub obstacles: &'a [Obstacle],
    pub floor: Rect,
    /// Key position while it lies in the arena
    pub key: Option<Vec3>,
    pub door: Vec3,
    pub door_unlocked: bool,
    /// Normalizer for every distance term
    pub max_distance: f32,
    /// Time pressure in [0, 1]
    pub urgency: f32,
    /// Seconds since the episode started
    pub elapsed: f32,
}

impl<'a> ArenaSnapshot<'a> {
    pub fn agent(&self, id: AgentId) -> Option<&'a AgentState> {
        self.agents.get(id)
    }

    pub fn targets_alive(&self) -> usize {
        self.targets.iter().filter(|t| t.is_alive()).count()
    }

    /// Fraction of peers within `radius` of `position`, excluding `agent`
    ///
    /// `None` when the agent has no peers.
    pub fn agent_density_within_radius(&self, agent: AgentId, position: &Vec3, radius: f32) -> Option<f32> {
        let peers = self.agents.iter().filter(|a| a.id != agent);
        let (total, near) = peers.fold((0usize, 0usize), |(total, near), other| {
            let inside = planar_distance(&other.position, position) <= radius;
            (total + 1, near + usize::from(inside))
        });
        if total == 0 {
            return None;
        }
        Some(near as f32 / total as f32)
    }

    /// Distance from the centroid of every other agent
    pub fn distance_from_team(&self, agent: AgentId, position: &Vec3) -> Option<f32> {
        let mut sum = Vec3::zeros();
        let mut count = 0usize;
        for other in self.agents.iter().filter(|a| a.id != agent) {
            sum += other.position;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let centroid = sum / count as f32;
        Some(planar_distance(&centroid, position))
    }

    pub fn normalized_distance(&self, distance: f32) -> f32 {
        if self.max_distance > f32::EPSILON {
            distance / self.max_distance
        } else {
            0.0
        }
    }

    pub fn normalized_distance_from_exit(&self, position: &Vec3) -> f32 {
        self.normalized_distance(planar_distance(position, &self.door))
    }
}

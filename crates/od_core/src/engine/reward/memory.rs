//! Per-agent reward memory
//!
//! The only state the reward engine writes. Cleared once per episode by
//! `AgentRewardCalculator::reset_counters`.

use crate::models::{TargetId, Vec3};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewardMemory {
    /// Target of the last hit this agent landed
    pub previous_target: Option<TargetId>,
    /// Episode time of the last hit; the episode start until the first hit
    pub last_hit_time: f32,
    /// Distance error from the preferred team radius on the previous tick
    pub previous_team_error: Option<f32>,
    /// Normalized distance to the exit on the previous tick while holding the key
    pub previous_distance_from_exit: f32,
    /// Where this agent picked up the key
    pub key_grab_position: Option<Vec3>,
    /// Furthest distance reached from the key grab point
    pub max_distance_from_grab: f32,
}

impl RewardMemory {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

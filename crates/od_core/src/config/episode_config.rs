//! Episode Configuration

use serde::{Deserialize, Serialize};

/// Episode sizing, timing and motion parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeConfig {
    /// Agents per episode (default: 3)
    pub number_of_agents: usize,
    /// Guarded targets per episode (default: 2)
    pub number_of_targets: usize,
    /// Hits needed to defeat one target (default: 3)
    pub target_lives: u32,
    /// Escape timer length in seconds, started when the last target falls (default: 30.0)
    pub time_to_escape: f32,
    /// Fixed timestep in seconds (default: 0.02)
    pub tick_seconds: f32,
    /// Agent top speed in m/s (default: 2.0)
    pub agent_speed: f32,
    /// Agent turn rate in degrees/s at full rotation input (default: 180.0)
    pub rotation_speed: f32,
    /// Target speed toward its lair in m/s (default: 0.5)
    pub target_speed: f32,
    /// Seed for the episode RNG (default: 42)
    pub seed: u64,
    /// Flush per-episode statistics rows to the sink (default: false)
    pub compute_episode_stats: bool,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            number_of_agents: 3,
            number_of_targets: 2,
            target_lives: 3,
            time_to_escape: 30.0,
            tick_seconds: 0.02,
            agent_speed: 2.0,
            rotation_speed: 180.0,
            target_speed: 0.5,
            seed: 42,
            compute_episode_stats: false,
        }
    }
}

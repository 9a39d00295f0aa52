//! Episode statistics collector
//!
//! Accumulates per-agent and per-episode metrics while an episode runs.
//! The orchestrator turns them into rows at reset.
//!
//! ## Agent metrics
//! - hits, defeated targets, key held, time to find the key
//! - peer collisions, distance traveled, mean speed
//! - running mean distance from peers and from living targets
//! - idle time (speed below `IDLE_SPEED`), time within `NEAR_PEER_DISTANCE` of a peer

use serde::{Deserialize, Serialize};

use crate::engine::phase::EpisodeOutcome;
use crate::engine::target::Target;
use crate::models::{planar_distance, AgentId, AgentState, Vec3};

use super::{AgentEpisodeRow, GlobalEpisodeRow};

/// Below this speed (m/s) an agent counts as idle
pub const IDLE_SPEED: f32 = 0.1;
/// Within this distance (m) of a peer an agent counts as near
pub const NEAR_PEER_DISTANCE: f32 = 1.0;

/// Running mean without storing samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningMean {
    sum: f64,
    count: u64,
}

impl RunningMean {
    pub fn push(&mut self, value: f32) {
        if value.is_finite() {
            self.sum += f64::from(value);
            self.count += 1;
        }
    }

    pub fn mean(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            (self.sum / self.count as f64) as f32
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentEpisodeStats {
    pub personality_name: String,
    pub hits_inflicted: u32,
    pub targets_defeated: u32,
    pub has_key: bool,
    /// Episode time of the key pickup
    pub time_to_find_key: Option<f32>,
    pub peer_collisions: u32,
    pub distance_traveled: f32,
    pub speed: RunningMean,
    pub distance_from_peers: RunningMean,
    pub distance_from_targets: RunningMean,
    pub idle_time: f32,
    pub time_near_peers: f32,
    last_position: Option<Vec3>,
}

impl AgentEpisodeStats {
    pub fn new(personality_name: impl Into<String>) -> Self {
        Self { personality_name: personality_name.into(), ..Self::default() }
    }

    fn clear(&mut self) {
        let name = std::mem::take(&mut self.personality_name);
        *self = Self::new(name);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalEpisodeStats {
    pub outcome: Option<EpisodeOutcome>,
    pub duration: f32,
    pub time_to_defeat_all_targets: Option<f32>,
    pub time_to_grab_key: Option<f32>,
    pub time_of_escape: Option<f32>,
}

/// Metrics for the episode in progress
#[derive(Debug, Clone, Default)]
pub struct StatsCollector {
    episode: u64,
    agents: Vec<AgentEpisodeStats>,
    global: GlobalEpisodeStats,
}

impl StatsCollector {
    pub fn new<I, S>(personality_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            episode: 0,
            agents: personality_names.into_iter().map(|name| AgentEpisodeStats::new(name)).collect(),
            global: GlobalEpisodeStats::default(),
        }
    }

    pub fn episode(&self) -> u64 {
        self.episode
    }

    pub fn agents(&self) -> &[AgentEpisodeStats] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&AgentEpisodeStats> {
        self.agents.get(id)
    }

    pub fn global(&self) -> &GlobalEpisodeStats {
        &self.global
    }

    /// Clears every metric and tags the collector with a new episode number
    pub fn begin_episode(&mut self, episode: u64) {
        self.episode = episode;
        for agent in &mut self.agents {
            agent.clear();
        }
        self.global = GlobalEpisodeStats::default();
    }

    /// Samples positions once per tick
    pub fn record_tick(&mut self, agents: &[AgentState], targets: &[Target], dt: f32, elapsed: f32) {
        self.global.duration = elapsed;

        for (stats, agent) in self.agents.iter_mut().zip(agents) {
            let moved = stats.last_position.map_or(0.0, |p| planar_distance(&p, &agent.position));
            stats.last_position = Some(agent.position);
            stats.distance_traveled += moved;

            let speed = if dt > 0.0 { moved / dt } else { 0.0 };
            stats.speed.push(speed);
            if speed < IDLE_SPEED {
                stats.idle_time += dt;
            }

            let peer_distances: Vec<f32> = agents
                .iter()
                .filter(|other| other.id != agent.id)
                .map(|other| planar_distance(&other.position, &agent.position))
                .collect();
            if !peer_distances.is_empty() {
                stats.distance_from_peers.push(peer_distances.iter().sum::<f32>() / peer_distances.len() as f32);
                if peer_distances.iter().any(|d| *d <= NEAR_PEER_DISTANCE) {
                    stats.time_near_peers += dt;
                }
            }

            let target_distances: Vec<f32> = targets
                .iter()
                .filter(|t| t.is_alive())
                .map(|t| planar_distance(&t.position, &agent.position))
                .collect();
            if !target_distances.is_empty() {
                stats
                    .distance_from_targets
                    .push(target_distances.iter().sum::<f32>() / target_distances.len() as f32);
            }
        }
    }

    pub fn record_hit(&mut self, agent: AgentId, defeated: bool) {
        if let Some(stats) = self.agents.get_mut(agent) {
            stats.hits_inflicted += 1;
            if defeated {
                stats.targets_defeated += 1;
            }
        }
    }

    pub fn record_peer_collision(&mut self, agent: AgentId) {
        if let Some(stats) = self.agents.get_mut(agent) {
            stats.peer_collisions += 1;
        }
    }

    pub fn record_key_grab(&mut self, agent: AgentId, elapsed: f32) {
        if let Some(stats) = self.agents.get_mut(agent) {
            stats.has_key = true;
            stats.time_to_find_key = Some(elapsed);
        }
        self.global.time_to_grab_key.get_or_insert(elapsed);
    }

    pub fn record_all_defeated(&mut self, elapsed: f32) {
        self.global.time_to_defeat_all_targets.get_or_insert(elapsed);
    }

    pub fn record_outcome(&mut self, outcome: EpisodeOutcome, elapsed: f32) {
        self.global.outcome = Some(outcome);
        self.global.duration = elapsed;
        if outcome == EpisodeOutcome::Won {
            self.global.time_of_escape = Some(elapsed);
        }
    }

    pub fn agent_rows(&self) -> Vec<AgentEpisodeRow> {
        self.agents
            .iter()
            .map(|s| AgentEpisodeRow {
                episode: self.episode,
                personality_name: s.personality_name.clone(),
                hits_inflicted: s.hits_inflicted,
                targets_defeated: s.targets_defeated,
                has_key: u8::from(s.has_key),
                time_to_find_key: s.time_to_find_key.unwrap_or(-1.0),
                peer_collisions: s.peer_collisions,
                distance_traveled: s.distance_traveled,
                mean_speed: s.speed.mean(),
                mean_distance_from_peers: s.distance_from_peers.mean(),
                mean_distance_from_targets: s.distance_from_targets.mean(),
                idle_time: s.idle_time,
                time_near_peers: s.time_near_peers,
            })
            .collect()
    }

    pub fn global_row(&self) -> GlobalEpisodeRow {
        let g = &self.global;
        let time_from_grab_to_escape = match (g.time_to_grab_key, g.time_of_escape) {
            (Some(grab), Some(escape)) => escape - grab,
            _ => -1.0,
        };
        GlobalEpisodeRow {
            episode: self.episode,
            win: u8::from(g.outcome == Some(EpisodeOutcome::Won)),
            failure_reason: g.outcome.and_then(|o| o.failure_reason()).map(|r| r.to_string()),
            episode_duration: g.duration,
            time_to_defeat_all_targets: g.time_to_defeat_all_targets.unwrap_or(-1.0),
            time_to_grab_key: g.time_to_grab_key.unwrap_or(-1.0),
            time_from_grab_to_escape,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::phase::FailureReason;
    use crate::models::Personality;
    use std::sync::Arc;

    fn agents(points: &[(f32, f32)]) -> Vec<AgentState> {
        let p = Arc::new(Personality::neutral("n"));
        points
            .iter()
            .enumerate()
            .map(|(i, (x, z))| {
                let mut a = AgentState::new(i, p.clone(), "N");
                a.position = Vec3::new(*x, 0.3, *z);
                a
            })
            .collect()
    }

    #[test]
    fn test_running_mean() {
        let mut m = RunningMean::default();
        assert_eq!(m.mean(), 0.0);
        m.push(1.0);
        m.push(3.0);
        m.push(f32::NAN);
        assert_eq!(m.count(), 2);
        assert!((m.mean() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_movement_metrics() {
        let mut c = StatsCollector::new(["a", "b"]);
        c.begin_episode(1);

        let mut world = agents(&[(0.0, 0.0), (0.5, 0.0)]);
        c.record_tick(&world, &[], 0.5, 0.5);
        world[0].position.z = 1.0;
        c.record_tick(&world, &[], 0.5, 1.0);

        let a = c.agent(0).unwrap();
        assert!((a.distance_traveled - 1.0).abs() < 1e-5);
        // First sample is stationary, second moves at 2 m/s
        assert!((a.speed.mean() - 1.0).abs() < 1e-5);
        assert!((a.idle_time - 0.5).abs() < 1e-6);
        assert!((a.time_near_peers - 0.5).abs() < 1e-6);

        let b = c.agent(1).unwrap();
        assert!((b.idle_time - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rows_and_sentinels() {
        let mut c = StatsCollector::new(["a"]);
        c.begin_episode(4);
        c.record_hit(0, false);
        c.record_hit(0, true);
        c.record_all_defeated(10.0);
        c.record_outcome(EpisodeOutcome::Failed(FailureReason::TimerExpired), 40.0);

        let rows = c.agent_rows();
        assert_eq!(rows[0].episode, 4);
        assert_eq!(rows[0].hits_inflicted, 2);
        assert_eq!(rows[0].targets_defeated, 1);
        assert_eq!(rows[0].time_to_find_key, -1.0);

        let g = c.global_row();
        assert_eq!(g.win, 0);
        assert_eq!(g.failure_reason.as_deref(), Some("timer_expired"));
        assert_eq!(g.time_to_defeat_all_targets, 10.0);
        assert_eq!(g.time_to_grab_key, -1.0);
        assert_eq!(g.time_from_grab_to_escape, -1.0);
    }

    #[test]
    fn test_win_timings() {
        let mut c = StatsCollector::new(["a", "b"]);
        c.begin_episode(1);
        c.record_key_grab(1, 12.0);
        c.record_outcome(EpisodeOutcome::Won, 20.0);

        let g = c.global_row();
        assert_eq!(g.win, 1);
        assert!(g.failure_reason.is_none());
        assert!((g.time_from_grab_to_escape - 8.0).abs() < 1e-6);
        assert_eq!(c.agent_rows()[1].has_key, 1);
        assert_eq!(c.agent_rows()[1].time_to_find_key, 12.0);
    }

    #[test]
    fn test_begin_episode_clears_but_keeps_names() {
        let mut c = StatsCollector::new(["hero"]);
        c.begin_episode(1);
        c.record_peer_collision(0);
        c.record_hit(0, true);
        c.begin_episode(2);

        let a = c.agent(0).unwrap();
        assert_eq!(a.personality_name, "hero");
        assert_eq!(a.peer_collisions, 0);
        assert_eq!(a.hits_inflicted, 0);
        assert_eq!(c.episode(), 2);
    }
}

//! # Episode Statistics
//!
//! The collector gathers metrics while an episode runs; at reset the
//! orchestrator flushes one row per agent and one global row to a
//! `StatsSink`. The sink is constructed once per run and handed to the
//! orchestrator, never reached through a global.

mod collector;

pub use collector::{
    AgentEpisodeStats, GlobalEpisodeStats, RunningMean, StatsCollector, IDLE_SPEED, NEAR_PEER_DISTANCE,
};

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One agent's episode; `time_to_find_key` is -1 when never found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentEpisodeRow {
    pub episode: u64,
    pub personality_name: String,
    pub hits_inflicted: u32,
    pub targets_defeated: u32,
    pub has_key: u8,
    pub time_to_find_key: f32,
    pub peer_collisions: u32,
    pub distance_traveled: f32,
    pub mean_speed: f32,
    pub mean_distance_from_peers: f32,
    pub mean_distance_from_targets: f32,
    pub idle_time: f32,
    pub time_near_peers: f32,
}

/// One episode; timings are -1 when the milestone was never reached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalEpisodeRow {
    pub episode: u64,
    pub win: u8,
    pub failure_reason: Option<String>,
    pub episode_duration: f32,
    pub time_to_defeat_all_targets: f32,
    pub time_to_grab_key: f32,
    pub time_from_grab_to_escape: f32,
}

/// Append-only destination for episode rows
pub trait StatsSink: Send {
    fn record_episode(&mut self, agents: &[AgentEpisodeRow], global: &GlobalEpisodeRow) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Discards every row
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStatsSink;

impl StatsSink for NullStatsSink {
    fn record_episode(&mut self, _agents: &[AgentEpisodeRow], _global: &GlobalEpisodeRow) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct StatsLog {
    agents: Vec<AgentEpisodeRow>,
    global: Vec<GlobalEpisodeRow>,
}

/// Keeps rows in memory; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct MemoryStatsSink {
    log: Arc<Mutex<StatsLog>>,
}

impl MemoryStatsSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StatsLog> {
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn agent_rows(&self) -> Vec<AgentEpisodeRow> {
        self.lock().agents.clone()
    }

    pub fn global_rows(&self) -> Vec<GlobalEpisodeRow> {
        self.lock().global.clone()
    }
}

impl StatsSink for MemoryStatsSink {
    fn record_episode(&mut self, agents: &[AgentEpisodeRow], global: &GlobalEpisodeRow) -> Result<()> {
        let mut log = self.lock();
        log.agents.extend_from_slice(agents);
        log.global.push(global.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_clones_share_log() {
        let sink = MemoryStatsSink::new();
        let mut writer: Box<dyn StatsSink> = Box::new(sink.clone());

        let mut collector = StatsCollector::new(["a", "b"]);
        collector.begin_episode(3);
        writer.record_episode(&collector.agent_rows(), &collector.global_row()).unwrap();

        assert_eq!(sink.agent_rows().len(), 2);
        assert_eq!(sink.global_rows().len(), 1);
        assert_eq!(sink.global_rows()[0].episode, 3);
    }

    #[test]
    fn test_row_serializes_camel_case() {
        let collector = StatsCollector::new(["a"]);
        let json = serde_json::to_string(&collector.global_row()).unwrap();
        assert!(json.contains("\"failureReason\":null"));
        assert!(json.contains("\"timeToDefeatAllTargets\":-1.0"));
    }
}

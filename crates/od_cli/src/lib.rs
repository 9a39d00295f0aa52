//! Headless Dungeon Runner
//!
//! CSV statistics sink plus a random-policy episode runner for the
//! `od_cli` binary.

pub mod csv_sink;

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use od_core::engine::phase::FailureReason;
use od_core::stats::StatsSink;
use od_core::{AgentAction, Dungeon, DungeonConfig, EpisodeOutcome, MultiAgentEnvironment};

pub use csv_sink::CsvStatsSink;

/// Uniform random actions, seeded for reproducible runs
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: ChaCha8Rng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Rotation in [-1, 1], forward in [0, 1]
    pub fn act(&mut self, agents: usize) -> Vec<AgentAction> {
        (0..agents)
            .map(|_| AgentAction::new(self.rng.gen_range(-1.0..=1.0), self.rng.gen_range(0.0..=1.0)))
            .collect()
    }
}

/// Run parameters
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub episodes: u32,
    /// Episodes longer than this are cut off and restarted
    pub max_ticks_per_episode: u64,
    pub policy_seed: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { episodes: 10, max_ticks_per_episode: 100_000, policy_seed: 0 }
    }
}

/// Aggregate results of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub episodes: u32,
    pub wins: u32,
    pub timer_failures: u32,
    pub escape_failures: u32,
    /// Episodes cut off at the tick limit
    pub truncated: u32,
    pub total_ticks: u64,
    /// Mean summed individual reward per agent slot
    pub mean_agent_return: Vec<f32>,
    pub mean_group_return: f32,
}

impl RunSummary {
    pub fn win_rate(&self) -> f32 {
        if self.episodes == 0 {
            0.0
        } else {
            self.wins as f32 / self.episodes as f32
        }
    }
}

/// Runs `options.episodes` complete episodes with a random policy
pub fn run_episodes(config: DungeonConfig, sink: Box<dyn StatsSink>, options: &RunOptions) -> Result<RunSummary> {
    let mut dungeon = Dungeon::new(config).context("Failed to build the dungeon")?.with_stats_sink(sink);
    let mut policy = RandomPolicy::new(options.policy_seed);
    let n = dungeon.num_agents();

    let mut summary = RunSummary { mean_agent_return: vec![0.0; n], ..RunSummary::default() };
    let mut group_return = 0.0f32;

    for episode in 0..options.episodes {
        MultiAgentEnvironment::begin_episode(&mut dungeon);
        let mut ticks = 0u64;

        loop {
            let step = dungeon.step(&policy.act(n));
            ticks += 1;
            for (total, r) in summary.mean_agent_return.iter_mut().zip(&step.rewards) {
                *total += r;
            }
            group_return += step.group_reward;

            if step.all_done() {
                match step.outcome {
                    Some(EpisodeOutcome::Won) => summary.wins += 1,
                    Some(EpisodeOutcome::Failed(FailureReason::TimerExpired)) => summary.timer_failures += 1,
                    Some(EpisodeOutcome::Failed(FailureReason::TargetEscaped)) => summary.escape_failures += 1,
                    None => {}
                }
                break;
            }
            if ticks >= options.max_ticks_per_episode {
                warn!("Episode {} cut off after {} ticks", episode + 1, ticks);
                summary.truncated += 1;
                break;
            }
        }

        summary.total_ticks += ticks;
        summary.episodes += 1;
        info!("Episode {} finished in {} ticks ({:?})", episode + 1, ticks, dungeon.outcome());
    }

    dungeon.close().context("Failed to flush episode statistics")?;

    if summary.episodes > 0 {
        let episodes = summary.episodes as f32;
        summary.mean_agent_return.iter_mut().for_each(|r| *r /= episodes);
        summary.mean_group_return = group_return / episodes;
    }
    Ok(summary)
}

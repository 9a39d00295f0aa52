//! Reward Shaping Engine
//!
//! Turns an agent's personality and the live arena state into scalar
//! rewards, one evaluation per trigger event.
//!
//! ## Triggers
//!
//! - Target hit: base hit (+ slay bonus), initiative, bravery, cooperation,
//!   commitment, heroism
//! - Key grab: base grab, embarrassment
//! - Step: time penalty, diligence, socialization, exploration, impatience,
//!   anxiety, recklessness
//! - Wall, obstacle or locked door contact: base bump, self control, panic
//! - Peer contact: self control, politeness, panic
//!
//! Each trigger returns a breakdown of named terms whose `total()` is the
//! reward. The calculator reads an `ArenaSnapshot` plus its own
//! `RewardMemory`, and writes memory once, after every term has been
//! evaluated. Degenerate inputs (no peers, non-finite values, an agent
//! missing from the snapshot) contribute 0.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut calc = AgentRewardCalculator::new(agent_id);
//! let hit = calc.target_hit_reward(&config.rewards, &snapshot, &target, lives_left);
//! agent_reward += hit.total();
//!
//! // Episode reset
//! calc.reset_counters();
//! ```

pub mod collision;
pub mod combat;
mod memory;
pub mod movement;
pub mod social;

pub use memory::RewardMemory;

use tracing::trace;

use crate::config::RewardConfig;
use crate::models::{planar_distance, preferred_radius, AgentId, AgentState};

use super::perception::Sighting;
use super::snapshot::ArenaSnapshot;
use super::target::Target;

// ============================================================================
// Breakdowns
// ============================================================================

/// Named reward terms for one trigger
pub trait RewardBreakdown: std::fmt::Debug {
    fn terms(&self) -> Vec<(&'static str, f32)>;

    /// Sum of every term; non-finite terms count as 0
    fn total(&self) -> f32 {
        self.terms().into_iter().map(|(_, v)| finite(v)).sum()
    }
}

fn finite(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HitBreakdown {
    pub base: f32,
    pub slay: f32,
    pub initiative: f32,
    pub bravery: f32,
    pub cooperation: f32,
    pub commitment: f32,
    pub heroism: f32,
}

impl RewardBreakdown for HitBreakdown {
    fn terms(&self) -> Vec<(&'static str, f32)> {
        vec![
            ("base", self.base),
            ("slay", self.slay),
            ("initiative", self.initiative),
            ("bravery", self.bravery),
            ("cooperation", self.cooperation),
            ("commitment", self.commitment),
            ("heroism", self.heroism),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KeyGrabBreakdown {
    pub base: f32,
    pub embarrassment: f32,
}

impl RewardBreakdown for KeyGrabBreakdown {
    fn terms(&self) -> Vec<(&'static str, f32)> {
        vec![("base", self.base), ("embarrassment", self.embarrassment)]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepBreakdown {
    pub time_penalty: f32,
    pub diligence: f32,
    pub socialization: f32,
    pub exploration: f32,
    pub impatience: f32,
    pub anxiety: f32,
    pub recklessness: f32,
}

impl RewardBreakdown for StepBreakdown {
    fn terms(&self) -> Vec<(&'static str, f32)> {
        vec![
            ("time_penalty", self.time_penalty),
            ("diligence", self.diligence),
            ("socialization", self.socialization),
            ("exploration", self.exploration),
            ("impatience", self.impatience),
            ("anxiety", self.anxiety),
            ("recklessness", self.recklessness),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionBreakdown {
    pub base: f32,
    pub self_control: f32,
    pub politeness: f32,
    pub panic: f32,
}

impl RewardBreakdown for CollisionBreakdown {
    fn terms(&self) -> Vec<(&'static str, f32)> {
        vec![
            ("base", self.base),
            ("self_control", self.self_control),
            ("politeness", self.politeness),
            ("panic", self.panic),
        ]
    }
}

// ============================================================================
// AgentRewardCalculator
// ============================================================================

/// Reward evaluation for one agent
#[derive(Debug, Clone)]
pub struct AgentRewardCalculator {
    agent: AgentId,
    memory: RewardMemory,
}

impl AgentRewardCalculator {
    pub fn new(agent: AgentId) -> Self {
        Self { agent, memory: RewardMemory::default() }
    }

    pub fn agent(&self) -> AgentId {
        self.agent
    }

    pub fn memory(&self) -> &RewardMemory {
        &self.memory
    }

    /// Clears every piece of private memory; call once per episode
    pub fn reset_counters(&mut self) {
        self.memory.clear();
    }

    fn me<'a>(&self, world: &ArenaSnapshot<'a>) -> Option<&'a AgentState> {
        world.agent(self.agent)
    }

    /// Density of peers inside the agent's preferred radius, 0.5 with no peers
    fn social_density(&self, cfg: &RewardConfig, world: &ArenaSnapshot<'_>, me: &AgentState) -> f32 {
        let shaping = &cfg.shaping;
        let radius = preferred_radius(me.personality.extraversion, shaping.introvert_radius, shaping.extrovert_radius);
        world.agent_density_within_radius(self.agent, &me.position, radius).unwrap_or(0.5)
    }

    /// Hit on `target` that left it with `lives_left`
    ///
    /// Updates the last hit time and previous target afterwards.
    pub fn target_hit_reward(
        &mut self,
        cfg: &RewardConfig,
        world: &ArenaSnapshot<'_>,
        target: &Target,
        lives_left: u32,
    ) -> HitBreakdown {
        let Some(me) = self.me(world) else {
            return HitBreakdown::default();
        };
        let p = &me.personality;
        let shaping = &cfg.shaping;

        let density = self.social_density(cfg, world, me);
        let since_last_hit = world.elapsed - self.memory.last_hit_time;
        let same_target = self.memory.previous_target == Some(target.id);
        let slain = lives_left == 0;

        let breakdown = HitBreakdown {
            base: cfg.hit_target,
            slay: if slain { cfg.slay_target } else { 0.0 },
            initiative: social::density_coupled(cfg.hit_target, p.extraversion, density),
            bravery: combat::bravery(p.neuroticism, since_last_hit, shaping),
            cooperation: combat::cooperation(
                cfg.hit_target,
                p.agreeableness,
                target.hit_by_other_than(self.agent),
                shaping.coop_scale,
            ),
            commitment: combat::commitment(
                cfg.hit_target * shaping.commitment_base_hit_percent,
                p.conscientiousness,
                same_target,
            ),
            heroism: if slain { combat::heroism(world.urgency, p.agreeableness, cfg.hit_target) } else { 0.0 },
        };

        self.memory.last_hit_time = world.elapsed;
        self.memory.previous_target = Some(target.id);
        trace!(agent = self.agent, target_id = target.id, ?breakdown, "hit reward");
        breakdown
    }

    /// Key pickup; also seeds the diligence memory at the grab point
    pub fn key_grab_reward(&mut self, cfg: &RewardConfig, world: &ArenaSnapshot<'_>) -> KeyGrabBreakdown {
        let Some(me) = self.me(world) else {
            return KeyGrabBreakdown::default();
        };

        let density = self.social_density(cfg, world, me);
        let breakdown = KeyGrabBreakdown {
            base: cfg.grab_key,
            embarrassment: social::density_coupled(cfg.grab_key, me.personality.extraversion, density),
        };

        self.memory.key_grab_position = Some(me.position);
        self.memory.max_distance_from_grab = 0.0;
        self.memory.previous_distance_from_exit = world.normalized_distance_from_exit(&me.position);
        breakdown
    }

    /// Per-tick reward; `threat` is what perception reports for targets
    pub fn step_reward(&mut self, cfg: &RewardConfig, world: &ArenaSnapshot<'_>, threat: Sighting) -> StepBreakdown {
        let Some(me) = self.me(world) else {
            return StepBreakdown::default();
        };
        let p = &me.personality;
        let shaping = &cfg.shaping;
        let forward = me.forward_speed;
        let contact = threat.contact();

        // Diligence reads memory; the writes are collected and applied last
        let mut next_distance_from_exit = None;
        let mut next_max_from_grab = None;
        let diligence = if !me.has_key {
            0.0
        } else if p.conscientiousness > 0.0 {
            let distance = world.normalized_distance_from_exit(&me.position);
            next_distance_from_exit = Some(distance);
            movement::diligence(
                p.conscientiousness,
                self.memory.previous_distance_from_exit,
                distance,
                shaping.diligence_scale,
            )
        } else {
            match self.memory.key_grab_position {
                Some(grab) => {
                    let distance = planar_distance(&me.position, &grab);
                    let gain = distance - self.memory.max_distance_from_grab;
                    if gain > 0.0 {
                        next_max_from_grab = Some(distance);
                    }
                    movement::procrastination(p.conscientiousness, gain, shaping.diligence_scale)
                }
                None => 0.0,
            }
        };

        let radius = preferred_radius(p.extraversion, shaping.introvert_radius, shaping.extrovert_radius);
        let team_error = world.distance_from_team(self.agent, &me.position).map(|d| (d - radius).abs());
        let socialization = match (self.memory.previous_team_error, team_error) {
            (Some(previous), Some(error)) => social::socialization(p.extraversion, previous, error),
            _ => 0.0,
        };

        let breakdown = StepBreakdown {
            time_penalty: cfg.step_penalty,
            diligence,
            socialization,
            exploration: movement::exploration(
                p.openness,
                forward,
                threat.is_visible(),
                me.targets_alive,
                shaping.exploration_scale,
            ),
            impatience: movement::impatience(shaping.impatience_scale, p.conscientiousness, forward, contact),
            anxiety: movement::anxiety(shaping.anxiety_scale, p.neuroticism, contact, world.max_distance),
            recklessness: movement::recklessness(
                p.neuroticism,
                forward,
                world.urgency,
                shaping.recklessness_urgency_pivot,
                shaping.recklessness_scale,
            ),
        };

        if let Some(d) = next_distance_from_exit {
            self.memory.previous_distance_from_exit = d;
        }
        if let Some(d) = next_max_from_grab {
            self.memory.max_distance_from_grab = d;
        }
        self.memory.previous_team_error = team_error;
        breakdown
    }

    /// Bump into a wall, an obstacle or the locked door
    pub fn obstacle_hit_reward(&self, cfg: &RewardConfig, world: &ArenaSnapshot<'_>) -> CollisionBreakdown {
        let Some(me) = self.me(world) else {
            return CollisionBreakdown::default();
        };
        let shaping = &cfg.shaping;
        CollisionBreakdown {
            base: cfg.hit_wall,
            self_control: collision::self_control(shaping.self_control_scale, me.personality.conscientiousness),
            politeness: 0.0,
            panic: collision::panic(shaping.panic_scale, me.personality.neuroticism, world.urgency),
        }
    }

    /// Bump into another agent
    pub fn peer_hit_reward(&self, cfg: &RewardConfig, world: &ArenaSnapshot<'_>) -> CollisionBreakdown {
        let Some(me) = self.me(world) else {
            return CollisionBreakdown::default();
        };
        let shaping = &cfg.shaping;
        CollisionBreakdown {
            base: 0.0,
            self_control: collision::self_control(shaping.self_control_scale, me.personality.conscientiousness),
            politeness: collision::politeness(shaping.politeness_scale, me.personality.agreeableness),
            panic: collision::panic(shaping.panic_scale, me.personality.neuroticism, world.urgency),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Episode Orchestrator
//!
//! Owns every agent, target and landmark of the arena and drives the
//! episode phase machine one fixed tick at a time.
//!
//! ## Phases
//!
//! ```text
//! Combat --all targets down--> KeyPhase --key grabbed--> EscapePhase --door--> Won
//!    \__________________________\__________________________\--timer / lair--> Failed
//! ```
//!
//! ## Tick order
//!
//! 1. Escape timer (only if it was already running)
//! 2. Movement collaborator, then contact dispatch through the handler
//!    table in the order the collaborator returns them (`KinematicMovement`
//!    sorts by agent id, then collision kind); entity events are drained
//!    after each contact
//! 3. Step rewards for every agent
//! 4. Target navigation toward the lair
//! 5. Statistics sample
//!
//! A terminal transition stops the tick. The reset procedure runs at the
//! start of the next tick (or on `begin_episode`), so the terminal step
//! still reports the final rewards.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace, warn};

use crate::config::{ArenaConfig, DungeonConfig};
use crate::error::{DungeonError, Result};
use crate::models::geometry::normalize_angle;
use crate::models::{AgentAction, AgentId, AgentState, Rect, TargetId, Vec3};
use crate::stats::{NullStatsSink, StatsCollector, StatsSink};

use super::collision::{AgentContact, Collision, CollisionKind};
use super::door::Door;
use super::events::{EpisodeEvent, EventQueue, VisualCue};
use super::movement::{Colliders, KinematicMovement, Movement, Navigator, StraightLineNavigator};
use super::perception::{ConePerception, Perception, PerceptionTag, Sighting};
use super::phase::{EpisodeOutcome, EpisodePhase, FailureReason};
use super::reward::{AgentRewardCalculator, RewardBreakdown};
use super::snapshot::ArenaSnapshot;
use super::spawn::{solve_door, solve_lair, DoorLayout, LairLayout, SpawnSolver, SphereBlockers};
use super::target::Target;
use super::timer::EscapeTimer;

// ============================================================================
// Arena state
// ============================================================================

/// Everything a snapshot is built from, kept apart from the reward
/// calculators so both can be borrowed at once
#[derive(Debug, Clone)]
struct Arena {
    agents: Vec<AgentState>,
    targets: Vec<Target>,
    key: Option<Vec3>,
    door: Door,
    lair: LairLayout,
    elapsed: f32,
    urgency: f32,
}

impl Arena {
    fn snapshot<'a>(&'a self, cfg: &'a ArenaConfig) -> ArenaSnapshot<'a> {
        ArenaSnapshot {
            agents: &self.agents,
            targets: &self.targets,
            obstacles: &cfg.obstacles,
            floor: cfg.floor,
            key: self.key,
            door: self.door.position(),
            door_unlocked: self.door.is_unlocked(),
            max_distance: cfg.max_distance(),
            urgency: self.urgency,
            elapsed: self.elapsed,
        }
    }
}

/// Result of one orchestrator tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    /// Individual reward per agent for this tick
    pub rewards: Vec<f32>,
    /// Team reward shared by every agent for this tick
    pub group_reward: f32,
    pub phase: EpisodePhase,
    /// Set on the tick the episode ends
    pub outcome: Option<EpisodeOutcome>,
}

type CollisionHandler = fn(&mut Dungeon, AgentId, Collision);

/// Contact handlers, indexed by `CollisionKind`
const COLLISION_HANDLERS: [CollisionHandler; CollisionKind::COUNT] = [
    Dungeon::on_wall_contact,
    Dungeon::on_wall_contact,
    Dungeon::on_door_contact,
    Dungeon::on_key_contact,
    Dungeon::on_target_contact,
    Dungeon::on_peer_contact,
];

// ============================================================================
// Dungeon
// ============================================================================

pub struct Dungeon {
    config: DungeonConfig,
    rng: ChaCha8Rng,
    arena: Arena,
    calculators: Vec<AgentRewardCalculator>,
    spawn: SpawnSolver,

    phase: EpisodePhase,
    outcome: Option<EpisodeOutcome>,
    needs_reset: bool,
    remaining_targets: usize,
    key_grabbed: bool,
    timer: EscapeTimer,
    episode: u64,
    tick: u64,

    rewards: Vec<f32>,
    group_reward: f32,
    episode_group_reward: f32,

    events: EventQueue,
    visuals: Vec<VisualCue>,
    stats: StatsCollector,
    stats_flushed: bool,
    sink: Box<dyn StatsSink>,

    perception: Box<dyn Perception + Send>,
    movement: Box<dyn Movement + Send>,
    navigator: Box<dyn Navigator + Send>,
}

impl std::fmt::Debug for Dungeon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dungeon")
            .field("episode", &self.episode)
            .field("tick", &self.tick)
            .field("phase", &self.phase)
            .field("remaining_targets", &self.remaining_targets)
            .field("key_grabbed", &self.key_grabbed)
            .finish()
    }
}

impl Dungeon {
    /// Validates `config`, builds the arena and runs the startup reset
    ///
    /// Uses the reference collaborators and discards statistics; swap them
    /// with the `with_*` methods.
    pub fn new(config: DungeonConfig) -> Result<Self> {
        config.validate()?;

        let n = config.episode.number_of_agents;
        let agents: Vec<AgentState> = config
            .personalities
            .iter()
            .take(n)
            .enumerate()
            .map(|(id, settings)| {
                AgentState::new(id, std::sync::Arc::new(settings.personality.clone()), settings.behavior_name.clone())
            })
            .collect();
        let targets = (0..config.episode.number_of_targets)
            .map(|id| Target::new(id, config.episode.target_lives))
            .collect();
        let names: Vec<String> = agents.iter().map(|a| a.personality.name.clone()).collect();

        let mut rng = ChaCha8Rng::seed_from_u64(config.episode.seed);
        let door = solve_door(&mut rng, &config.arena);
        let lair = solve_lair(&mut rng, &config.arena);

        let movement = KinematicMovement::from_config(&config.episode, &config.arena);
        let navigator = StraightLineNavigator::new(config.episode.target_speed, config.arena.lair_contact_radius);

        let mut dungeon = Self {
            spawn: SpawnSolver::new(&config.spawn, config.arena.safe_spawn_radius),
            rng,
            arena: Arena {
                agents,
                targets,
                key: None,
                door: Door::new(door),
                lair,
                elapsed: 0.0,
                urgency: 0.0,
            },
            calculators: (0..n).map(AgentRewardCalculator::new).collect(),
            phase: EpisodePhase::Combat,
            outcome: None,
            needs_reset: false,
            remaining_targets: config.episode.number_of_targets,
            key_grabbed: false,
            timer: EscapeTimer::new(),
            episode: 0,
            tick: 0,
            rewards: vec![0.0; n],
            group_reward: 0.0,
            episode_group_reward: 0.0,
            events: EventQueue::new(),
            visuals: Vec::new(),
            stats: StatsCollector::new(names),
            stats_flushed: false,
            sink: Box::new(NullStatsSink),
            perception: Box::new(ConePerception::default()),
            movement: Box::new(movement),
            navigator: Box::new(navigator),
            config,
        };

        dungeon.reset();
        Ok(dungeon)
    }

    pub fn with_stats_sink(mut self, sink: Box<dyn StatsSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_perception(mut self, perception: Box<dyn Perception + Send>) -> Self {
        self.perception = perception;
        self
    }

    pub fn with_movement(mut self, mut movement: Box<dyn Movement + Send>) -> Self {
        movement.reset();
        self.movement = movement;
        self
    }

    pub fn with_navigator(mut self, navigator: Box<dyn Navigator + Send>) -> Self {
        self.navigator = navigator;
        self
    }

    // ========== Accessors ==========

    pub fn config(&self) -> &DungeonConfig {
        &self.config
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<EpisodeOutcome> {
        self.outcome
    }

    pub fn episode(&self) -> u64 {
        self.episode
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn elapsed(&self) -> f32 {
        self.arena.elapsed
    }

    pub fn urgency(&self) -> f32 {
        self.arena.urgency
    }

    pub fn agents(&self) -> &[AgentState] {
        &self.arena.agents
    }

    pub fn targets(&self) -> &[Target] {
        &self.arena.targets
    }

    pub fn remaining_targets(&self) -> usize {
        self.remaining_targets
    }

    /// Key position while it lies in the arena
    pub fn key_position(&self) -> Option<Vec3> {
        self.arena.key
    }

    pub fn key_grabbed(&self) -> bool {
        self.key_grabbed
    }

    pub fn door(&self) -> &DoorLayout {
        self.arena.door.layout()
    }

    pub fn door_unlocked(&self) -> bool {
        self.arena.door.is_unlocked()
    }

    pub fn lair(&self) -> &LairLayout {
        &self.arena.lair
    }

    pub fn timer(&self) -> &EscapeTimer {
        &self.timer
    }

    pub fn calculator(&self, agent: AgentId) -> Option<&AgentRewardCalculator> {
        self.calculators.get(agent)
    }

    /// Group reward accumulated since the last reset
    pub fn episode_group_reward(&self) -> f32 {
        self.episode_group_reward
    }

    pub fn stats(&self) -> &StatsCollector {
        &self.stats
    }

    /// Whether the next tick starts with a reset
    pub fn needs_reset(&self) -> bool {
        self.needs_reset
    }

    pub fn snapshot(&self) -> ArenaSnapshot<'_> {
        self.arena.snapshot(&self.config.arena)
    }

    /// What `agent` currently sees of each tag
    pub fn perceive(&self, agent: AgentId, tag: PerceptionTag) -> Sighting {
        match self.arena.agents.get(agent) {
            Some(viewer) => self.perception.can_see(viewer, tag, &self.snapshot()),
            None => Sighting::unseen(),
        }
    }

    /// Visual cues requested since the last drain
    pub fn drain_visuals(&mut self) -> Vec<VisualCue> {
        self.visuals.extend(self.events.drain_visuals());
        std::mem::take(&mut self.visuals)
    }

    // ========== Reset ==========

    /// Runs the reset procedure unless a fresh episode has not ticked yet
    pub fn begin_episode(&mut self) {
        if self.needs_reset || self.tick > 0 {
            self.reset();
        }
    }

    /// Reset procedure; also run once at construction
    pub fn reset(&mut self) {
        self.flush_stats();

        self.timer.reset();
        if self.arena.key.take().is_some() {
            trace!("removing live key");
        }
        self.key_grabbed = false;
        self.remaining_targets = self.config.episode.number_of_targets;

        for (agent, calc) in self.arena.agents.iter_mut().zip(&mut self.calculators) {
            agent.reset_episode();
            calc.reset_counters();
        }
        self.movement.reset();
        self.events.clear_events();

        let arena_cfg = &self.config.arena;
        let inner = arena_cfg.floor.inset(arena_cfg.wall_margin);
        let spawn_y = arena_cfg.floor_y + arena_cfg.spawn_height_offset;

        self.arena.door.relock(solve_door(&mut self.rng, arena_cfg));
        self.arena.lair = solve_lair(&mut self.rng, arena_cfg);

        let mut blockers = SphereBlockers::from_obstacles(&arena_cfg.obstacles, spawn_y);
        blockers.push(self.arena.door.position(), arena_cfg.door_contact_radius);
        blockers.push(self.arena.lair.position, arena_cfg.lair_contact_radius);

        let n = self.arena.agents.len();
        let agent_positions = self.spawn.place_relaxed(&mut self.rng, &inner, spawn_y, n, &blockers, "agent");
        for (agent, position) in self.arena.agents.iter_mut().zip(&agent_positions) {
            agent.position = *position;
            agent.heading = normalize_angle(self.rng.gen_range(0.0..360.0));
        }
        blockers.extend_points(&agent_positions, arena_cfg.agent_radius);

        let region = intersect(&self.arena.lair.companion_region, &inner);
        let m = self.arena.targets.len();
        let target_positions = self.spawn.place_relaxed(&mut self.rng, &region, spawn_y, m, &blockers, "target");
        let lair = self.arena.lair.position;
        for (target, position) in self.arena.targets.iter_mut().zip(&target_positions) {
            target.set_lair(lair);
            target.resurrect(*position);
        }

        self.arena.elapsed = 0.0;
        self.arena.urgency = 0.0;

        self.phase = EpisodePhase::Combat;
        self.outcome = None;
        self.needs_reset = false;
        self.tick = 0;
        self.group_reward = 0.0;
        self.episode_group_reward = 0.0;
        self.rewards.iter_mut().for_each(|r| *r = 0.0);

        self.episode += 1;
        self.stats.begin_episode(self.episode);
        self.stats_flushed = false;
        info!(
            "Episode {} reset: door {:?}, lair {:?}",
            self.episode, self.arena.door.layout().side, self.arena.lair.corner
        );
    }

    fn flush_stats(&mut self) {
        if self.episode == 0 || self.stats_flushed || !self.config.episode.compute_episode_stats {
            return;
        }
        self.stats_flushed = true;
        let agents = self.stats.agent_rows();
        let global = self.stats.global_row();
        if let Err(err) = self.sink.record_episode(&agents, &global) {
            warn!("Failed to record statistics for episode {}: {}", self.episode, err);
        }
    }

    /// Flushes the episode in progress and the sink
    pub fn close(&mut self) -> Result<()> {
        self.flush_stats();
        self.sink.flush()
    }

    // ========== Tick ==========

    /// Advances the simulation one fixed tick
    ///
    /// `actions[i]` drives agent `i`; missing actions count as idle.
    pub fn tick(&mut self, actions: &[AgentAction]) -> TickOutcome {
        if self.needs_reset {
            self.reset();
        }

        let dt = self.config.episode.tick_seconds;
        self.rewards.iter_mut().for_each(|r| *r = 0.0);
        self.group_reward = 0.0;
        self.tick += 1;
        self.arena.elapsed += dt;

        if self.timer.is_running() && self.timer.tick(dt) {
            warn!("Escape timer expired in episode {}", self.episode);
            self.fail(FailureReason::TimerExpired);
        }

        if !self.phase.is_terminal() {
            self.update_urgency();
            self.advance_agents(actions, dt);
        }
        if !self.phase.is_terminal() {
            self.apply_step_rewards();
            self.advance_targets(dt);
        }

        self.update_urgency();
        self.stats.record_tick(&self.arena.agents, &self.arena.targets, dt, self.arena.elapsed);

        TickOutcome {
            rewards: self.rewards.clone(),
            group_reward: self.group_reward,
            phase: self.phase,
            outcome: if self.phase.is_terminal() { self.outcome } else { None },
        }
    }

    fn advance_agents(&mut self, actions: &[AgentAction], dt: f32) {
        let colliders = Colliders {
            floor: self.config.arena.floor,
            obstacles: &self.config.arena.obstacles,
            targets: &self.arena.targets,
            key: self.arena.key,
            door: self.arena.door.position(),
        };
        let contacts = self.movement.advance(&mut self.arena.agents, actions, &colliders, dt);

        for contact in contacts {
            if self.phase.is_terminal() {
                break;
            }
            trace!("Agent {} contact {:?}", contact.agent, contact.collision);
            if let Err(err) = self.check_contact(contact) {
                debug!("Discarding contact: {}", err);
                continue;
            }
            let handler = COLLISION_HANDLERS[contact.collision.kind().index()];
            handler(self, contact.agent, contact.collision);
            self.drain_events();
        }
    }

    fn apply_step_rewards(&mut self) {
        let snapshot = self.arena.snapshot(&self.config.arena);
        for (i, calc) in self.calculators.iter_mut().enumerate() {
            let Some(agent) = self.arena.agents.get(i) else { continue };
            let threat = self.perception.can_see(agent, PerceptionTag::Target, &snapshot);
            let step = calc.step_reward(&self.config.rewards, &snapshot, threat);
            self.rewards[i] += step.total();
        }
    }

    fn advance_targets(&mut self, dt: f32) {
        if self.phase != EpisodePhase::Combat {
            return;
        }
        for target in self.arena.targets.iter_mut().filter(|t| t.is_alive()) {
            let lair = target.lair();
            if self.navigator.advance(&mut target.position, &lair, dt) {
                target.reach_lair(&mut self.events);
            }
        }
        self.drain_events();
    }

    /// Urgency in [0, 1]: the escape timer once it runs, otherwise the
    /// closest call of any living target to its lair
    fn update_urgency(&mut self) {
        let urgency = match self.phase {
            EpisodePhase::KeyPhase | EpisodePhase::EscapePhase => self.timer.fraction_elapsed(),
            _ => self.arena.targets.iter().map(|t| t.lair_progress()).fold(0.0f32, f32::max),
        };
        self.arena.urgency = urgency.clamp(0.0, 1.0);
    }

    // ========== Contact handlers ==========

    /// Rejects contacts that name a missing entity or one that is already gone
    fn check_contact(&self, contact: AgentContact) -> Result<()> {
        let AgentContact { agent, collision } = contact;
        let stale = |what: String| -> Result<()> { Err(DungeonError::InconsistentState(what)) };

        if agent >= self.arena.agents.len() {
            return stale(format!("contact {:?} from unknown agent {}", collision, agent));
        }
        match collision {
            Collision::Target(id) => match self.arena.targets.get(id) {
                None => stale(format!("agent {} touched unknown target {}", agent, id)),
                Some(t) if !t.is_alive() => stale(format!("agent {} hit defeated target {}", agent, id)),
                Some(_) => Ok(()),
            },
            Collision::Peer(other) if other >= self.arena.agents.len() => {
                stale(format!("agent {} touched unknown peer {}", agent, other))
            }
            Collision::Key if self.phase != EpisodePhase::KeyPhase || self.arena.key.is_none() => {
                stale(format!("agent {} touched a key that is already gone", agent))
            }
            _ => Ok(()),
        }
    }

    fn on_wall_contact(&mut self, agent: AgentId, _collision: Collision) {
        let snapshot = self.arena.snapshot(&self.config.arena);
        let Some(calc) = self.calculators.get(agent) else { return };
        let bump = calc.obstacle_hit_reward(&self.config.rewards, &snapshot);
        self.rewards[agent] += bump.total();
    }

    fn on_peer_contact(&mut self, agent: AgentId, _collision: Collision) {
        let snapshot = self.arena.snapshot(&self.config.arena);
        let Some(calc) = self.calculators.get(agent) else { return };
        let bump = calc.peer_hit_reward(&self.config.rewards, &snapshot);
        self.rewards[agent] += bump.total();
        self.stats.record_peer_collision(agent);
    }

    fn on_target_contact(&mut self, agent: AgentId, collision: Collision) {
        let Collision::Target(id) = collision else { return };
        let Some(target) = self.arena.targets.get_mut(id) else { return };
        let lives_left = target.take_hit(agent, &mut self.events);
        if let Some(a) = self.arena.agents.get_mut(agent) {
            a.hits_inflicted += 1;
        }

        let snapshot = self.arena.snapshot(&self.config.arena);
        let Some(calc) = self.calculators.get_mut(agent) else { return };
        let hit = calc.target_hit_reward(&self.config.rewards, &snapshot, &self.arena.targets[id], lives_left);
        debug!("Agent {} hit target {} ({} lives left): {:?}", agent, id, lives_left, hit);
        self.rewards[agent] += hit.total();
        self.stats.record_hit(agent, lives_left == 0);
    }

    fn on_key_contact(&mut self, agent: AgentId, _collision: Collision) {
        let snapshot = self.arena.snapshot(&self.config.arena);
        let Some(calc) = self.calculators.get_mut(agent) else { return };
        let grab = calc.key_grab_reward(&self.config.rewards, &snapshot);
        self.rewards[agent] += grab.total();

        self.arena.key = None;
        self.key_grabbed = true;
        if let Some(a) = self.arena.agents.get_mut(agent) {
            a.has_key = true;
        }
        self.stats.record_key_grab(agent, self.arena.elapsed);
        self.set_phase(EpisodePhase::EscapePhase);
        info!("Agent {} grabbed the key at {:.2}s", agent, self.arena.elapsed);
    }

    fn on_door_contact(&mut self, agent: AgentId, collision: Collision) {
        let carrying = self.phase == EpisodePhase::EscapePhase
            && self.arena.agents.get(agent).is_some_and(|a| a.has_key);
        if !self.arena.door.touch(agent, carrying, &mut self.events) {
            self.on_wall_contact(agent, collision);
        }
    }

    // ========== Events ==========

    fn drain_events(&mut self) {
        self.visuals.extend(self.events.drain_visuals());
        while let Some(event) = self.events.pop() {
            if self.phase.is_terminal() {
                trace!("Dropping {:?} after episode end", event);
                continue;
            }
            match event {
                EpisodeEvent::TargetDefeated { target, by } => self.on_target_defeated(target, by),
                EpisodeEvent::TargetEscaped { target } => {
                    warn!("Target {} reached its lair in episode {}", target, self.episode);
                    self.fail(FailureReason::TargetEscaped);
                }
                EpisodeEvent::DoorUnlocked { by } => debug!("Door unlocked by agent {}", by),
                EpisodeEvent::AgentEscaped { agent } => self.win(agent),
            }
        }
    }

    fn on_target_defeated(&mut self, target: TargetId, by: AgentId) {
        self.remaining_targets = self.remaining_targets.saturating_sub(1);
        self.add_group_reward(self.config.group_rewards.target_slain);
        debug!("Target {} defeated by agent {}, {} remaining", target, by, self.remaining_targets);

        if self.remaining_targets == 0 && self.phase == EpisodePhase::Combat {
            self.enter_key_phase();
        }
    }

    fn enter_key_phase(&mut self) {
        self.timer.start(self.config.episode.time_to_escape);

        let arena_cfg = &self.config.arena;
        let inner = arena_cfg.floor.inset(arena_cfg.wall_margin);
        let spawn_y = arena_cfg.floor_y + arena_cfg.spawn_height_offset;
        let mut blockers = SphereBlockers::from_obstacles(&arena_cfg.obstacles, spawn_y);
        blockers.push(self.arena.door.position(), arena_cfg.door_contact_radius);
        for agent in &self.arena.agents {
            blockers.push(agent.position, arena_cfg.agent_radius);
        }
        let key = self.spawn.place_relaxed(&mut self.rng, &inner, spawn_y, 1, &blockers, "key");
        self.arena.key = key.first().copied();

        for agent in &mut self.arena.agents {
            agent.targets_alive = false;
        }
        self.add_group_reward(self.config.group_rewards.kill_all_bonus);
        self.stats.record_all_defeated(self.arena.elapsed);
        self.set_phase(EpisodePhase::KeyPhase);
        info!("All targets defeated at {:.2}s, key spawned", self.arena.elapsed);
    }

    fn fail(&mut self, reason: FailureReason) {
        if self.phase.is_terminal() {
            return;
        }
        self.add_group_reward(-self.config.group_rewards.fail_penalty);
        self.finish(EpisodeOutcome::Failed(reason), VisualCue::Failure);
    }

    fn win(&mut self, agent: AgentId) {
        if self.phase.is_terminal() {
            return;
        }
        self.add_group_reward(self.config.group_rewards.escape);
        info!("Agent {} escaped", agent);
        self.finish(EpisodeOutcome::Won, VisualCue::Success);
    }

    fn finish(&mut self, outcome: EpisodeOutcome, cue: VisualCue) {
        self.timer.stop();
        self.visuals.push(cue);
        self.outcome = Some(outcome);
        self.needs_reset = true;
        self.stats.record_outcome(outcome, self.arena.elapsed);
        self.set_phase(outcome.phase());
        info!(
            "Episode {} ended after {:.2}s: {:?} (group reward {:.3})",
            self.episode, self.arena.elapsed, outcome, self.episode_group_reward
        );
    }

    fn set_phase(&mut self, phase: EpisodePhase) {
        debug!("Phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn add_group_reward(&mut self, amount: f32) {
        self.group_reward += amount;
        self.episode_group_reward += amount;
    }
}

/// Overlap of two rectangles; falls back to `a` when they do not overlap
fn intersect(a: &Rect, b: &Rect) -> Rect {
    let r = Rect::new(a.min_x.max(b.min_x), a.max_x.min(b.max_x), a.min_z.max(b.min_z), a.max_z.min(b.max_z));
    if r.is_empty() {
        *a
    } else {
        r
    }
}

// ============================================================================
// Tests
// ============================================================================

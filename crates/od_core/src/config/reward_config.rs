//! Reward Configuration
//!
//! Named constant tables loaded once per run. `RewardConfig` holds the
//! per-agent base rewards and the shaping constants, `GroupRewardConfig`
//! the team-wide outcome rewards.

use serde::{Deserialize, Serialize};

/// Per-agent base rewards
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Landing a hit on a target (default: 2.0)
    pub hit_target: f32,
    /// Landing the blow that defeats a target (default: 5.0)
    pub slay_target: f32,
    /// Picking up the key (default: 2.0)
    pub grab_key: f32,
    /// Bumping into a wall, obstacle or locked door (default: -0.1)
    pub hit_wall: f32,
    /// Added to every agent each tick (default: -0.001)
    pub step_penalty: f32,
    /// Personality shaping constants
    pub shaping: ShapingConfig,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            hit_target: 2.0,
            slay_target: 5.0,
            grab_key: 2.0,
            hit_wall: -0.1,
            step_penalty: -0.001,
            shaping: ShapingConfig::default(),
        }
    }
}

/// Team-wide rewards shared by every agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupRewardConfig {
    /// Each defeated target (default: 0.0)
    pub target_slain: f32,
    /// Last target defeated (default: 5.0)
    pub kill_all_bonus: f32,
    /// Agent with the key escapes (default: 10.0)
    pub escape: f32,
    /// Magnitude subtracted on failure (default: 10.0)
    pub fail_penalty: f32,
}

impl Default for GroupRewardConfig {
    fn default() -> Self {
        Self { target_slain: 0.0, kill_all_bonus: 5.0, escape: 10.0, fail_penalty: 10.0 }
    }
}

/// Personality shaping constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapingConfig {
    // === Social radii (extraversion) ===
    /// Preferred radius at extraversion = -1 (default: 3.0)
    pub introvert_radius: f32,
    /// Preferred radius at extraversion = +1 (default: 1.0)
    pub extrovert_radius: f32,

    // === Bravery / panic (neuroticism) ===
    /// Seconds after a hit during which another hit counts as panicked (default: 5.0)
    pub bravery_threshold: f32,
    /// Exponent of the panic branch, negative (default: -0.5)
    pub bravery_time_scale: f32,
    /// Panic branch scale (default: 10.0)
    pub bravery_scale: f32,
    /// Calm branch log scale (default: 2.0)
    pub bravery_log_scale: f32,
    /// Subtracted from the panic exponential; `exp(time_scale * threshold)` makes the term continuous (default: 0.0)
    pub bravery_panic_floor: f32,

    // === Cooperation / heroism (agreeableness) ===
    /// Scale for hitting a target others already engaged (default: 0.5)
    pub coop_scale: f32,

    // === Commitment (conscientiousness) ===
    /// Fraction of the hit reward at stake when keeping or switching target (default: 0.2)
    pub commitment_base_hit_percent: f32,

    // === Step terms ===
    /// Diligence (default: 0.1)
    pub diligence_scale: f32,
    /// Exploration (default: 0.001)
    pub exploration_scale: f32,
    /// Impatience, negative (default: -0.02)
    pub impatience_scale: f32,
    /// Anxiety (default: 0.05)
    pub anxiety_scale: f32,
    /// Recklessness (default: 0.001)
    pub recklessness_scale: f32,
    /// Urgency at which speed flips from punished to rewarded (default: 0.5)
    pub recklessness_urgency_pivot: f32,

    // === Collision terms ===
    /// Self control, negative (default: -0.1)
    pub self_control_scale: f32,
    /// Politeness, negative (default: -0.1)
    pub politeness_scale: f32,
    /// Panic (default: 0.1)
    pub panic_scale: f32,
}

impl ShapingConfig {
    /// Panic floor that closes the gap between both bravery branches
    pub fn continuous_bravery_floor(&self) -> f32 {
        (self.bravery_time_scale * self.bravery_threshold).exp()
    }
}

impl Default for ShapingConfig {
    fn default() -> Self {
        Self {
            introvert_radius: 3.0,
            extrovert_radius: 1.0,

            bravery_threshold: 5.0,
            bravery_time_scale: -0.5,
            bravery_scale: 10.0,
            bravery_log_scale: 2.0,
            bravery_panic_floor: 0.0,

            coop_scale: 0.5,
            commitment_base_hit_percent: 0.2,

            diligence_scale: 0.1,
            exploration_scale: 0.001,
            impatience_scale: -0.02,
            anxiety_scale: 0.05,
            recklessness_scale: 0.001,
            recklessness_urgency_pivot: 0.5,

            self_control_scale: -0.1,
            politeness_scale: -0.1,
            panic_scale: 0.1,
        }
    }
}

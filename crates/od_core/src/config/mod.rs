//! # Dungeon Configuration
//!
//! Every tunable constant lives here, grouped by concern and loaded once
//! per run from YAML or JSON.
//!
//! ## Usage
//! ```rust
//! use od_core::config::DungeonConfig;
//!
//! let config = DungeonConfig::default();
//! config.validate().unwrap();
//! ```

mod arena_config;
mod episode_config;
mod reward_config;

pub use arena_config::{ArenaConfig, Obstacle, SpawnConfig};
pub use episode_config::EpisodeConfig;
pub use reward_config::{GroupRewardConfig, RewardConfig, ShapingConfig};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DungeonError, Result};
use crate::models::Personality;

/// Binds an agent slot to a personality and the policy that drives it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalitySettings {
    pub personality: Personality,
    pub behavior_name: String,
}

impl PersonalitySettings {
    pub fn new(personality: Personality, behavior_name: impl Into<String>) -> Self {
        Self { personality, behavior_name: behavior_name.into() }
    }
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DungeonConfig {
    #[serde(default)]
    pub arena: ArenaConfig,
    #[serde(default)]
    pub episode: EpisodeConfig,
    #[serde(default)]
    pub rewards: RewardConfig,
    #[serde(default)]
    pub group_rewards: GroupRewardConfig,
    #[serde(default)]
    pub spawn: SpawnConfig,
    /// One binding per agent slot, in slot order
    pub personalities: Vec<PersonalitySettings>,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            episode: EpisodeConfig::default(),
            rewards: RewardConfig::default(),
            group_rewards: GroupRewardConfig::default(),
            spawn: SpawnConfig::default(),
            personalities: vec![
                PersonalitySettings::new(
                    Personality::new("Hero", 0.6, 0.8, 0.7, 0.9, -0.6),
                    "HeroBehavior",
                ),
                PersonalitySettings::new(
                    Personality::new("Loner", 0.4, -0.5, -0.9, -0.7, 0.2),
                    "LonerBehavior",
                ),
                PersonalitySettings::new(
                    Personality::new("Worrier", -0.3, 0.3, 0.1, 0.5, 0.9),
                    "WorrierBehavior",
                ),
            ],
        }
    }
}

impl DungeonConfig {
    /// Default layout with statistics collection switched on
    pub fn evaluation() -> Self {
        let mut cfg = Self::default();
        cfg.episode.compute_episode_stats = true;
        cfg
    }

    /// Default layout with an explicit seed
    pub fn deterministic(seed: u64) -> Self {
        let mut cfg = Self::default();
        cfg.episode.seed = seed;
        cfg
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(yaml)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads by file extension (`.yaml`, `.yml` or `.json`)
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            Some("json") => Self::from_json_str(&text),
            other => Err(DungeonError::config(format!(
                "unsupported config extension {:?} for {}",
                other,
                path.display()
            ))),
        }
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Rejects configurations the simulation cannot start from
    pub fn validate(&self) -> Result<()> {
        let ep = &self.episode;
        if ep.number_of_agents == 0 {
            return Err(DungeonError::config("number_of_agents must be at least 1"));
        }
        if ep.number_of_targets == 0 {
            return Err(DungeonError::config("number_of_targets must be at least 1"));
        }
        if ep.target_lives == 0 {
            return Err(DungeonError::config("target_lives must be at least 1"));
        }
        if !(ep.time_to_escape >= 0.0) {
            return Err(DungeonError::config("time_to_escape must be non-negative"));
        }
        if !(ep.tick_seconds > 0.0) {
            return Err(DungeonError::config("tick_seconds must be positive"));
        }

        // Every agent slot needs a personality and a behavior binding
        if self.personalities.len() < ep.number_of_agents {
            return Err(DungeonError::config(format!(
                "missing personality binding for agent slot {} ({} bindings for {} agents)",
                self.personalities.len(),
                self.personalities.len(),
                ep.number_of_agents
            )));
        }
        for (slot, settings) in self.personalities.iter().take(ep.number_of_agents).enumerate() {
            if settings.behavior_name.trim().is_empty() {
                return Err(DungeonError::config(format!(
                    "agent slot {} ('{}') has no behavior name",
                    slot, settings.personality.name
                )));
            }
            settings.personality.validate()?;
        }

        let arena = &self.arena;
        let inner = arena.floor.inset(arena.wall_margin);
        if inner.is_empty() || inner.area() <= 0.0 {
            return Err(DungeonError::config("arena floor is smaller than its wall margins"));
        }
        if !(arena.safe_spawn_radius >= 0.0) {
            return Err(DungeonError::config("safe_spawn_radius must be non-negative"));
        }

        let spawn = &self.spawn;
        if spawn.max_attempts == 0 {
            return Err(DungeonError::config("spawn.max_attempts must be at least 1"));
        }
        if !(spawn.relaxation_factor > 0.0 && spawn.relaxation_factor < 1.0) {
            return Err(DungeonError::config("spawn.relaxation_factor must be in (0, 1)"));
        }

        if !(self.group_rewards.fail_penalty >= 0.0) {
            return Err(DungeonError::config("group_rewards.fail_penalty is a magnitude and must be non-negative"));
        }

        Ok(())
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = DungeonConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.personalities.len(), cfg.episode.number_of_agents);
        assert!((cfg.rewards.shaping.bravery_threshold - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_personality_binding_is_fatal() {
        let mut cfg = DungeonConfig::default();
        cfg.personalities.pop();
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, DungeonError::Configuration(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_empty_behavior_name_rejected() {
        let mut cfg = DungeonConfig::default();
        cfg.personalities[1].behavior_name = "  ".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_out_of_range_trait_rejected() {
        let mut cfg = DungeonConfig::default();
        cfg.personalities[0].personality.neuroticism = -1.2;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_arena_too_small_rejected() {
        let mut cfg = DungeonConfig::default();
        cfg.arena.floor = crate::models::Rect::new(0.0, 1.5, 0.0, 1.5);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_yaml_roundtrip_keeps_values() {
        let mut cfg = DungeonConfig::evaluation();
        cfg.episode.time_to_escape = 12.5;
        let yaml = cfg.to_yaml_string().unwrap();
        let parsed = DungeonConfig::from_yaml_str(&yaml).unwrap();
        assert!((parsed.episode.time_to_escape - 12.5).abs() < 1e-6);
        assert!(parsed.episode.compute_episode_stats);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
personalities:
  - personality: { name: A, openness: 0.0, conscientiousness: 0.0, extraversion: 0.0, agreeableness: 0.0, neuroticism: 0.0 }
    behavior_name: A
episode:
  number_of_agents: 1
  number_of_targets: 1
  target_lives: 1
  time_to_escape: 0.0
  tick_seconds: 0.02
  agent_speed: 2.0
  rotation_speed: 180.0
  target_speed: 0.5
  seed: 1
"#;
        let cfg = DungeonConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.episode.number_of_agents, 1);
        assert_eq!(cfg.arena.obstacles.len(), 4);
        assert!((cfg.group_rewards.fail_penalty - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_partial_section_keeps_other_fields() {
        let yaml = r#"
personalities:
  - personality: { name: A, openness: 0.0, conscientiousness: 0.0, extraversion: 0.0, agreeableness: 0.0, neuroticism: 0.0 }
    behavior_name: A
episode:
  number_of_agents: 1
  seed: 9
arena:
  agent_radius: 0.3
rewards:
  hit_target: 3.0
  shaping:
    extrovert_radius: 1.5
"#;
        let cfg = DungeonConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.episode.number_of_agents, 1);
        assert_eq!(cfg.episode.seed, 9);
        assert_eq!(cfg.episode.number_of_targets, 2);
        assert_eq!(cfg.episode.target_lives, 3);
        assert!((cfg.arena.agent_radius - 0.3).abs() < 1e-6);
        assert!((cfg.arena.target_radius - 0.6).abs() < 1e-6);
        assert_eq!(cfg.arena.obstacles.len(), 4);
        assert!((cfg.rewards.hit_target - 3.0).abs() < 1e-6);
        assert!((cfg.rewards.slay_target - 5.0).abs() < 1e-6);
        assert!((cfg.rewards.shaping.extrovert_radius - 1.5).abs() < 1e-6);
        assert!((cfg.rewards.shaping.introvert_radius - 3.0).abs() < 1e-6);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_from_path_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("dungeon.json");
        let mut f = std::fs::File::create(&json_path).unwrap();
        f.write_all(serde_json::to_string(&DungeonConfig::default()).unwrap().as_bytes()).unwrap();
        assert!(DungeonConfig::from_path(&json_path).is_ok());

        let txt_path = dir.path().join("dungeon.txt");
        std::fs::write(&txt_path, "x").unwrap();
        assert!(matches!(
            DungeonConfig::from_path(&txt_path),
            Err(DungeonError::Configuration(_))
        ));
    }

    #[test]
    fn test_continuous_bravery_floor() {
        let shaping = ShapingConfig::default();
        let expected = (-0.5f32 * 5.0).exp();
        assert!((shaping.continuous_bravery_floor() - expected).abs() < 1e-6);
    }
}

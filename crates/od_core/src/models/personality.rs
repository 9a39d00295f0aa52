//! OCEAN Personality Profile
//!
//! Five-trait personality vector carried by every agent. Traits live in
//! [-1, 1]; the profile is immutable for the lifetime of a run.

use serde::{Deserialize, Serialize};

use crate::error::{DungeonError, Result};

/// One of the five OCEAN dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OceanTrait {
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    Neuroticism,
}

impl OceanTrait {
    pub const ALL: [OceanTrait; 5] = [
        OceanTrait::Openness,
        OceanTrait::Conscientiousness,
        OceanTrait::Extraversion,
        OceanTrait::Agreeableness,
        OceanTrait::Neuroticism,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OceanTrait::Openness => "openness",
            OceanTrait::Conscientiousness => "conscientiousness",
            OceanTrait::Extraversion => "extraversion",
            OceanTrait::Agreeableness => "agreeableness",
            OceanTrait::Neuroticism => "neuroticism",
        }
    }
}

/// Static personality profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    /// Display name, also used as the statistics row key
    pub name: String,
    pub openness: f32,
    pub conscientiousness: f32,
    pub extraversion: f32,
    pub agreeableness: f32,
    pub neuroticism: f32,
}

impl Personality {
    pub fn new(
        name: impl Into<String>,
        openness: f32,
        conscientiousness: f32,
        extraversion: f32,
        agreeableness: f32,
        neuroticism: f32,
    ) -> Self {
        Self {
            name: name.into(),
            openness,
            conscientiousness,
            extraversion,
            agreeableness,
            neuroticism,
        }
    }

    /// All traits at zero: every trait-scaled reward term vanishes
    pub fn neutral(name: impl Into<String>) -> Self {
        Self::new(name, 0.0, 0.0, 0.0, 0.0, 0.0)
    }

    pub fn get(&self, t: OceanTrait) -> f32 {
        match t {
            OceanTrait::Openness => self.openness,
            OceanTrait::Conscientiousness => self.conscientiousness,
            OceanTrait::Extraversion => self.extraversion,
            OceanTrait::Agreeableness => self.agreeableness,
            OceanTrait::Neuroticism => self.neuroticism,
        }
    }

    /// Checks every trait is finite and within [-1, 1]
    pub fn validate(&self) -> Result<()> {
        for t in OceanTrait::ALL {
            let value = self.get(t);
            if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
                return Err(DungeonError::config(format!(
                    "personality '{}': {} = {} is outside [-1, 1]",
                    self.name,
                    t.name(),
                    value
                )));
            }
        }
        Ok(())
    }
}

/// Maps a trait in [-1, 1] onto an interpolation factor in [0, 1]
pub fn trait_factor(value: f32) -> f32 {
    ((value + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Preferred interaction radius for a trait value
///
/// `low_radius` is used at trait = -1 and `high_radius` at trait = +1.
pub fn preferred_radius(value: f32, low_radius: f32, high_radius: f32) -> f32 {
    let t = trait_factor(value);
    low_radius + (high_radius - low_radius) * t
}

//! Arena and spawn configuration

use serde::{Deserialize, Serialize};

use crate::models::Rect;

/// Static circular obstacle (column) on the floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub z: f32,
    pub radius: f32,
}

/// Arena layout parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Floor bounds on the (x, z) plane
    pub floor: Rect,
    /// Floor top height
    pub floor_y: f32,

    // === Margins ===
    /// Distance kept from the walls when spawning agents, targets and keys (default: 1.0)
    pub wall_margin: f32,
    /// Distance kept from the walls when placing the lair (default: 0.7)
    pub lair_margin: f32,

    // === Height offsets ===
    /// Spawn height above the floor (default: 0.3)
    pub spawn_height_offset: f32,
    /// Lair height above the floor (default: 0.5)
    pub lair_height_offset: f32,
    /// Door height above the floor (default: 0.9)
    pub door_height_offset: f32,

    // === Radii ===
    /// Clearance required around every spawned entity (default: 0.8)
    pub safe_spawn_radius: f32,
    /// Agent body radius, used for contact detection (default: 0.4)
    pub agent_radius: f32,
    /// Target body radius (default: 0.6)
    pub target_radius: f32,
    /// Distance at which an agent picks up the key (default: 0.7)
    pub key_pickup_radius: f32,
    /// Distance at which an agent touches the door (default: 0.9)
    pub door_contact_radius: f32,
    /// Distance at which a target reaches its lair (default: 1.0)
    pub lair_contact_radius: f32,

    /// Columns and other static blockers
    pub obstacles: Vec<Obstacle>,
}

impl ArenaConfig {
    /// Longest straight line inside the arena, used to normalize distances
    pub fn max_distance(&self) -> f32 {
        self.floor.diagonal()
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            floor: Rect::new(-10.0, 10.0, -10.0, 10.0),
            floor_y: 0.0,

            wall_margin: 1.0,
            lair_margin: 0.7,

            spawn_height_offset: 0.3,
            lair_height_offset: 0.5,
            door_height_offset: 0.9,

            safe_spawn_radius: 0.8,
            agent_radius: 0.4,
            target_radius: 0.6,
            key_pickup_radius: 0.7,
            door_contact_radius: 0.9,
            lair_contact_radius: 1.0,

            obstacles: vec![
                Obstacle { x: -4.0, z: -4.0, radius: 0.5 },
                Obstacle { x: 4.0, z: -4.0, radius: 0.5 },
                Obstacle { x: -4.0, z: 4.0, radius: 0.5 },
                Obstacle { x: 4.0, z: 4.0, radius: 0.5 },
            ],
        }
    }
}

/// Rejection-sampling limits
///
/// Each placement gets `max_attempts` samples; when they run out the
/// clearance radius is multiplied by `relaxation_factor` and sampling
/// restarts, at most `max_relaxations` times.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Samples per placement before relaxing (default: 1000)
    pub max_attempts: u32,
    /// Clearance multiplier applied on each relaxation (default: 0.5)
    pub relaxation_factor: f32,
    /// Relaxation rounds before giving up (default: 3)
    pub max_relaxations: u32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self { max_attempts: 1000, relaxation_factor: 0.5, max_relaxations: 3 }
    }
}

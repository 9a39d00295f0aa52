//! Perception collaborator
//!
//! `can_see` answers "is anything with this tag in view, how far, at what
//! angle". Distance and angle only exist for a visible sighting, so callers
//! go through `Sighting::contact()` and cannot read them otherwise.

use serde::{Deserialize, Serialize};

use crate::config::Obstacle;
use crate::models::geometry::signed_angle_to;
use crate::models::{planar_distance, AgentState, Vec3};

use super::snapshot::ArenaSnapshot;

/// Entity categories an agent can look for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerceptionTag {
    Target,
    Key,
    Door,
    Agent,
}

/// Distance and signed angle (degrees) to a seen entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub distance: f32,
    pub angle: f32,
}

/// Result of a perception query
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sighting {
    visible: bool,
    distance: f32,
    angle: f32,
}

impl Sighting {
    pub fn unseen() -> Self {
        Self::default()
    }

    pub fn seen(distance: f32, angle: f32) -> Self {
        Self { visible: true, distance, angle }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn contact(&self) -> Option<Contact> {
        self.visible.then_some(Contact { distance: self.distance, angle: self.angle })
    }
}

pub trait Perception {
    fn can_see(&self, viewer: &AgentState, tag: PerceptionTag, world: &ArenaSnapshot<'_>) -> Sighting;
}

// ============================================================================
// ConePerception
// ============================================================================

/// Field-of-view cone with a range limit; obstacles occlude
#[derive(Debug, Clone)]
pub struct ConePerception {
    /// Full opening angle in degrees
    pub fov_degrees: f32,
    pub range: f32,
}

impl Default for ConePerception {
    fn default() -> Self {
        Self { fov_degrees: 140.0, range: 15.0 }
    }
}

impl ConePerception {
    pub fn new(fov_degrees: f32, range: f32) -> Self {
        Self { fov_degrees, range }
    }

    fn candidates(viewer: &AgentState, tag: PerceptionTag, world: &ArenaSnapshot<'_>) -> Vec<Vec3> {
        match tag {
            PerceptionTag::Target => {
                world.targets.iter().filter(|t| t.is_alive()).map(|t| t.position).collect()
            }
            PerceptionTag::Key => world.key.into_iter().collect(),
            PerceptionTag::Door => vec![world.door],
            PerceptionTag::Agent => {
                world.agents.iter().filter(|a| a.id != viewer.id).map(|a| a.position).collect()
            }
        }
    }
}

impl Perception for ConePerception {
    fn can_see(&self, viewer: &AgentState, tag: PerceptionTag, world: &ArenaSnapshot<'_>) -> Sighting {
        let half_fov = self.fov_degrees * 0.5;

        Self::candidates(viewer, tag, world)
            .into_iter()
            .filter_map(|pos| {
                let distance = planar_distance(&viewer.position, &pos);
                if distance > self.range {
                    return None;
                }
                let angle = signed_angle_to(&viewer.position, viewer.heading, &pos);
                if angle.abs() > half_fov || occluded(&viewer.position, &pos, world.obstacles) {
                    return None;
                }
                Some(Sighting::seen(distance, angle))
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .unwrap_or_default()
    }
}

/// Whether the segment `from -> to` passes through any obstacle
fn occluded(from: &Vec3, to: &Vec3, obstacles: &[Obstacle]) -> bool {
    let (ax, az) = (from.x, from.z);
    let (dx, dz) = (to.x - ax, to.z - az);
    let len_sq = dx * dx + dz * dz;
    if len_sq <= f32::EPSILON {
        return false;
    }

    obstacles.iter().any(|o| {
        let t = (((o.x - ax) * dx + (o.z - az) * dz) / len_sq).clamp(0.0, 1.0);
        let (px, pz) = (ax + t * dx, az + t * dz);
        let (ex, ez) = (o.x - px, o.z - pz);
        ex * ex + ez * ez < o.radius * o.radius
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::target::Target;
    use crate::models::{Personality, Rect};
    use std::sync::Arc;

    fn viewer(heading: f32) -> AgentState {
        let mut a = AgentState::new(0, Arc::new(Personality::neutral("n")), "N");
        a.heading = heading;
        a
    }

    fn world<'a>(agents: &'a [AgentState], targets: &'a [Target], obstacles: &'a [Obstacle]) -> ArenaSnapshot<'a> {
        ArenaSnapshot {
            agents,
            targets,
            obstacles,
            floor: Rect::new(-10.0, 10.0, -10.0, 10.0),
            key: Some(Vec3::new(0.0, 0.3, -4.0)),
            door: Vec3::new(0.0, 0.9, 9.0),
            door_unlocked: false,
            max_distance: 28.0,
            urgency: 0.0,
            elapsed: 0.0,
        }
    }

    fn target_at(id: usize, x: f32, z: f32) -> Target {
        let mut t = Target::new(id, 1);
        t.resurrect(Vec3::new(x, 0.3, z));
        t
    }

    #[test]
    fn test_sees_nearest_target_in_cone() {
        let agents = [viewer(0.0)];
        let targets = [target_at(0, 0.0, 8.0), target_at(1, 1.0, 3.0)];
        let w = world(&agents, &targets, &[]);

        let contact = ConePerception::default().can_see(&agents[0], PerceptionTag::Target, &w).contact().unwrap();
        assert!((contact.distance - 10f32.sqrt()).abs() < 1e-4);
        assert!(contact.angle > 0.0);
    }

    #[test]
    fn test_behind_is_unseen() {
        let agents = [viewer(0.0)];
        let w = world(&agents, &[], &[]);
        // Key sits straight behind the viewer
        let s = ConePerception::default().can_see(&agents[0], PerceptionTag::Key, &w);
        assert!(!s.is_visible());
        assert!(s.contact().is_none());
    }

    #[test]
    fn test_dead_targets_are_unseen() {
        let agents = [viewer(0.0)];
        let mut targets = [target_at(0, 0.0, 3.0)];
        let mut q = crate::engine::events::EventQueue::new();
        targets[0].take_hit(0, &mut q);
        let w = world(&agents, &targets, &[]);
        assert!(!ConePerception::default().can_see(&agents[0], PerceptionTag::Target, &w).is_visible());
    }

    #[test]
    fn test_obstacle_occludes() {
        let agents = [viewer(0.0)];
        let obstacles = [Obstacle { x: 0.0, z: 4.0, radius: 0.5 }];
        let w = world(&agents, &[], &obstacles);
        assert!(!ConePerception::default().can_see(&agents[0], PerceptionTag::Door, &w).is_visible());

        let w = world(&agents, &[], &[]);
        assert!(ConePerception::default().can_see(&agents[0], PerceptionTag::Door, &w).is_visible());
    }

    #[test]
    fn test_out_of_range_is_unseen() {
        let agents = [viewer(0.0)];
        let w = world(&agents, &[], &[]);
        let short = ConePerception::new(140.0, 5.0);
        assert!(!short.can_see(&agents[0], PerceptionTag::Door, &w).is_visible());
    }
}
